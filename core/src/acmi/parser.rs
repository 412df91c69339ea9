use crate::acmi::track::{ObjectTrack, Recording, TransformState, IDENTITY_KEYS};
use log::debug;
use std::collections::HashMap;

const TIME_MARKER: char = '#';
const FIELD_SEPARATOR: char = ',';
const REMOVAL_PREFIX: char = '-';
const TRANSFORM_KEY: &str = "T";

/// Running state threaded through the line fold.
#[derive(Debug, Default)]
pub struct ParseState {
    current_time: f64,
    index: HashMap<String, usize>,
    tracks: Vec<ObjectTrack>,
}

impl ParseState {
    /// Applies one raw line. Malformed content is ignored, never fatal.
    pub fn apply(mut self, line: &str) -> Self {
        if let Some(marker) = line.strip_prefix(TIME_MARKER) {
            if let Ok(time) = marker.trim().parse::<f64>() {
                self.current_time = time;
            }
            return self;
        }
        if line.starts_with(REMOVAL_PREFIX) {
            return self;
        }
        let Some((object_id, rest)) = line.split_once(FIELD_SEPARATOR) else {
            return self;
        };

        let record = tokenize(rest);
        let time = self.current_time;
        let track = self.track_mut(object_id);

        for key in IDENTITY_KEYS {
            if let Some(value) = record.get(key) {
                track.metadata.insert(key.to_string(), value.to_string());
            }
        }

        if let Some(transform) = record.get(TRANSFORM_KEY) {
            apply_transform(&mut track.transform, transform);
            if let Some(sample) = track.transform.sample_at(time) {
                track.samples.push(sample);
            }
        }
        self
    }

    fn track_mut(&mut self, object_id: &str) -> &mut ObjectTrack {
        let slot = match self.index.get(object_id) {
            Some(&slot) => slot,
            None => {
                self.tracks.push(ObjectTrack::new(object_id));
                let slot = self.tracks.len() - 1;
                self.index.insert(object_id.to_string(), slot);
                slot
            }
        };
        &mut self.tracks[slot]
    }

    pub fn finish(self) -> Recording {
        Recording {
            tracks: self.tracks,
        }
    }
}

/// Reconstructs per-object tracks from decoded record lines.
pub struct TelemetryParser;

impl TelemetryParser {
    pub fn parse<I, S>(lines: I) -> Recording
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let recording = lines
            .into_iter()
            .fold(ParseState::default(), |state, line| state.apply(line.as_ref()))
            .finish();
        debug!(
            "parsed {} objects, {} with samples",
            recording.tracks.len(),
            recording
                .tracks
                .iter()
                .filter(|track| !track.samples.is_empty())
                .count()
        );
        recording
    }
}

/// Splits `key=value` segments of a single record.
fn tokenize(rest: &str) -> HashMap<&str, &str> {
    rest.split(FIELD_SEPARATOR)
        .filter_map(|segment| segment.split_once('='))
        .collect()
}

/// Overwrites sub-fields present in `raw`; empty or malformed sub-fields
/// keep their last known value.
///
/// Shapes: `lon|lat|alt`, `lon|lat|alt|x|y`, and
/// `lon|lat|alt|roll|pitch|yaw[|x|y|heading]`.
fn apply_transform(state: &mut TransformState, raw: &str) {
    let parts: Vec<&str> = raw.split('|').collect();
    let field = |idx: usize| parts.get(idx).and_then(|token| parse_token(token));

    merge(&mut state.longitude, field(0));
    merge(&mut state.latitude, field(1));
    merge(&mut state.altitude, field(2));

    match parts.len() {
        5 => {
            merge(&mut state.x, field(3));
            merge(&mut state.y, field(4));
        }
        n if n >= 6 => {
            merge(&mut state.roll, field(3));
            merge(&mut state.pitch, field(4));
            merge(&mut state.yaw, field(5));
            merge(&mut state.x, field(6));
            merge(&mut state.y, field(7));
            merge(&mut state.heading, field(8));
        }
        _ => {}
    }
}

fn parse_token(token: &str) -> Option<f64> {
    if token.is_empty() {
        return None;
    }
    token.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn merge(slot: &mut Option<f64>, value: Option<f64>) {
    if value.is_some() {
        *slot = value;
    }
}
