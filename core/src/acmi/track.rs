use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata keys that identify an object and accumulate across records.
pub const IDENTITY_KEYS: [&str; 6] = ["Name", "Type", "Group", "Pilot", "Country", "Coalition"];

/// Keys consulted by the selection filter.
pub const FILTER_KEYS: [&str; 4] = ["Name", "Type", "Group", "Pilot"];

/// One position fix: seconds, planar metres, metres above sea level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub altitude: f64,
}

impl Sample {
    pub fn new(time: f64, x: f64, y: f64, altitude: f64) -> Self {
        Self {
            time,
            x,
            y,
            altitude,
        }
    }
}

/// Last-known transform sub-fields for one object.
///
/// The wire format omits unchanged sub-fields, so every field stays `None`
/// until a record first supplies it and then carries forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub altitude: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub roll: Option<f64>,
    pub pitch: Option<f64>,
    pub yaw: Option<f64>,
    pub heading: Option<f64>,
}

impl TransformState {
    /// A sample exists once altitude and both planar offsets are known.
    pub fn sample_at(&self, time: f64) -> Option<Sample> {
        Some(Sample::new(time, self.x?, self.y?, self.altitude?))
    }
}

/// Full time-ordered history of one tracked object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectTrack {
    pub id: String,
    pub metadata: BTreeMap<String, String>,
    pub samples: Vec<Sample>,
    pub transform: TransformState,
}

impl ObjectTrack {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn meta(&self, key: &str) -> &str {
        self.metadata.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.meta("Name")
    }

    pub fn object_type(&self) -> &str {
        self.meta("Type")
    }

    pub fn group(&self) -> &str {
        self.meta("Group")
    }

    pub fn last_time(&self) -> Option<f64> {
        self.samples.last().map(|s| s.time)
    }

    /// Case-insensitive substring match against the identity metadata.
    pub fn matches_filter(&self, filter: &str) -> bool {
        let needle = filter.to_lowercase();
        FILTER_KEYS.iter().any(|key| {
            self.metadata
                .get(*key)
                .map(|value| !value.is_empty() && value.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }
}

/// All tracks reconstructed from one recording, in first-sighting order.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    pub tracks: Vec<ObjectTrack>,
}

impl Recording {
    pub fn get(&self, id: &str) -> Option<&ObjectTrack> {
        self.tracks.iter().find(|track| track.id == id)
    }

    /// Latest sample timestamp across every track.
    pub fn end_time(&self) -> f64 {
        self.tracks
            .iter()
            .filter_map(ObjectTrack::last_time)
            .fold(0.0, f64::max)
    }
}
