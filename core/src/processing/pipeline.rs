use crate::acmi::track::{ObjectTrack, Recording};
use crate::acmi::{RecordReader, TelemetryParser};
use crate::envelope::severity;
use crate::prelude::{AnalysisConfig, ProcessingStage, StageResult};
use crate::processing::kinematics::KinematicsStage;
use crate::processing::result::AnalysisResult;
use crate::processing::segments::SegmentStage;
use crate::processing::summary::{SegmentedSeries, SummaryStage};
use crate::processing::truncation::{TrackWindow, TruncationStage};
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};
use std::path::Path;

/// Runs every selected track of a recording through the analysis stages.
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new(),
        }
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }

    /// Reads a plain or zip-packed recording and analyzes it.
    pub fn analyze_path<P: AsRef<Path>>(&self, path: P) -> StageResult<Vec<AnalysisResult>> {
        let path = path.as_ref();
        let lines = RecordReader::read_path(path)?;
        self.logger
            .record(&format!("read {} lines from {}", lines.len(), path.display()));
        let recording = TelemetryParser::parse(lines);
        self.analyze_recording(&recording)
    }

    /// One result per selected track with enough samples, in first-sighting
    /// order.
    pub fn analyze_recording(&self, recording: &Recording) -> StageResult<Vec<AnalysisResult>> {
        let recording_end = recording.end_time();
        // An empty filter selects everything.
        let filter = self
            .config
            .object_filter
            .as_deref()
            .filter(|filter| !filter.is_empty());
        let selected: Vec<&ObjectTrack> = recording
            .tracks
            .iter()
            .filter(|track| !track.samples.is_empty())
            .filter(|track| filter.map_or(true, |filter| track.matches_filter(filter)))
            .collect();
        self.logger.record(&format!(
            "analyzing {} of {} objects",
            selected.len(),
            recording.tracks.len()
        ));

        let mut truncation = TruncationStage::new();
        let mut kinematics = KinematicsStage::new();
        let mut segmenter = SegmentStage::new();
        let mut summarizer = SummaryStage::new();
        truncation.initialize(&self.config)?;
        kinematics.initialize(&self.config)?;
        segmenter.initialize(&self.config)?;
        summarizer.initialize(&self.config)?;

        let mut results = Vec::with_capacity(selected.len());
        for track in selected {
            let outcome = truncation.execute(&TrackWindow {
                samples: &track.samples,
                recording_end,
            })?;
            let samples = match &outcome {
                Some(cut) => cut.apply(&track.samples),
                None => &track.samples[..],
            };
            let truncated = samples.len() < track.samples.len();
            if truncated {
                self.metrics.record_truncated();
            }

            if samples.len() < self.config.min_samples {
                self.logger.debug(&format!(
                    "skipping {} ({}): {} samples after truncation",
                    track.id,
                    track.name(),
                    samples.len()
                ));
                self.metrics.record_skipped();
                continue;
            }

            let series = kinematics.execute(samples)?;
            let segments = segmenter.execute(&series)?;
            let summary = summarizer.execute(&SegmentedSeries {
                series: &series,
                segments: &segments,
            })?;
            let status = summary.status(&self.config.envelope);
            let verdict = severity::evaluate(
                &severity::default_rules(),
                &summary.severity_signals(),
                &self.config.envelope,
            );

            self.metrics.record_analyzed();
            results.push(AnalysisResult {
                object_id: track.id.clone(),
                name: non_empty(track.name()),
                object_type: non_empty(track.object_type()),
                group: non_empty(track.group()),
                metadata: track.metadata.clone(),
                samples_raw: track.samples.len(),
                samples_used: samples.len(),
                truncated,
                truncation: outcome,
                summary,
                segments,
                status,
                severity: verdict,
            });
        }

        truncation.cleanup();
        kinematics.cleanup();
        segmenter.cleanup();
        summarizer.cleanup();
        Ok(results)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acmi::track::Sample;
    use crate::envelope::{RangeStatus, Severity};
    use crate::processing::kinematics::tests::arc;

    fn track(id: &str, name: &str, samples: Vec<Sample>) -> ObjectTrack {
        let mut track = ObjectTrack::new(id);
        track.metadata.insert("Name".into(), name.into());
        track.samples = samples;
        track
    }

    #[test]
    fn tracks_below_min_samples_produce_no_result() {
        let recording = Recording {
            tracks: vec![track("1", "MiG-17F", arc(4, 1.0, 400.0, 9.0, 3000.0))],
        };
        let pipeline = AnalysisPipeline::new(AnalysisConfig::default());
        assert!(pipeline.analyze_recording(&recording).unwrap().is_empty());
        assert_eq!(pipeline.metrics().skipped, 1);
        assert_eq!(pipeline.metrics().analyzed, 0);
    }

    #[test]
    fn moderate_turn_is_under_the_sustained_band() {
        let recording = Recording {
            tracks: vec![track("1", "MiG-17F", arc(10, 1.0, 400.0, 9.0, 3000.0))],
        };
        let pipeline = AnalysisPipeline::new(AnalysisConfig::default());
        let results = pipeline.analyze_recording(&recording).unwrap();
        assert_eq!(results.len(), 1);

        let result = &results[0];
        assert_eq!(result.label(), "MiG-17F");
        assert_eq!(result.samples_used, 10);
        assert!(!result.truncated);
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.status.sustained, RangeStatus::Under);
        assert_eq!(result.status.instantaneous, RangeStatus::Under);
        assert_eq!(result.severity.severity, Severity::Ok);
        assert!(result.segments.iter().all(|s| s.duration >= 1.5));
    }

    #[test]
    fn filter_selects_by_identity_and_keeps_order() {
        let recording = Recording {
            tracks: vec![
                track("a", "F-5E Tiger", arc(10, 1.0, 400.0, 0.0, 3000.0)),
                track("b", "MiG-17F", arc(10, 1.0, 400.0, 0.0, 3000.0)),
                track("c", "mig-21", arc(10, 1.0, 400.0, 0.0, 3000.0)),
            ],
        };
        let config = AnalysisConfig {
            object_filter: Some("MIG".into()),
            ..Default::default()
        };
        let results = AnalysisPipeline::new(config)
            .analyze_recording(&recording)
            .unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.object_id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);

        let everyone = AnalysisPipeline::new(AnalysisConfig::default())
            .analyze_recording(&recording)
            .unwrap();
        assert_eq!(everyone.len(), 3);
    }

    #[test]
    fn empty_filter_selects_tracks_without_metadata() {
        let mut anonymous = ObjectTrack::new("7");
        anonymous.samples = arc(10, 1.0, 400.0, 0.0, 3000.0);
        let recording = Recording {
            tracks: vec![anonymous],
        };
        let config = AnalysisConfig {
            object_filter: Some(String::new()),
            ..Default::default()
        };
        let results = AnalysisPipeline::new(config)
            .analyze_recording(&recording)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].object_id, "7");
    }

    #[test]
    fn tracks_ending_early_are_truncated_before_analysis() {
        let short = arc(20, 1.0, 400.0, 0.0, 3000.0);
        let long = arc(60, 1.0, 400.0, 0.0, 3000.0);
        let recording = Recording {
            tracks: vec![track("1", "lost", short), track("2", "survivor", long)],
        };
        let pipeline = AnalysisPipeline::new(AnalysisConfig::default());
        let results = pipeline.analyze_recording(&recording).unwrap();
        assert!(results[0].truncated);
        assert_eq!(results[0].samples_raw, 20);
        assert_eq!(results[0].samples_used, 18);
        assert!(!results[1].truncated);
        assert_eq!(pipeline.metrics().truncated, 1);
    }
}
