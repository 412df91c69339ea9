use anyhow::Context;
use bfmcore::envelope::Envelope;
use bfmcore::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Analysis settings for one run, as loaded from a YAML workflow file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    #[serde(flatten)]
    pub analysis: AnalysisConfig,
    /// Nested envelope JSON that replaces `envelope` when set.
    pub envelope_file: Option<PathBuf>,
}

/// Command-line values that take precedence over the workflow file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub object_filter: Option<String>,
    pub envelope_file: Option<PathBuf>,
    pub no_truncate: bool,
    pub death_gap_s: Option<f64>,
    pub wreck_speed_kt: Option<f64>,
    pub wreck_alt_band_ft: Option<f64>,
    pub wreck_min_tail_s: Option<f64>,
    pub post_death_trim_s: Option<f64>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        let truncation = &mut self.analysis.truncation;
        if overrides.no_truncate {
            truncation.enable = false;
        }
        let pairs = [
            (&mut truncation.death_gap_s, overrides.death_gap_s),
            (&mut truncation.wreck_speed_kt, overrides.wreck_speed_kt),
            (&mut truncation.wreck_alt_band_ft, overrides.wreck_alt_band_ft),
            (&mut truncation.wreck_min_tail_s, overrides.wreck_min_tail_s),
            (&mut truncation.post_death_trim_s, overrides.post_death_trim_s),
        ];
        for (slot, value) in pairs {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if overrides.object_filter.is_some() {
            self.analysis.object_filter = overrides.object_filter;
        }
        if overrides.envelope_file.is_some() {
            self.envelope_file = overrides.envelope_file;
        }
    }

    /// Resolves the envelope file, if any, into the final core config.
    pub fn to_analysis_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = self.analysis.clone();
        if let Some(path) = &self.envelope_file {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading envelope {}", path.display()))?;
            config.envelope = Envelope::from_nested_json(&text)
                .with_context(|| format!("parsing envelope {}", path.display()))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_load_reads_partial_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"min_samples: 8\nobject_filter: mig\ntruncation:\n  death_gap_s: 30.0\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.analysis.min_samples, 8);
        assert_eq!(cfg.analysis.object_filter.as_deref(), Some("mig"));
        assert_eq!(cfg.analysis.truncation.death_gap_s, 30.0);
        assert_eq!(cfg.analysis.truncation.wreck_speed_kt, 40.0);
        assert_eq!(cfg.analysis.kinematics.v_min_turn_kt, 150.0);
    }

    #[test]
    fn overrides_take_precedence() {
        let mut cfg = WorkflowConfig::default();
        cfg.apply(Overrides {
            object_filter: Some("f-5".into()),
            no_truncate: true,
            wreck_speed_kt: Some(25.0),
            ..Default::default()
        });
        let analysis = cfg.to_analysis_config().unwrap();
        assert!(!analysis.truncation.enable);
        assert_eq!(analysis.truncation.wreck_speed_kt, 25.0);
        assert_eq!(analysis.truncation.death_gap_s, 10.0);
        assert_eq!(analysis.object_filter.as_deref(), Some("f-5"));
    }

    #[test]
    fn envelope_file_replaces_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            br#"{"pass_fail_criteria": {"g_loading": {"max_expected": 9.0}}, "notes": "x"}"#,
        )
        .unwrap();
        let cfg = WorkflowConfig {
            envelope_file: Some(temp.path().to_path_buf()),
            ..Default::default()
        };
        let analysis = cfg.to_analysis_config().unwrap();
        assert_eq!(analysis.envelope.g_max, 9.0);
        assert_eq!(analysis.envelope.g_warning, 7.0);
    }

    #[test]
    fn missing_envelope_file_is_reported() {
        let cfg = WorkflowConfig {
            envelope_file: Some(PathBuf::from("/nonexistent/envelope.json")),
            ..Default::default()
        };
        let err = cfg.to_analysis_config().unwrap_err();
        assert!(err.to_string().contains("reading envelope"));
    }
}
