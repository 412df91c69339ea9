use crate::envelope::Envelope;
use crate::processing::kinematics::KinematicsConfig;
use crate::processing::segments::SegmentConfig;
use crate::processing::truncation::TruncationConfig;
use serde::{Deserialize, Serialize};

/// Shared configuration handed to every processing stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub kinematics: KinematicsConfig,
    pub segments: SegmentConfig,
    pub truncation: TruncationConfig,
    pub envelope: Envelope,
    /// Tracks with fewer samples than this produce no result.
    pub min_samples: usize,
    /// Case-insensitive substring matched against Name/Type/Group/Pilot.
    pub object_filter: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            kinematics: KinematicsConfig::default(),
            segments: SegmentConfig::default(),
            truncation: TruncationConfig::default(),
            envelope: Envelope::default(),
            min_samples: 5,
            object_filter: None,
        }
    }
}

/// Common error type for reading telemetry and executing stages.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive failure: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("archive container has no members")]
    EmptyArchive,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for StageError {
    fn from(err: serde_json::Error) -> Self {
        StageError::InvalidConfig(err.to_string())
    }
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing the analysis stages applied to a single track.
///
/// `I` is the borrowed input the stage consumes; stages never mutate it.
pub trait ProcessingStage<I: ?Sized> {
    type Output;

    fn initialize(&mut self, config: &AnalysisConfig) -> StageResult<()>;
    fn execute(&mut self, input: &I) -> StageResult<Self::Output>;
    fn cleanup(&mut self);
}
