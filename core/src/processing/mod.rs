pub mod kinematics;
pub mod pipeline;
pub mod result;
pub mod segments;
pub mod summary;
pub mod truncation;

pub use kinematics::{KinematicSeries, KinematicsConfig, KinematicsStage};
pub use pipeline::AnalysisPipeline;
pub use result::AnalysisResult;
pub use segments::{SegmentConfig, SegmentStage, TurnSegment};
pub use summary::{FlightSummary, SummaryStage};
pub use truncation::{TruncationConfig, TruncationOutcome, TruncationStage};
