//! Telemetry-to-metrics core for flight-envelope conformance analysis.
//!
//! A recording is read into memory, reconstructed into per-object tracks,
//! and each selected track runs through truncation, kinematics, turn
//! segmentation and envelope classification.

pub mod acmi;
pub mod envelope;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{AnalysisConfig, ProcessingStage, StageError, StageResult};
pub use processing::pipeline::AnalysisPipeline;
pub use processing::result::AnalysisResult;
