//! Telemetry container decoding and per-object track reconstruction.

pub mod parser;
pub mod reader;
pub mod track;

pub use parser::TelemetryParser;
pub use reader::RecordReader;
pub use track::{ObjectTrack, Recording, Sample, TransformState};
