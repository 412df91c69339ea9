pub mod classify;
pub mod config;
pub mod severity;

pub use classify::{
    classify_g, classify_radius, classify_range, overall_status, EnvelopeStatus, GStatus,
    OverallStatus, RadiusStatus, RangeStatus,
};
pub use config::{Envelope, TurnRateBand};
pub use severity::{Severity, SeveritySignals, SeverityVerdict};
