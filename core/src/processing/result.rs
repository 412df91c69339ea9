use crate::envelope::{EnvelopeStatus, SeverityVerdict};
use crate::processing::segments::TurnSegment;
use crate::processing::summary::FlightSummary;
use crate::processing::truncation::TruncationOutcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything reported for one analyzed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub object_id: String,
    pub name: Option<String>,
    pub object_type: Option<String>,
    pub group: Option<String>,
    /// Every identity key seen for the object, last value wins.
    pub metadata: BTreeMap<String, String>,
    pub samples_raw: usize,
    pub samples_used: usize,
    pub truncated: bool,
    pub truncation: Option<TruncationOutcome>,
    #[serde(flatten)]
    pub summary: FlightSummary,
    pub segments: Vec<TurnSegment>,
    pub status: EnvelopeStatus,
    pub severity: SeverityVerdict,
}

impl AnalysisResult {
    /// Label used in reports: the object's name, falling back to its id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.object_id)
    }
}
