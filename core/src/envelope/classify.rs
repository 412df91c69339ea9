use crate::envelope::config::{Envelope, TurnRateBand};
use serde::{Deserialize, Serialize};

/// Radii below `target * RADIUS_TIGHT_FACTOR` are suspiciously tight.
pub const RADIUS_TIGHT_FACTOR: f64 = 0.8;
/// Radii above `target * RADIUS_LOOSE_FACTOR` under-use the airframe.
pub const RADIUS_LOOSE_FACTOR: f64 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangeStatus {
    Under,
    Within,
    Over,
    #[serde(rename = "N/A")]
    NotAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GStatus {
    Within,
    Warning,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RadiusStatus {
    TightOver,
    Within,
    LooseUnder,
    #[serde(rename = "N/A")]
    NotAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    OverEnvelope,
    UnderEnvelope,
    WithinOrMixed,
}

pub fn classify_range(value: Option<f64>, band: TurnRateBand) -> RangeStatus {
    match value {
        None => RangeStatus::NotAvailable,
        Some(v) if v < band.min => RangeStatus::Under,
        Some(v) if v > band.max => RangeStatus::Over,
        Some(_) => RangeStatus::Within,
    }
}

pub fn classify_g(g: f64, warning: f64, max: f64) -> GStatus {
    if g <= warning {
        GStatus::Within
    } else if g <= max {
        GStatus::Warning
    } else {
        GStatus::Over
    }
}

pub fn classify_radius(radius_ft: Option<f64>, target_min_ft: f64) -> RadiusStatus {
    match radius_ft {
        None => RadiusStatus::NotAvailable,
        Some(r) if r < target_min_ft * RADIUS_TIGHT_FACTOR => RadiusStatus::TightOver,
        Some(r) if r > target_min_ft * RADIUS_LOOSE_FACTOR => RadiusStatus::LooseUnder,
        Some(_) => RadiusStatus::Within,
    }
}

pub fn overall_status(
    instantaneous: RangeStatus,
    sustained: RangeStatus,
    g: GStatus,
    radius: RadiusStatus,
) -> OverallStatus {
    if g == GStatus::Over
        || instantaneous == RangeStatus::Over
        || radius == RadiusStatus::TightOver
    {
        OverallStatus::OverEnvelope
    } else if instantaneous == RangeStatus::Under && sustained == RangeStatus::Under {
        OverallStatus::UnderEnvelope
    } else {
        OverallStatus::WithinOrMixed
    }
}

/// Per-axis verdicts for a flight or a single turn segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeStatus {
    pub instantaneous: RangeStatus,
    pub sustained: RangeStatus,
    pub g: GStatus,
    pub radius: RadiusStatus,
    pub overall: OverallStatus,
}

impl EnvelopeStatus {
    pub fn evaluate(
        envelope: &Envelope,
        peak_turn_rate: Option<f64>,
        sustained_turn_rate: Option<f64>,
        max_g: f64,
        min_radius_ft: Option<f64>,
    ) -> Self {
        let instantaneous = classify_range(peak_turn_rate, envelope.instantaneous_turn_rate);
        let sustained = classify_range(sustained_turn_rate, envelope.sustained_turn_rate);
        let g = classify_g(max_g, envelope.g_warning, envelope.g_max);
        let radius = classify_radius(min_radius_ft, envelope.min_turn_radius_ft);
        Self {
            instantaneous,
            sustained,
            g,
            radius,
            overall: overall_status(instantaneous, sustained, g, radius),
        }
    }
}
