use crate::prelude::StageResult;
use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` band in deg/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnRateBand {
    pub min: f64,
    pub max: f64,
}

/// Reference performance bounds a track is evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub sustained_turn_rate: TurnRateBand,
    pub instantaneous_turn_rate: TurnRateBand,
    /// Carried through configuration; no classifier consults it.
    pub corner_speed_kt: f64,
    pub min_turn_radius_ft: f64,
    pub g_warning: f64,
    pub g_max: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            sustained_turn_rate: TurnRateBand {
                min: 12.0,
                max: 17.0,
            },
            instantaneous_turn_rate: TurnRateBand {
                min: 18.0,
                max: 25.0,
            },
            corner_speed_kt: 350.0,
            min_turn_radius_ft: 2200.0,
            g_warning: 7.0,
            g_max: 8.0,
        }
    }
}

impl Envelope {
    /// Reads the nested test-definition layout:
    ///
    /// ```json
    /// {
    ///   "flight_envelope_targets": { "corner_speed_kt": 350, "min_turn_radius_ft": 2200 },
    ///   "pass_fail_criteria": {
    ///     "turn_rate": { "sustained_min_deg_s": 12, "instantaneous_max_deg_s": 25 },
    ///     "g_loading": { "max_expected": 8.0, "warning_threshold": 7.0 }
    ///   }
    /// }
    /// ```
    ///
    /// Missing groups and keys fall back to [`Envelope::default`].
    pub fn from_nested_json(text: &str) -> StageResult<Self> {
        let document: EnvelopeDocument = serde_json::from_str(text)?;
        Ok(document.into())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvelopeDocument {
    flight_envelope_targets: FlightTargets,
    pass_fail_criteria: PassFailCriteria,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlightTargets {
    corner_speed_kt: Option<f64>,
    min_turn_radius_ft: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PassFailCriteria {
    turn_rate: TurnRateCriteria,
    g_loading: GLoadingCriteria,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TurnRateCriteria {
    sustained_min_deg_s: Option<f64>,
    sustained_max_deg_s: Option<f64>,
    instantaneous_min_deg_s: Option<f64>,
    instantaneous_max_deg_s: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GLoadingCriteria {
    max_expected: Option<f64>,
    warning_threshold: Option<f64>,
}

impl From<EnvelopeDocument> for Envelope {
    fn from(doc: EnvelopeDocument) -> Self {
        let base = Envelope::default();
        let turn = doc.pass_fail_criteria.turn_rate;
        let g = doc.pass_fail_criteria.g_loading;
        let targets = doc.flight_envelope_targets;
        Envelope {
            sustained_turn_rate: TurnRateBand {
                min: turn
                    .sustained_min_deg_s
                    .unwrap_or(base.sustained_turn_rate.min),
                max: turn
                    .sustained_max_deg_s
                    .unwrap_or(base.sustained_turn_rate.max),
            },
            instantaneous_turn_rate: TurnRateBand {
                min: turn
                    .instantaneous_min_deg_s
                    .unwrap_or(base.instantaneous_turn_rate.min),
                max: turn
                    .instantaneous_max_deg_s
                    .unwrap_or(base.instantaneous_turn_rate.max),
            },
            corner_speed_kt: targets.corner_speed_kt.unwrap_or(base.corner_speed_kt),
            min_turn_radius_ft: targets
                .min_turn_radius_ft
                .unwrap_or(base.min_turn_radius_ft),
            g_warning: g.warning_threshold.unwrap_or(base.g_warning),
            g_max: g.max_expected.unwrap_or(base.g_max),
        }
    }
}
