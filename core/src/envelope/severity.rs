use crate::envelope::config::Envelope;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Ok,
    Moderate,
    High,
}

/// Flight-level measurements the rules inspect.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeveritySignals {
    pub peak_turn_rate: f64,
    pub best_sustained_turn_rate: Option<f64>,
    pub min_radius_ft: Option<f64>,
    pub max_g: f64,
    pub turn_rate_p95: Option<f64>,
    pub g_p95: Option<f64>,
    pub over_instantaneous_fraction: f64,
    pub over_g_fraction: f64,
    pub tight_radius_fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Excess {
    Above,
    Below,
}

impl Excess {
    fn beyond(self, value: f64, limit: f64) -> bool {
        match self {
            Excess::Above => value > limit,
            Excess::Below => value < limit,
        }
    }

    fn word(self) -> &'static str {
        match self {
            Excess::Above => "above",
            Excess::Below => "below",
        }
    }
}

/// Reads one signal and compares it against a moderate and a severe limit
/// derived from the envelope.
pub struct SeverityRule {
    pub label: &'static str,
    pub unit: &'static str,
    pub excess: Excess,
    pub measure: fn(&SeveritySignals) -> Option<f64>,
    pub moderate: fn(&Envelope) -> f64,
    pub severe: fn(&Envelope) -> f64,
}

impl SeverityRule {
    /// Returns the tier this rule triggers at, with its reason.
    pub fn check(
        &self,
        signals: &SeveritySignals,
        envelope: &Envelope,
    ) -> Option<(Severity, String)> {
        let value = (self.measure)(signals)?;
        let (tier, limit) = [
            (Severity::High, (self.severe)(envelope)),
            (Severity::Moderate, (self.moderate)(envelope)),
        ]
        .into_iter()
        .find(|(_, limit)| self.excess.beyond(value, *limit))?;

        let qualifier = if tier == Severity::High { "far " } else { "" };
        let reason = format!(
            "{} {:.2}{} {}{} limit {:.2}{}",
            self.label,
            value,
            self.unit,
            qualifier,
            self.excess.word(),
            limit,
            self.unit
        );
        Some((tier, reason))
    }
}

/// The stock rule set, evaluated in order.
pub fn default_rules() -> Vec<SeverityRule> {
    vec![
        SeverityRule {
            label: "peak instantaneous turn rate",
            unit: " deg/s",
            excess: Excess::Above,
            measure: |s| Some(s.peak_turn_rate),
            moderate: |e| e.instantaneous_turn_rate.max + 3.0,
            severe: |e| e.instantaneous_turn_rate.max + 8.0,
        },
        SeverityRule {
            label: "best sustained turn rate",
            unit: " deg/s",
            excess: Excess::Above,
            measure: |s| s.best_sustained_turn_rate,
            moderate: |e| e.sustained_turn_rate.max + 2.0,
            severe: |e| e.sustained_turn_rate.max + 5.0,
        },
        SeverityRule {
            label: "minimum turn radius",
            unit: " ft",
            excess: Excess::Below,
            measure: |s| s.min_radius_ft,
            moderate: |e| e.min_turn_radius_ft * 0.8,
            severe: |e| e.min_turn_radius_ft * 0.6,
        },
        SeverityRule {
            label: "peak g",
            unit: " g",
            excess: Excess::Above,
            measure: |s| Some(s.max_g),
            moderate: |e| e.g_max + 0.5,
            severe: |e| e.g_max + 2.0,
        },
        SeverityRule {
            label: "p95 turn rate",
            unit: " deg/s",
            excess: Excess::Above,
            measure: |s| s.turn_rate_p95,
            moderate: |e| e.instantaneous_turn_rate.max + 1.5,
            severe: |e| e.instantaneous_turn_rate.max + 4.0,
        },
        SeverityRule {
            label: "p95 g",
            unit: " g",
            excess: Excess::Above,
            measure: |s| s.g_p95,
            moderate: |e| e.g_max + 0.5,
            severe: |e| e.g_max + 1.5,
        },
        SeverityRule {
            label: "turning fraction over instantaneous ceiling",
            unit: "",
            excess: Excess::Above,
            measure: |s| Some(s.over_instantaneous_fraction),
            moderate: |_| 0.10,
            severe: |_| 0.30,
        },
        SeverityRule {
            label: "turning fraction over g ceiling",
            unit: "",
            excess: Excess::Above,
            measure: |s| Some(s.over_g_fraction),
            moderate: |_| 0.05,
            severe: |_| 0.15,
        },
        SeverityRule {
            label: "turning fraction under tight radius",
            unit: "",
            excess: Excess::Above,
            measure: |s| Some(s.tight_radius_fraction),
            moderate: |_| 0.05,
            severe: |_| 0.20,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityVerdict {
    pub severity: Severity,
    pub reasons: Vec<String>,
}

/// Triage verdict for a track whose performance is implausibly outside the
/// envelope. Any severe hit makes it [`Severity::High`]; otherwise any
/// moderate hit makes it [`Severity::Moderate`].
pub fn evaluate(
    rules: &[SeverityRule],
    signals: &SeveritySignals,
    envelope: &Envelope,
) -> SeverityVerdict {
    let mut severity = Severity::Ok;
    let mut reasons = Vec::new();
    for (tier, reason) in rules.iter().filter_map(|rule| rule.check(signals, envelope)) {
        severity = severity.max(tier);
        reasons.push(reason);
    }
    SeverityVerdict { severity, reasons }
}
