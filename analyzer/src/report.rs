use bfmcore::envelope::Envelope;
use bfmcore::AnalysisResult;
use serde::Serialize;
use std::fmt::Write;

const RULE_WIDTH: usize = 72;

pub fn envelope_header(envelope: &Envelope) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Envelope thresholds:");
    let _ = writeln!(
        out,
        "  Sustained TR: {:.1}-{:.1} deg/s",
        envelope.sustained_turn_rate.min, envelope.sustained_turn_rate.max
    );
    let _ = writeln!(
        out,
        "  Instantaneous TR: {:.1}-{:.1} deg/s",
        envelope.instantaneous_turn_rate.min, envelope.instantaneous_turn_rate.max
    );
    let _ = writeln!(out, "  Corner speed: {:.0} kt", envelope.corner_speed_kt);
    let _ = writeln!(out, "  Min turn radius: {:.0} ft", envelope.min_turn_radius_ft);
    let _ = writeln!(
        out,
        "  Max G: {:.1} (warning at {:.1})",
        envelope.g_max, envelope.g_warning
    );
    out
}

/// Human-readable block for one object.
pub fn object_summary(result: &AnalysisResult) -> String {
    let s = &result.summary;
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(
        out,
        "Object {}: name='{}', type='{}', group='{}'",
        result.object_id,
        result.name.as_deref().unwrap_or(""),
        result.object_type.as_deref().unwrap_or(""),
        result.group.as_deref().unwrap_or("")
    );
    let _ = writeln!(
        out,
        "  Time: {:.1}-{:.1} s (duration {:.1} s)",
        s.time_start, s.time_end, s.duration_s
    );
    let _ = writeln!(
        out,
        "  Speed: {:.1}-{:.1} kt, Alt: {:.0}-{:.0} ft (span {:.0} ft)",
        s.min_speed_kt, s.max_speed_kt, s.min_altitude_ft, s.max_altitude_ft, s.altitude_span_ft
    );
    if let Some(cut) = result.truncation.as_ref().filter(|_| result.truncated) {
        let _ = writeln!(
            out,
            "  Truncation: cut at {:.1}s ({})",
            cut.cut_time,
            label(&cut.method)
        );
        let _ = writeln!(out, "    Reason: {}", cut.reason);
        let _ = writeln!(
            out,
            "    Samples: {}/{} used",
            result.samples_used, result.samples_raw
        );
    }

    match &s.peak_turn {
        Some(peak) => {
            let _ = writeln!(
                out,
                "  Max inst TR: {:.2} deg/s @ {:.1} kt, {:.0} ft, {:.2} g [{}]",
                peak.turn_rate,
                peak.speed_kt,
                peak.altitude_ft,
                peak.g,
                label(&result.status.instantaneous)
            );
        }
        None => {
            let _ = writeln!(
                out,
                "  Max inst TR: {:.2} deg/s [{}]",
                s.max_inst_turn_rate,
                label(&result.status.instantaneous)
            );
        }
    }
    match &s.best_sustained {
        Some(best) => {
            let _ = writeln!(
                out,
                "  Best sustained TR: {:.2} deg/s over {:.2} s @ ~{:.1} kt, ~{:.2} g [{}]",
                best.turn_rate,
                best.duration_s,
                best.avg_speed_kt.unwrap_or(0.0),
                best.avg_g.unwrap_or(0.0),
                label(&result.status.sustained)
            );
        }
        None => {
            let _ = writeln!(out, "  Best sustained TR: N/A [no qualifying turn segments]");
        }
    }
    match s.min_turn_radius_ft {
        Some(radius) => {
            let _ = writeln!(
                out,
                "  Min turn radius: {:.0} ft [{}]",
                radius,
                label(&result.status.radius)
            );
        }
        None => {
            let _ = writeln!(out, "  Min turn radius: N/A");
        }
    }
    let _ = writeln!(out, "  Max G: {:.2} g [{}]", s.max_g, label(&result.status.g));
    let _ = writeln!(
        out,
        "  TR p95 (turning): {}, G p95 (turning): {}",
        optional(s.turn_rate_p95, " deg/s"),
        optional(s.g_p95, " g")
    );
    let _ = writeln!(
        out,
        "  Turning time: {:.1} s ({:.1}% of flight)",
        s.turn_time_s,
        s.turn_time_fraction * 100.0
    );
    let axes = [
        ("Time > inst_max", &s.excursions.over_instantaneous),
        ("Time > g_max", &s.excursions.over_g),
        ("Time radius < 0.8*min", &s.excursions.tight_radius),
    ];
    for (name, excursion) in axes {
        let _ = writeln!(
            out,
            "  {}: {:.2} s ({:.1}% of turning), max continuous: {:.2} s",
            name,
            excursion.time_s,
            excursion.fraction_of_turn * 100.0,
            excursion.longest_run_s
        );
    }
    let _ = writeln!(out, "  Turn segments: {}", result.segments.len());
    let reasons = if result.severity.reasons.is_empty() {
        "[]".to_string()
    } else {
        result.severity.reasons.join("; ")
    };
    let _ = writeln!(
        out,
        "  Severity: {} reasons={}",
        label(&result.severity.severity),
        reasons
    );
    let _ = writeln!(
        out,
        "  Overall envelope assessment: {}",
        label(&result.status.overall)
    );
    out
}

/// The serialized form of a unit enum, e.g. `TIGHT_OVER` or `wreck_tail`.
fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(text)) => text,
        _ => String::from("?"),
    }
}

fn optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.2}{}", v, unit),
        None => String::from("N/A"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfmcore::envelope::{GStatus, RadiusStatus, RangeStatus};

    #[test]
    fn labels_match_serialized_names() {
        assert_eq!(label(&RangeStatus::NotAvailable), "N/A");
        assert_eq!(label(&RadiusStatus::LooseUnder), "LOOSE_UNDER");
        assert_eq!(label(&GStatus::Warning), "WARNING");
    }

    #[test]
    fn header_lists_every_threshold() {
        let header = envelope_header(&Envelope::default());
        assert!(header.contains("Sustained TR: 12.0-17.0 deg/s"));
        assert!(header.contains("Max G: 8.0 (warning at 7.0)"));
    }

    #[test]
    fn absent_percentiles_print_as_not_available() {
        assert_eq!(optional(None, " g"), "N/A");
        assert_eq!(optional(Some(4.256), " g"), "4.26 g");
    }
}
