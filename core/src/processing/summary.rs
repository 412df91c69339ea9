use crate::envelope::classify::RADIUS_TIGHT_FACTOR;
use crate::envelope::{Envelope, EnvelopeStatus, SeveritySignals};
use crate::math::stats::{RunTimer, StatsHelper};
use crate::prelude::{AnalysisConfig, ProcessingStage, StageError, StageResult};
use crate::processing::kinematics::KinematicSeries;
use crate::processing::segments::TurnSegment;
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

const P95: f64 = 0.95;

/// The sample with the highest turn rate above maneuvering speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakTurn {
    pub time: f64,
    pub turn_rate: f64,
    pub speed_kt: f64,
    pub altitude_ft: f64,
    pub g: f64,
}

/// The retained segment with the highest average turn rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SustainedTurn {
    pub turn_rate: f64,
    pub avg_speed_kt: Option<f64>,
    pub avg_g: Option<f64>,
    pub duration_s: f64,
    pub time_start: f64,
    pub time_end: f64,
}

impl From<&TurnSegment> for SustainedTurn {
    fn from(segment: &TurnSegment) -> Self {
        Self {
            turn_rate: segment.avg_turn_rate,
            avg_speed_kt: segment.avg_speed_kt,
            avg_g: segment.avg_g,
            duration_s: segment.duration,
            time_start: segment.time_start,
            time_end: segment.time_end,
        }
    }
}

/// Time spent beyond one envelope axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Excursion {
    pub time_s: f64,
    pub longest_run_s: f64,
    /// `time_s` over total turning time; 0 when the flight never turned.
    pub fraction_of_turn: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Excursions {
    pub over_instantaneous: Excursion,
    pub over_g: Excursion,
    pub tight_radius: Excursion,
}

/// Whole-flight statistics over a kinematic series.
///
/// Only the turning time and the best sustained turn depend on how the
/// series was segmented; both are read from the retained segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub time_start: f64,
    pub time_end: f64,
    pub duration_s: f64,
    pub min_speed_kt: f64,
    pub max_speed_kt: f64,
    pub min_altitude_ft: f64,
    pub max_altitude_ft: f64,
    pub altitude_span_ft: f64,
    pub max_inst_turn_rate: f64,
    pub peak_turn: Option<PeakTurn>,
    pub best_sustained: Option<SustainedTurn>,
    pub min_turn_radius_ft: Option<f64>,
    pub max_g: f64,
    pub turn_rate_p95: Option<f64>,
    pub g_p95: Option<f64>,
    pub turn_time_s: f64,
    pub turn_time_fraction: f64,
    pub excursions: Excursions,
}

impl FlightSummary {
    pub fn status(&self, envelope: &Envelope) -> EnvelopeStatus {
        EnvelopeStatus::evaluate(
            envelope,
            Some(self.max_inst_turn_rate),
            self.best_sustained.map(|s| s.turn_rate),
            self.max_g,
            self.min_turn_radius_ft,
        )
    }

    pub fn severity_signals(&self) -> SeveritySignals {
        SeveritySignals {
            peak_turn_rate: self.max_inst_turn_rate,
            best_sustained_turn_rate: self.best_sustained.map(|s| s.turn_rate),
            min_radius_ft: self.min_turn_radius_ft,
            max_g: self.max_g,
            turn_rate_p95: self.turn_rate_p95,
            g_p95: self.g_p95,
            over_instantaneous_fraction: self.excursions.over_instantaneous.fraction_of_turn,
            over_g_fraction: self.excursions.over_g.fraction_of_turn,
            tight_radius_fraction: self.excursions.tight_radius.fraction_of_turn,
        }
    }
}

/// A series together with the sustained turns found in it.
#[derive(Debug, Clone, Copy)]
pub struct SegmentedSeries<'a> {
    pub series: &'a KinematicSeries,
    pub segments: &'a [TurnSegment],
}

pub struct SummaryStage {
    config: Option<AnalysisConfig>,
    logger: LogManager,
}

impl SummaryStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }

    /// Returns `None` for an empty series.
    pub fn summarize(
        v_min_turn_kt: f64,
        envelope: &Envelope,
        input: &SegmentedSeries<'_>,
    ) -> Option<FlightSummary> {
        let series = input.series;
        let (min_speed_kt, max_speed_kt) = StatsHelper::min_max(&series.speed_kt)?;
        let (min_altitude_ft, max_altitude_ft) = StatsHelper::min_max(&series.altitude_ft)?;
        let n = series.len();

        let mut peak: Option<(usize, f64)> = None;
        for i in 0..n {
            if series.speed_kt[i] < v_min_turn_kt {
                continue;
            }
            let rate = series.turn_rate[i].abs();
            if rate > peak.map_or(0.0, |(_, best)| best) {
                peak = Some((i, rate));
            }
        }
        let peak_turn = peak.map(|(i, rate)| PeakTurn {
            time: series.time[i],
            turn_rate: rate,
            speed_kt: series.speed_kt[i],
            altitude_ft: series.altitude_ft[i],
            g: series.g_load[i],
        });

        let mut best_sustained: Option<&TurnSegment> = None;
        for segment in input.segments {
            if segment.avg_turn_rate > best_sustained.map_or(0.0, |b| b.avg_turn_rate) {
                best_sustained = Some(segment);
            }
        }

        let turning: Vec<usize> = (0..n).filter(|&i| series.is_turning(i)).collect();
        let turning_rates: Vec<f64> = turning.iter().map(|&i| series.turn_rate[i].abs()).collect();
        let turning_g: Vec<f64> = turning.iter().map(|&i| series.g_load[i]).collect();
        let min_turn_radius_ft = series
            .turn_radius_ft
            .iter()
            .flatten()
            .copied()
            .reduce(f64::min);
        let max_g = series.g_load.iter().copied().fold(0.0, f64::max);

        let duration_s = series.duration();
        let turn_time_s: f64 = input.segments.iter().map(|s| s.duration).sum();
        let turn_time_fraction = if duration_s > 0.0 {
            turn_time_s / duration_s
        } else {
            0.0
        };

        Some(FlightSummary {
            time_start: series.time[0],
            time_end: series.time[n - 1],
            duration_s,
            min_speed_kt,
            max_speed_kt,
            min_altitude_ft,
            max_altitude_ft,
            altitude_span_ft: max_altitude_ft - min_altitude_ft,
            max_inst_turn_rate: peak.map_or(0.0, |(_, rate)| rate),
            peak_turn,
            best_sustained: best_sustained.map(SustainedTurn::from),
            min_turn_radius_ft,
            max_g,
            turn_rate_p95: StatsHelper::percentile(&turning_rates, P95),
            g_p95: StatsHelper::percentile(&turning_g, P95),
            turn_time_s,
            turn_time_fraction,
            excursions: excursions(v_min_turn_kt, envelope, series, turn_time_s),
        })
    }
}

impl Default for SummaryStage {
    fn default() -> Self {
        Self::new()
    }
}

fn excursions(
    v_min_turn_kt: f64,
    envelope: &Envelope,
    series: &KinematicSeries,
    turn_time_s: f64,
) -> Excursions {
    let tight_radius_ft = envelope.min_turn_radius_ft * RADIUS_TIGHT_FACTOR;
    let mut over_inst = RunTimer::default();
    let mut over_g = RunTimer::default();
    let mut tight = RunTimer::default();

    for i in 1..series.len() {
        let dt = series.dt[i];
        if dt <= 0.0 {
            continue;
        }
        over_inst.observe(
            series.turn_rate[i].abs() > envelope.instantaneous_turn_rate.max
                && series.speed_kt[i] >= v_min_turn_kt,
            dt,
        );
        over_g.observe(series.g_load[i] > envelope.g_max, dt);
        tight.observe(
            series.turn_radius_ft[i].map_or(false, |r| r < tight_radius_ft),
            dt,
        );
    }

    let excursion = |timer: RunTimer| {
        let (time_s, longest_run_s) = timer.finish();
        Excursion {
            time_s,
            longest_run_s,
            fraction_of_turn: if turn_time_s > 0.0 {
                time_s / turn_time_s
            } else {
                0.0
            },
        }
    };
    Excursions {
        over_instantaneous: excursion(over_inst),
        over_g: excursion(over_g),
        tight_radius: excursion(tight),
    }
}

impl<'a> ProcessingStage<SegmentedSeries<'a>> for SummaryStage {
    type Output = FlightSummary;

    fn initialize(&mut self, config: &AnalysisConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: &SegmentedSeries<'a>) -> StageResult<FlightSummary> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let summary = Self::summarize(config.kinematics.v_min_turn_kt, &config.envelope, input)
            .ok_or_else(|| StageError::InvalidInput("empty kinematic series".into()))?;
        self.logger.debug(&format!(
            "SummaryStage peak {:.2} deg/s, max g {:.2}, turning {:.1}s",
            summary.max_inst_turn_rate, summary.max_g, summary.turn_time_s
        ));
        Ok(summary)
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
