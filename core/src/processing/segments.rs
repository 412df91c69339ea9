use crate::envelope::{Envelope, EnvelopeStatus};
use crate::prelude::{AnalysisConfig, ProcessingStage, StageError, StageResult};
use crate::processing::kinematics::KinematicSeries;
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// |turn rate| needed to enter the turning state, deg/s.
    pub tr_min_for_segment_deg_s: f64,
    /// Segments with less valid time than this are discarded.
    pub min_duration_s: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            tr_min_for_segment_deg_s: 8.0,
            min_duration_s: 1.5,
        }
    }
}

/// One sustained turn, time-weighted over its valid steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnSegment {
    pub time_start: f64,
    pub time_end: f64,
    pub duration: f64,
    pub avg_turn_rate: f64,
    pub max_turn_rate: f64,
    pub avg_speed_kt: Option<f64>,
    pub min_speed_kt: Option<f64>,
    pub max_speed_kt: f64,
    pub avg_g: Option<f64>,
    pub max_g: f64,
    pub min_radius_ft: Option<f64>,
    pub status: EnvelopeStatus,
}

/// Scans the series for sustained turns.
pub struct SegmentStage {
    config: Option<AnalysisConfig>,
    logger: LogManager,
}

impl SegmentStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }

    /// Two-state scan: a run opens when the smoothed rate and speed both
    /// clear their thresholds (backdated one sample) and closes at the first
    /// sample that does not.
    pub fn detect(
        config: &SegmentConfig,
        v_min_turn_kt: f64,
        envelope: &Envelope,
        series: &KinematicSeries,
    ) -> Vec<TurnSegment> {
        let n = series.len();
        let mut segments = Vec::new();
        let mut run_start: Option<usize> = None;

        for i in 1..n {
            let turning = series.turn_rate[i].abs() >= config.tr_min_for_segment_deg_s
                && series.speed_kt[i] >= v_min_turn_kt;
            match (turning, run_start) {
                (true, None) => run_start = Some(i - 1),
                (false, Some(start)) => {
                    segments.extend(close_run(config, envelope, series, start, i));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            segments.extend(close_run(config, envelope, series, start, n));
        }
        segments
    }
}

impl Default for SegmentStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Summarizes samples `start+1 .. end`; the backdated start sample only
/// anchors `time_start`.
fn close_run(
    config: &SegmentConfig,
    envelope: &Envelope,
    series: &KinematicSeries,
    start: usize,
    end: usize,
) -> Option<TurnSegment> {
    if end <= start + 1 {
        return None;
    }

    let mut duration = 0.0;
    let mut tr_dt = 0.0;
    let mut speed_dt = 0.0;
    let mut g_dt = 0.0;
    let mut min_speed: Option<f64> = None;
    let mut max_speed = 0.0_f64;
    let mut max_tr = 0.0_f64;
    let mut max_g = 0.0_f64;
    let mut min_radius: Option<f64> = None;

    for j in (start + 1)..end {
        let dt = series.dt[j];
        if dt <= 0.0 {
            continue;
        }
        let tr = series.turn_rate[j].abs();
        let speed = series.speed_kt[j];
        let g = series.g_load[j];

        duration += dt;
        tr_dt += tr * dt;
        speed_dt += speed * dt;
        g_dt += g * dt;
        min_speed = Some(min_speed.map_or(speed, |m| m.min(speed)));
        max_speed = max_speed.max(speed);
        max_tr = max_tr.max(tr);
        max_g = max_g.max(g);
        if let Some(r) = series.turn_radius_ft[j] {
            min_radius = Some(min_radius.map_or(r, |m| m.min(r)));
        }
    }

    if duration <= 0.0 || duration < config.min_duration_s {
        return None;
    }

    let avg_turn_rate = tr_dt / duration;
    let avg_speed_kt = (speed_dt > 0.0).then(|| speed_dt / duration);
    let avg_g = (g_dt > 0.0).then(|| g_dt / duration);
    Some(TurnSegment {
        time_start: series.time[start],
        time_end: series.time[end - 1],
        duration,
        avg_turn_rate,
        max_turn_rate: max_tr,
        avg_speed_kt,
        min_speed_kt: min_speed,
        max_speed_kt: max_speed,
        avg_g,
        max_g,
        min_radius_ft: min_radius,
        status: EnvelopeStatus::evaluate(
            envelope,
            Some(max_tr),
            Some(avg_turn_rate),
            max_g,
            min_radius,
        ),
    })
}

impl ProcessingStage<KinematicSeries> for SegmentStage {
    type Output = Vec<TurnSegment>;

    fn initialize(&mut self, config: &AnalysisConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: &KinematicSeries) -> StageResult<Vec<TurnSegment>> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let segments = Self::detect(
            &config.segments,
            config.kinematics.v_min_turn_kt,
            &config.envelope,
            input,
        );
        self.logger
            .debug(&format!("SegmentStage {} sustained turns", segments.len()));
        Ok(segments)
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acmi::track::Sample;
    use crate::envelope::RangeStatus;
    use crate::processing::kinematics::tests::arc;
    use crate::processing::kinematics::{KinematicsConfig, KinematicsStage};

    fn segments_of(samples: &[Sample]) -> Vec<TurnSegment> {
        let series = KinematicsStage::derive(&KinematicsConfig::default(), samples);
        SegmentStage::detect(&SegmentConfig::default(), 150.0, &Envelope::default(), &series)
    }

    /// Straight, then a turn at `rate` for `turn_s` seconds, then straight, at 1 Hz.
    fn straight_turn_straight(rate: f64, turn_s: usize) -> Vec<Sample> {
        let lead = arc(10, 1.0, 400.0, 0.0, 3000.0);
        let mut samples = lead.clone();
        let last = *lead.last().unwrap();
        let offset = |s: Sample, t0: f64, x0: f64, y0: f64| {
            Sample::new(s.time + t0, s.x + x0, s.y + y0, s.altitude)
        };
        let turn = arc(turn_s + 1, 1.0, 400.0, rate, 3000.0);
        let turn_end = *turn.last().unwrap();
        samples.extend(turn.into_iter().skip(1).map(|s| offset(s, last.time, last.x, last.y)));
        let heading = rate.to_radians() * turn_s as f64;
        let tail = arc(10, 1.0, 400.0, 0.0, 3000.0);
        let (x0, y0) = (last.x + turn_end.x, last.y + turn_end.y);
        let t0 = last.time + turn_end.time;
        samples.extend(tail.into_iter().skip(1).map(|s| {
            let (sin, cos) = heading.sin_cos();
            let (x, y) = (s.x * cos - s.y * sin, s.x * sin + s.y * cos);
            Sample::new(s.time + t0, x0 + x, y0 + y, s.altitude)
        }));
        samples
    }

    #[test]
    fn steady_turn_becomes_one_segment() {
        let segments = segments_of(&straight_turn_straight(14.0, 12));
        assert_eq!(segments.len(), 1);
        let seg = &segments[0];
        assert!(seg.duration >= 1.5);
        assert!((seg.max_turn_rate - 14.0).abs() < 1e-6);
        assert!(seg.avg_turn_rate > 10.0 && seg.avg_turn_rate <= 14.0 + 1e-9);
        assert!(seg.min_radius_ft.is_some());
        assert_eq!(seg.status.sustained, RangeStatus::Within);
        assert_eq!(seg.status.instantaneous, RangeStatus::Under);
    }

    #[test]
    fn short_runs_are_discarded() {
        // One second at 30 deg/s smooths into 10 deg/s over two valid steps.
        let samples = straight_turn_straight(30.0, 1);
        let segments = segments_of(&samples);
        assert_eq!(segments.len(), 1);
        assert!((segments[0].duration - 2.0).abs() < 1e-9);
        assert_eq!(segments[0].time_start, 9.0);

        let strict = SegmentConfig {
            min_duration_s: 2.5,
            ..Default::default()
        };
        let series = KinematicsStage::derive(&KinematicsConfig::default(), &samples);
        assert!(SegmentStage::detect(&strict, 150.0, &Envelope::default(), &series).is_empty());
    }

    #[test]
    fn stage_reads_thresholds_from_config() {
        let mut stage = SegmentStage::new();
        let series = KinematicsStage::derive(
            &KinematicsConfig::default(),
            &straight_turn_straight(14.0, 12),
        );
        assert!(matches!(stage.execute(&series), Err(StageError::Internal(_))));

        let mut config = AnalysisConfig::default();
        config.segments.tr_min_for_segment_deg_s = 15.0;
        stage.initialize(&config).unwrap();
        assert!(stage.execute(&series).unwrap().is_empty());
        stage.cleanup();
    }

    #[test]
    fn slow_turns_never_open_a_segment() {
        let samples = arc(30, 1.0, 120.0, 20.0, 1000.0);
        assert!(segments_of(&samples).is_empty());
    }

    #[test]
    fn turn_running_to_the_end_is_closed() {
        let samples = arc(10, 1.0, 400.0, 9.0, 3000.0);
        let segments = segments_of(&samples);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].time_end, 9.0);
        assert_eq!(segments[0].status.sustained, RangeStatus::Under);
    }
}
