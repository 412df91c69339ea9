use crate::acmi::track::Sample;
use crate::math::units::{MPS_TO_KT, M_TO_FT};
use crate::prelude::{AnalysisConfig, ProcessingStage, StageError, StageResult};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationConfig {
    pub enable: bool,
    /// A track ending this long before the recording does is presumed gone.
    pub death_gap_s: f64,
    pub wreck_alt_band_ft: f64,
    pub wreck_speed_kt: f64,
    pub wreck_min_tail_s: f64,
    pub impact_alt_ft: f64,
    /// Altitude span a track needs before an impact cut is attempted.
    pub impact_min_span_ft: f64,
    pub descent_cut_frac: f64,
    pub descent_cut_min_ft: f64,
    pub descent_cut_max_ft: f64,
    pub post_death_trim_s: f64,
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self {
            enable: true,
            death_gap_s: 10.0,
            wreck_alt_band_ft: 75.0,
            wreck_speed_kt: 40.0,
            wreck_min_tail_s: 3.0,
            impact_alt_ft: 120.0,
            impact_min_span_ft: 300.0,
            descent_cut_frac: 0.5,
            descent_cut_min_ft: 800.0,
            descent_cut_max_ft: 5000.0,
            post_death_trim_s: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationMethod {
    WreckTail,
    ImpactDescentCut,
    EarlyEndTrim,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncationOutcome {
    pub cut_time: f64,
    pub method: TruncationMethod,
    pub reason: String,
}

impl TruncationOutcome {
    /// Samples at or before the cut.
    pub fn apply<'a>(&self, samples: &'a [Sample]) -> &'a [Sample] {
        let keep = samples.partition_point(|s| s.time <= self.cut_time);
        &samples[..keep]
    }
}

/// A track plus the latest timestamp seen anywhere in the recording.
#[derive(Debug, Clone, Copy)]
pub struct TrackWindow<'a> {
    pub samples: &'a [Sample],
    pub recording_end: f64,
}

/// Post-event tail removal.
///
/// Recordings often lack an explicit end-of-life event, so a destroyed
/// object keeps logging tumbling or wreck-at-rest motion. The stage proposes
/// one trailing cut time and never removes samples from the middle of a
/// track. Tracks shorter than `min_samples` are never cut, and the speed
/// profile uses the kinematics gap bound.
pub struct TruncationStage {
    config: Option<AnalysisConfig>,
    logger: LogManager,
}

impl TruncationStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }

    pub fn propose(
        config: &AnalysisConfig,
        window: &TrackWindow<'_>,
    ) -> Option<TruncationOutcome> {
        let samples = window.samples;
        let truncation = &config.truncation;
        if !truncation.enable || samples.is_empty() || samples.len() < config.min_samples {
            return None;
        }
        let profile = Profile::of(samples, config.kinematics.max_dt_s);
        wreck_tail(truncation, &profile)
            .or_else(|| early_end(truncation, &profile, window.recording_end))
    }
}

impl Default for TruncationStage {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ProcessingStage<TrackWindow<'a>> for TruncationStage {
    type Output = Option<TruncationOutcome>;

    fn initialize(&mut self, config: &AnalysisConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: &TrackWindow<'a>) -> StageResult<Option<TruncationOutcome>> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let outcome = Self::propose(config, input);
        if let Some(cut) = &outcome {
            self.logger.record(&format!(
                "TruncationStage cut at {:.1}s ({:?}): {}",
                cut.cut_time, cut.method, cut.reason
            ));
        }
        Ok(outcome)
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}

/// Time, altitude and ground speed used by the heuristics.
struct Profile {
    time: Vec<f64>,
    alt_ft: Vec<f64>,
    speed_kt: Vec<f64>,
    min_alt: f64,
    alt_span: f64,
}

impl Profile {
    fn of(samples: &[Sample], max_dt_s: f64) -> Self {
        let n = samples.len();
        let time: Vec<f64> = samples.iter().map(|s| s.time).collect();
        let alt_ft: Vec<f64> = samples.iter().map(|s| s.altitude * M_TO_FT).collect();

        let step_speed = |i: usize| -> Option<f64> {
            let dt = time[i] - time[i - 1];
            if dt <= 0.0 || dt > max_dt_s {
                return None;
            }
            let dx = samples[i].x - samples[i - 1].x;
            let dy = samples[i].y - samples[i - 1].y;
            Some((dx / dt).hypot(dy / dt) * MPS_TO_KT)
        };

        let mut speed_kt = vec![0.0; n];
        // The first sample borrows the first valid step's speed, so invalid
        // leading steps hold it too.
        if let Some(first) = (1..n).find_map(step_speed) {
            speed_kt[0] = first;
        }
        for i in 1..n {
            speed_kt[i] = step_speed(i).unwrap_or(speed_kt[i - 1]);
        }

        let min_alt = alt_ft.iter().copied().fold(f64::INFINITY, f64::min);
        let max_alt = alt_ft.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            time,
            alt_ft,
            speed_kt,
            min_alt,
            alt_span: max_alt - min_alt,
        }
    }

    fn start(&self) -> f64 {
        self.time[0]
    }

    fn end(&self) -> f64 {
        self.time[self.time.len() - 1]
    }
}

fn wreck_tail(config: &TruncationConfig, profile: &Profile) -> Option<TruncationOutcome> {
    let is_wreck = |i: usize| {
        profile.alt_ft[i] <= profile.min_alt + config.wreck_alt_band_ft
            && profile.speed_kt[i] <= config.wreck_speed_kt
    };

    let last = profile.time.len() - 1;
    if !is_wreck(last) {
        return None;
    }
    let mut tail_start = last;
    while tail_start > 0 && is_wreck(tail_start - 1) {
        tail_start -= 1;
    }

    let tail = profile.end() - profile.time[tail_start];
    if tail < config.wreck_min_tail_s {
        return None;
    }
    Some(TruncationOutcome {
        cut_time: profile.start().max(profile.time[tail_start]),
        method: TruncationMethod::WreckTail,
        reason: format!(
            "{:.1}s wreck tail within {:.0}ft of min altitude {:.0}ft at <= {:.0}kt",
            tail, config.wreck_alt_band_ft, profile.min_alt, config.wreck_speed_kt
        ),
    })
}

fn early_end(
    config: &TruncationConfig,
    profile: &Profile,
    recording_end: f64,
) -> Option<TruncationOutcome> {
    let gap = (recording_end - profile.end()).max(0.0);
    if gap <= config.death_gap_s {
        return None;
    }
    let trim = config.post_death_trim_s.max(0.0);

    let impacted =
        profile.min_alt <= config.impact_alt_ft && profile.alt_span > config.impact_min_span_ft;
    if impacted {
        let cut_ft = (config.descent_cut_frac * profile.alt_span)
            .min(config.descent_cut_max_ft)
            .max(config.descent_cut_min_ft);
        let floor = profile.min_alt + cut_ft;
        let last = profile.time.len() - 1;
        let above = profile.alt_ft.iter().rposition(|alt| *alt > floor);
        if let Some(idx) = above.filter(|idx| *idx < last) {
            return Some(TruncationOutcome {
                cut_time: profile.start().max(profile.time[idx] - trim),
                method: TruncationMethod::ImpactDescentCut,
                reason: format!(
                    "track ended {:.1}s early after ground impact (min altitude {:.0}ft); \
                     cut below {:.0}ft and trimmed {:.1}s",
                    gap, profile.min_alt, floor, trim
                ),
            });
        }
    }

    Some(TruncationOutcome {
        cut_time: profile.start().max(profile.end() - trim),
        method: TruncationMethod::EarlyEndTrim,
        reason: format!("track ended {:.1}s early; trimmed last {:.1}s", gap, trim),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FT: f64 = 1.0 / M_TO_FT;

    fn propose(samples: &[Sample], recording_end: f64) -> Option<TruncationOutcome> {
        TruncationStage::propose(
            &AnalysisConfig::default(),
            &TrackWindow {
                samples,
                recording_end,
            },
        )
    }

    /// 20 s of level flight at 10 000 ft and 200 m/s.
    fn flying() -> Vec<Sample> {
        (0..20)
            .map(|i| Sample::new(i as f64, 200.0 * i as f64, 0.0, 10_000.0 * FT))
            .collect()
    }

    #[test]
    fn wreck_tail_cuts_at_first_tail_sample() {
        let mut samples = flying();
        // Falls straight down onto the wreck site, then sits there.
        let (x, y) = (samples[19].x, samples[19].y);
        for k in 0..5 {
            let drift = 2.0 * k as f64;
            let alt = (20.0 + if k % 2 == 0 { 50.0 } else { -50.0 }) * FT;
            samples.push(Sample::new(21.0 + k as f64, x + drift, y, alt.max(0.0)));
        }
        let outcome = propose(&samples, 24.0).unwrap();
        assert_eq!(outcome.method, TruncationMethod::WreckTail);
        assert_eq!(outcome.cut_time, 21.0);
        assert_eq!(outcome.apply(&samples).len(), 21);
    }

    #[test]
    fn short_wreck_tail_is_ignored() {
        let mut samples = flying();
        let (x, y) = (samples[19].x, samples[19].y);
        samples.push(Sample::new(21.0, x, y, 0.0));
        samples.push(Sample::new(22.0, x, y, 0.0));
        assert!(propose(&samples, 22.0).is_none());
    }

    #[test]
    fn impact_descent_is_cut_above_the_floor() {
        let mut samples = flying();
        // Steep dive from 10 000 ft to the ground over 10 s.
        for k in 1..=10 {
            let alt_ft = if k == 10 { 0.0 } else { 10_000.0 - 1100.0 * k as f64 };
            let alt = alt_ft * FT;
            samples.push(Sample::new(19.0 + k as f64, 3800.0 + 150.0 * k as f64, 0.0, alt));
        }
        let outcome = propose(&samples, 100.0).unwrap();
        assert_eq!(outcome.method, TruncationMethod::ImpactDescentCut);
        // Floor = 0 + clamp(0.5 * 10 000, 800, 5000) = 5000 ft; last sample above
        // it is the 5600 ft point at t = 23, less the 2 s trim.
        assert!((outcome.cut_time - 21.0).abs() < 1e-9);
    }

    #[test]
    fn early_end_without_impact_trims_the_end() {
        let samples = flying();
        let outcome = propose(&samples, 60.0).unwrap();
        assert_eq!(outcome.method, TruncationMethod::EarlyEndTrim);
        assert_eq!(outcome.cut_time, 17.0);
    }

    #[test]
    fn track_ending_with_recording_is_left_alone() {
        assert!(propose(&flying(), 25.0).is_none());
    }

    #[test]
    fn disabled_or_short_tracks_are_never_cut() {
        let mut config = AnalysisConfig::default();
        config.truncation.enable = false;
        let samples = flying();
        let window = TrackWindow {
            samples: &samples,
            recording_end: 500.0,
        };
        assert!(TruncationStage::propose(&config, &window).is_none());
        assert!(propose(&samples[..4], 500.0).is_none());
    }

    #[test]
    fn minimum_track_length_follows_the_analysis_config() {
        let samples = flying();
        let window = TrackWindow {
            samples: &samples[..8],
            recording_end: 500.0,
        };
        let mut config = AnalysisConfig::default();
        assert!(TruncationStage::propose(&config, &window).is_some());
        config.min_samples = 10;
        assert!(TruncationStage::propose(&config, &window).is_none());
    }

    #[test]
    fn speed_profile_uses_the_kinematics_gap_bound() {
        // 8 s gaps are invalid under the default 5 s bound.
        let samples: Vec<Sample> = (0..8)
            .map(|i| Sample::new(8.0 * i as f64, 1600.0 * i as f64, 0.0, 0.0))
            .collect();
        let window = TrackWindow {
            samples: &samples,
            recording_end: samples[7].time + 4.0,
        };
        let mut config = AnalysisConfig::default();
        config.truncation.wreck_min_tail_s = 1.0;
        let outcome = TruncationStage::propose(&config, &window).unwrap();
        assert_eq!(outcome.method, TruncationMethod::WreckTail);

        config.kinematics.max_dt_s = 10.0;
        assert!(TruncationStage::propose(&config, &window).is_none());
    }

    #[test]
    fn invalid_leading_step_holds_the_first_valid_speed() {
        let mut samples = flying();
        samples[1].time = samples[0].time;
        let profile = Profile::of(&samples, 5.0);
        let expected = 200.0 * MPS_TO_KT;
        assert!((profile.speed_kt[0] - expected).abs() < 1e-9);
        assert!((profile.speed_kt[1] - expected).abs() < 1e-9);
    }

    #[test]
    fn impacted_track_without_a_sample_above_the_floor_falls_back_to_trim() {
        // Climb from the ground that ends at its highest point.
        let samples: Vec<Sample> = (0..20)
            .map(|i| Sample::new(i as f64, 200.0 * i as f64, 0.0, 100.0 * i as f64 * FT))
            .collect();
        let outcome = propose(&samples, 60.0).unwrap();
        assert_eq!(outcome.method, TruncationMethod::EarlyEndTrim);
        let trim = TruncationConfig::default().post_death_trim_s;
        assert!((outcome.cut_time - (19.0 - trim)).abs() < 1e-9);
    }
}
