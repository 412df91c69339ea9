use crate::acmi::track::Sample;
use crate::math::units::{kt_to_mps, wrap_pi, G0, MPS_TO_KT, M_TO_FT};
use crate::prelude::{AnalysisConfig, ProcessingStage, StageError, StageResult};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsConfig {
    /// Steps longer than this (or non-positive) hold the previous velocity.
    pub max_dt_s: f64,
    /// Minimum maneuvering speed for radius/g and turn statistics.
    pub v_min_turn_kt: f64,
    /// Turn rates at or below this are treated as straight flight.
    pub omega_min_deg_s: f64,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            max_dt_s: 5.0,
            v_min_turn_kt: 150.0,
            omega_min_deg_s: 1.0,
        }
    }
}

impl KinematicsConfig {
    /// Valid integration step into sample `i`, or `None` for a gap.
    pub fn step(&self, samples: &[Sample], i: usize) -> Option<f64> {
        let dt = samples[i].time - samples[i - 1].time;
        (dt > 0.0 && dt <= self.max_dt_s).then_some(dt)
    }
}

/// Per-sample kinematics, index-aligned with the source samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KinematicSeries {
    pub time: Vec<f64>,
    /// Valid step into each sample; 0 for the first sample and for gaps.
    pub dt: Vec<f64>,
    pub altitude_ft: Vec<f64>,
    pub speed_mps: Vec<f64>,
    pub speed_kt: Vec<f64>,
    pub heading_rad: Vec<f64>,
    /// Finite-difference turn rate before smoothing, deg/s.
    pub raw_turn_rate: Vec<f64>,
    /// Three-point smoothed turn rate, deg/s (signed).
    pub turn_rate: Vec<f64>,
    pub turn_radius_ft: Vec<Option<f64>>,
    pub g_load: Vec<f64>,
}

impl KinematicSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// True where radius and g were defined for the sample.
    pub fn is_turning(&self, i: usize) -> bool {
        self.turn_radius_ft[i].is_some()
    }

    pub fn duration(&self) -> f64 {
        match (self.time.first(), self.time.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

/// Derives velocity, heading, turn rate, radius and g-load from positions.
pub struct KinematicsStage {
    config: Option<KinematicsConfig>,
    logger: LogManager,
}

impl KinematicsStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }

    pub fn derive(config: &KinematicsConfig, samples: &[Sample]) -> KinematicSeries {
        let n = samples.len();
        let mut dt = vec![0.0; n];
        let mut speed_mps = vec![0.0; n];
        let mut raw_heading = vec![0.0; n];

        for i in 1..n {
            match config.step(samples, i) {
                Some(step) => {
                    dt[i] = step;
                    let vx = (samples[i].x - samples[i - 1].x) / step;
                    let vy = (samples[i].y - samples[i - 1].y) / step;
                    speed_mps[i] = vx.hypot(vy);
                    raw_heading[i] = vy.atan2(vx);
                }
                None => {
                    speed_mps[i] = speed_mps[i - 1];
                    raw_heading[i] = raw_heading[i - 1];
                }
            }
        }
        if n >= 2 {
            speed_mps[0] = speed_mps[1];
            raw_heading[0] = raw_heading[1];
        }

        let mut heading_rad = Vec::with_capacity(n);
        let mut acc = raw_heading.first().copied().unwrap_or(0.0);
        for i in 0..n {
            if i > 0 {
                acc += wrap_pi(raw_heading[i] - raw_heading[i - 1]);
            }
            heading_rad.push(acc);
        }

        let mut raw_turn_rate = vec![0.0; n];
        for i in 1..n {
            if dt[i] > 0.0 {
                raw_turn_rate[i] = ((heading_rad[i] - heading_rad[i - 1]) / dt[i]).to_degrees();
            }
        }

        let mut turn_rate = raw_turn_rate.clone();
        for i in 1..n.saturating_sub(1) {
            turn_rate[i] = (raw_turn_rate[i - 1] + raw_turn_rate[i] + raw_turn_rate[i + 1]) / 3.0;
        }

        let v_min = kt_to_mps(config.v_min_turn_kt);
        let omega_min = config.omega_min_deg_s.to_radians();
        let mut turn_radius_ft = vec![None; n];
        let mut g_load = vec![0.0; n];
        for i in 0..n {
            let v = speed_mps[i];
            let omega = turn_rate[i].abs().to_radians();
            if v > v_min && omega > omega_min {
                turn_radius_ft[i] = Some(v / omega * M_TO_FT);
                g_load[i] = v * omega / G0;
            }
        }

        KinematicSeries {
            time: samples.iter().map(|s| s.time).collect(),
            dt,
            altitude_ft: samples.iter().map(|s| s.altitude * M_TO_FT).collect(),
            speed_kt: speed_mps.iter().map(|v| v * MPS_TO_KT).collect(),
            speed_mps,
            heading_rad,
            raw_turn_rate,
            turn_rate,
            turn_radius_ft,
            g_load,
        }
    }
}

impl Default for KinematicsStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage<[Sample]> for KinematicsStage {
    type Output = KinematicSeries;

    fn initialize(&mut self, config: &AnalysisConfig) -> StageResult<()> {
        self.config = Some(config.kinematics.clone());
        Ok(())
    }

    fn execute(&mut self, input: &[Sample]) -> StageResult<KinematicSeries> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let series = Self::derive(config, input);
        let turning = series.turn_radius_ft.iter().filter(|r| r.is_some()).count();
        self.logger.debug(&format!(
            "KinematicsStage {} samples, {} turning",
            series.len(),
            turning
        ));
        Ok(series)
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
