use std::f64::consts::PI;

pub const MPS_TO_KT: f64 = 1.94384;
pub const M_TO_FT: f64 = 3.28084;
/// Standard gravity, m/s^2.
pub const G0: f64 = 9.80665;

pub fn kt_to_mps(kt: f64) -> f64 {
    kt / MPS_TO_KT
}

/// Folds an angle difference into `[-pi, pi]`.
pub fn wrap_pi(mut angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
