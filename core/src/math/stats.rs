pub struct StatsHelper;

impl StatsHelper {
    /// Order-statistic percentile with linear interpolation between the two
    /// nearest ranks. `q` is a fraction in `[0, 1]`.
    pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        if q <= 0.0 {
            return sorted.first().copied();
        }
        if q >= 1.0 {
            return sorted.last().copied();
        }

        let rank = (sorted.len() - 1) as f64 * q;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        if lo == hi {
            return Some(sorted[lo]);
        }
        let frac = rank - lo as f64;
        Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
    }

    pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
        let mut iter = values.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// Accumulates the total and the longest continuous run of time spent
/// while a condition holds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTimer {
    total: f64,
    current: f64,
    longest: f64,
}

impl RunTimer {
    pub fn observe(&mut self, active: bool, dt: f64) {
        if active {
            self.total += dt;
            self.current += dt;
        } else {
            self.close_run();
        }
    }

    fn close_run(&mut self) {
        if self.current > self.longest {
            self.longest = self.current;
        }
        self.current = 0.0;
    }

    /// Returns `(total, longest_run)`, closing any run still open.
    pub fn finish(mut self) -> (f64, f64) {
        self.close_run();
        (self.total, self.longest)
    }
}
