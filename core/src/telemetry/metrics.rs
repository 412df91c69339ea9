use serde::Serialize;
use std::sync::Mutex;

/// Per-run counters shared by the pipeline.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub analyzed: usize,
    pub skipped: usize,
    pub truncated: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_analyzed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.analyzed += 1;
        }
    }

    /// A selected object had too few samples to analyze.
    pub fn record_skipped(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.skipped += 1;
        }
    }

    pub fn record_truncated(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.truncated += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        self.inner.lock().map(|metrics| *metrics).unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
