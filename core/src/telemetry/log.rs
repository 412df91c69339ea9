use log::{debug, info};

/// Thin wrapper over the `log` facade shared by the analysis stages.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    pub fn debug(&self, message: &str) {
        debug!("{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
