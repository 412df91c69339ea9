use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use bfmcore::envelope::Envelope;
use bfmcore::telemetry::Metrics;
use bfmcore::{AnalysisPipeline, AnalysisResult};
use log::info;
use std::path::Path;

pub struct WorkflowResult {
    pub envelope: Envelope,
    pub results: Vec<AnalysisResult>,
    pub metrics: Metrics,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute<P: AsRef<Path>>(&self, recording: P) -> anyhow::Result<WorkflowResult> {
        let recording = recording.as_ref();
        let analysis = self
            .config
            .to_analysis_config()
            .context("resolving analysis config")?;
        let envelope = analysis.envelope.clone();

        let pipeline = AnalysisPipeline::new(analysis);
        let results = pipeline
            .analyze_path(recording)
            .with_context(|| format!("analyzing {}", recording.display()))?;

        let metrics = pipeline.metrics();
        info!(
            "run metrics: analyzed={} skipped={} truncated={}",
            metrics.analyzed, metrics.skipped, metrics.truncated
        );
        Ok(WorkflowResult {
            envelope,
            results,
            metrics,
        })
    }
}
