use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use workflow::config::{Overrides, WorkflowConfig};
use workflow::runner::Runner;

mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Flight-envelope conformance analysis for ACMI recordings")]
struct Args {
    /// Path to a .acmi or zip-packed .zip.acmi recording
    acmi_path: PathBuf,
    /// Load analysis settings from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Substring matched against Name/Type/Group/Pilot; every object when omitted
    #[arg(long)]
    object_filter: Option<String>,
    /// Nested envelope JSON overriding the default envelope
    #[arg(long)]
    envelope: Option<PathBuf>,
    /// Analyze full tracks without post-destruction truncation
    #[arg(long, default_value_t = false)]
    no_truncate: bool,
    #[arg(long)]
    death_gap_s: Option<f64>,
    #[arg(long)]
    wreck_speed_kt: Option<f64>,
    #[arg(long)]
    wreck_alt_band_ft: Option<f64>,
    #[arg(long)]
    wreck_min_tail_s: Option<f64>,
    #[arg(long)]
    post_death_trim_s: Option<f64>,
    /// Print the full result list as JSON instead of the text summary
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            object_filter: self.object_filter.clone(),
            envelope_file: self.envelope.clone(),
            no_truncate: self.no_truncate,
            death_gap_s: self.death_gap_s,
            wreck_speed_kt: self.wreck_speed_kt,
            wreck_alt_band_ft: self.wreck_alt_band_ft,
            wreck_min_tail_s: self.wreck_min_tail_s,
            post_death_trim_s: self.post_death_trim_s,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = match &args.workflow {
        Some(path) => WorkflowConfig::load(path)?,
        None => WorkflowConfig::default(),
    };
    workflow_config.apply(args.overrides());

    let runner = Runner::new(workflow_config);
    let result = runner.execute(&args.acmi_path)?;

    if args.json {
        let json = serde_json::to_string_pretty(&result.results)
            .context("serializing analysis results")?;
        println!("{}", json);
        return Ok(());
    }

    if result.results.is_empty() {
        println!("[INFO] No matching objects or no usable data found.");
        return Ok(());
    }
    println!("[INFO] Analyzed {} object(s).", result.results.len());
    print!("{}", report::envelope_header(&result.envelope));
    println!();
    for analysis in &result.results {
        println!("{}", report::object_summary(analysis));
    }

    Ok(())
}
