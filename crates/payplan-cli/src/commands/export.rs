use clap::Args;
use serde_json::{json, Value};
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

use payplan_core::run_analysis;

use super::analysis::{load_input, AnalysisArgs};
use crate::output::csv_out;

/// Arguments for the CSV schedule export
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Destination CSV file
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args.analysis)?;
    let analysis = run_analysis(&input)?;

    let file = File::create(&args.out)
        .map_err(|e| format!("Failed to create '{}': {}", args.out.display(), e))?;
    let rows = csv_out::write_schedule_csv(file, &analysis.result.schedule)?;
    info!(path = %args.out.display(), rows, "schedule exported");

    Ok(json!({
        "result": {
            "path": args.out.display().to_string(),
            "rows": rows,
        },
        "warnings": analysis.warnings,
    }))
}
