use clap::Args;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use payplan_core::report::ScheduleReport;
use payplan_core::run_analysis;

use super::analysis::{load_input, AnalysisArgs};

/// Arguments for the text investment report
#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Destination file for the Latin-1 encoded report
    #[arg(long)]
    pub out: PathBuf,
}

/// Render the report. A report that cannot be rendered is reported in the
/// output; the analysis figures are returned either way.
pub fn run_report(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args.analysis)?;
    let analysis = run_analysis(&input)?;
    let report = ScheduleReport::from_analysis(&input, &analysis.result);

    let mut result = json!({
        "total_paid": analysis.result.total_paid,
        "total_interest": analysis.result.total_interest,
        "npv": report.npv,
        "payment_count": report.total_entries,
    });

    match report.render_latin1() {
        Ok(bytes) => {
            fs::write(&args.out, bytes)
                .map_err(|e| format!("Failed to write '{}': {}", args.out.display(), e))?;
            info!(path = %args.out.display(), rows = report.rows.len(), "report written");
            result["report"] = json!(args.out.display().to_string());
            result["rows"] = json!(report.rows.len());
            result["truncated"] = json!(report.is_truncated());
        }
        Err(e) => {
            warn!(error = %e, "report could not be rendered");
            result["report"] = Value::Null;
            result["report_error"] = json!(e.to_string());
        }
    }

    Ok(json!({
        "result": result,
        "warnings": analysis.warnings,
    }))
}
