use serde_json::Value;

use payplan_core::{run_analysis, PhasePlan};

use super::analysis::{load_input, AnalysisArgs};

pub fn run_schedule(args: AnalysisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args)?;
    let result = run_analysis(&input)?;
    Ok(serde_json::to_value(result)?)
}

/// The editor's starting plan, ready to be saved and edited as an input file.
pub fn run_default_plan() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(PhasePlan::default_rows())?)
}
