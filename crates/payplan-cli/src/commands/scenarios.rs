use chrono::Local;
use clap::Args;
use serde_json::Value;
use tracing::debug;

use payplan_core::scenarios::{Scenario, ScenarioBook};
use payplan_core::{run_analysis, AnalysisInput};

use crate::input;

/// Arguments for scenario comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Analysis files (JSON or YAML), compared in the order given
    #[arg(long, num_args = 1.., required = true)]
    pub inputs: Vec<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut book = ScenarioBook::new();
    let saved_at = Local::now().time();

    for path in &args.inputs {
        let input: AnalysisInput = input::file::read_input(path)?;
        let analysis = run_analysis(&input)?;
        let name = Scenario::default_name(&input.project_name, saved_at);
        let id = book.save_analysis(name, &input, &analysis.result);
        debug!(%id, path = %path, "scenario saved");
    }

    Ok(serde_json::to_value(book.comparison())?)
}
