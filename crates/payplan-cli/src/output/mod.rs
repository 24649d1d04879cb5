pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use payplan_core::ScheduleEntry;
use serde_json::Value;

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Schedule entries carried in an analysis envelope, if any.
fn schedule_entries(value: &Value) -> Option<Vec<ScheduleEntry>> {
    let schedule = value.get("result")?.get("schedule")?;
    serde_json::from_value(schedule.clone()).ok()
}
