use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use payplan_core::phase::{PhasePlan, PhaseRow};
use payplan_core::report::ScheduleReport;
use payplan_core::scenarios::ScenarioBook;
use payplan_core::schedule::{generate_with_policy, BalancePolicy, ScheduleEntry};
use payplan_core::AnalysisInput;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ScheduleRequest {
    price: Decimal,
    #[serde(default)]
    down_payment: Decimal,
    start_date: NaiveDate,
    #[serde(default = "PhasePlan::default_rows")]
    phases: Vec<PhaseRow>,
    #[serde(default)]
    balance_policy: BalancePolicy,
}

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let req: ScheduleRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let plan = PhasePlan::from_rows(&req.phases);
    let output = generate_with_policy(
        req.price,
        req.down_payment,
        &plan,
        req.start_date,
        req.balance_policy,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn default_plan() -> NapiResult<String> {
    serde_json::to_string(&PhasePlan::default_rows()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct EvaluateRequest {
    entries: Vec<ScheduleEntry>,
    #[serde(default)]
    down_payment: Decimal,
    #[serde(default)]
    discount_rate_pct: Decimal,
}

#[napi]
pub fn evaluate_schedule(input_json: String) -> NapiResult<String> {
    let req: EvaluateRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let valuation = payplan_core::evaluate(&req.entries, req.down_payment, req.discount_rate_pct)
        .map_err(to_napi_error)?;
    serde_json::to_string(&valuation).map_err(to_napi_error)
}

#[napi]
pub fn run_analysis(input_json: String) -> NapiResult<String> {
    let input: AnalysisInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = payplan_core::run_analysis(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios and report
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct NamedInput {
    name: String,
    input: AnalysisInput,
}

/// Takes `[{ "name": ..., "input": {...} }, ...]` and returns comparison rows in order.
#[napi]
pub fn compare_scenarios(inputs_json: String) -> NapiResult<String> {
    let named: Vec<NamedInput> = serde_json::from_str(&inputs_json).map_err(to_napi_error)?;
    let mut book = ScenarioBook::new();
    for item in named {
        let output = payplan_core::run_analysis(&item.input).map_err(to_napi_error)?;
        book.save_analysis(item.name, &item.input, &output.result);
    }
    serde_json::to_string(&book.comparison()).map_err(to_napi_error)
}

#[napi]
pub fn render_report(input_json: String) -> NapiResult<String> {
    let input: AnalysisInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = payplan_core::run_analysis(&input).map_err(to_napi_error)?;
    ScheduleReport::from_analysis(&input, &output.result)
        .render_text()
        .map_err(to_napi_error)
}
