use serde_json::{json, Value};

use payplan_core::run_analysis;

use super::analysis::{load_input, AnalysisArgs};

pub fn run_npv(args: AnalysisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args)?;
    let analysis = run_analysis(&input)?;
    let res = &analysis.result;

    Ok(json!({
        "result": {
            "npv": res.npv,
            "adjusted_npv": res.npv.abs(),
            "total_paid": res.total_paid,
            "total_interest": res.total_interest,
            "discount_rate_pct": input.discount_rate_pct,
            "payment_count": res.payment_count,
            "currency": input.currency.code(),
        },
        "methodology": analysis.methodology,
        "warnings": analysis.warnings,
    }))
}
