use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use crate::ledger;
use crate::phase::{PhasePlan, PhaseRow};
use crate::schedule::{
    generate_with_policy, BalancePolicy, ScheduleEntry, SkippedPhase, Termination,
    BALANCE_EXHAUSTED_THRESHOLD,
};
use crate::types::*;
use crate::PayPlanResult;

/// Engine knobs that do not change what a phase means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub balance_policy: BalancePolicy,
}

/// Everything needed for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default)]
    pub currency: Currency,
    pub start_date: NaiveDate,
    pub price: Money,
    #[serde(default)]
    pub down_payment: Money,
    /// Annual discount (inflation) rate in percent.
    #[serde(default)]
    pub discount_rate_pct: Percent,
    #[serde(default = "PhasePlan::default_rows")]
    pub phases: Vec<PhaseRow>,
    #[serde(default)]
    pub settings: EngineSettings,
}

fn default_project_name() -> String {
    "Project Alpha".to_string()
}

impl AnalysisInput {
    pub fn plan(&self) -> PhasePlan {
        PhasePlan::from_rows(&self.phases)
    }
}

/// Schedule plus the aggregates consumers display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub schedule: Vec<ScheduleEntry>,
    pub skipped_phases: Vec<SkippedPhase>,
    pub termination: Termination,
    pub total_paid: Money,
    pub total_interest: Money,
    pub npv: Money,
    /// Balance left after the last payment, floored at zero.
    pub final_balance: Money,
    pub payment_count: usize,
}

/// Generate the schedule for `input` and evaluate it.
pub fn run_analysis(input: &AnalysisInput) -> PayPlanResult<ComputationOutput<AnalysisOutput>> {
    let start = Instant::now();
    let mut warnings = coarse_guard_warnings(input);

    let plan = input.plan();
    let schedule = generate_with_policy(
        input.price,
        input.down_payment,
        &plan,
        input.start_date,
        input.settings.balance_policy,
    )?;
    let valuation = ledger::evaluate(&schedule.entries, input.down_payment, input.discount_rate_pct)?;

    for skipped in &schedule.skipped_phases {
        warnings.push(format!("{} skipped: {}", skipped.label, skipped.reason));
    }
    if let Termination::BalanceExhausted {
        next_phase,
        discarded_phases,
    } = &schedule.termination
    {
        warnings.push(format!(
            "Balance paid off before {next_phase}; {discarded_phases} remaining phase(s) ignored"
        ));
    }
    if schedule.final_balance > BALANCE_EXHAUSTED_THRESHOLD {
        warnings.push(format!(
            "Plan leaves {} of the financed amount unpaid",
            schedule.final_balance.round_dp(2)
        ));
    } else if schedule.final_balance < -BALANCE_EXHAUSTED_THRESHOLD {
        warnings.push(format!(
            "Payments exceed the financed amount by {}",
            (-schedule.final_balance).round_dp(2)
        ));
    }

    let output = AnalysisOutput {
        payment_count: schedule.entries.len(),
        final_balance: schedule.final_balance.max(Decimal::ZERO),
        schedule: schedule.entries,
        skipped_phases: schedule.skipped_phases,
        termination: schedule.termination,
        total_paid: valuation.total_paid,
        total_interest: valuation.total_interest,
        npv: valuation.npv,
    };

    info!(
        project = %input.project_name,
        payments = output.payment_count,
        total_paid = %output.total_paid.round_dp(2),
        npv = %output.npv.round_dp(2),
        "analysis complete"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Phased payment schedule (simple interest on dated phases, level annuity on recurring phases; NPV discounted by payment index at annual rate / 12)",
        &serde_json::json!({
            "project_name": input.project_name,
            "currency": input.currency.code(),
            "start_date": input.start_date.to_string(),
            "price": input.price.to_string(),
            "down_payment": input.down_payment.to_string(),
            "discount_rate_pct": input.discount_rate_pct.to_string(),
            "phases": input.phases.len(),
            "balance_policy": input.settings.balance_policy,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn coarse_guard_warnings(input: &AnalysisInput) -> Vec<String> {
    let mut warnings = Vec::new();
    if input.price <= Decimal::ZERO {
        warn!(price = %input.price, "non-positive price");
        warnings.push(format!("Price {} is not positive", input.price));
    }
    if input.down_payment < Decimal::ZERO || input.down_payment > input.price {
        warn!(down_payment = %input.down_payment, "down payment outside [0, price]");
        warnings.push(format!(
            "Down payment {} is outside [0, {}]",
            input.down_payment, input.price
        ));
    }
    warnings
}
