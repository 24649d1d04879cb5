//! Schedule generator: walks a [`PhasePlan`] keeping a running balance and
//! date, emitting one [`ScheduleEntry`] per dated payment.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PayPlanError;
use crate::ledger;
use crate::phase::{Frequency, Phase, PhasePlan, PhaseSlot, SkipReason, DAYS_PER_YEAR};
use crate::time_value::annuity_payment;
use crate::types::{Money, Rate};
use crate::PayPlanResult;

/// Running balance at or below which the plan is treated as paid off and
/// every remaining phase is discarded.
pub const BALANCE_EXHAUSTED_THRESHOLD: Decimal = dec!(0.1);

/// What happens to the running balance when a payment overshoots it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    /// The running balance may go negative and is carried into later phases.
    /// Only the reported per-entry balance is floored at zero.
    #[default]
    Carry,
    /// The running balance itself is floored at zero after every payment.
    ClampRunning,
}

/// One dated payment. Entries are emitted in phase order and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub phase: String,
    pub payment_date: NaiveDate,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    /// Balance after this payment, never below zero.
    pub balance: Money,
}

/// A plan position that produced no entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPhase {
    pub label: String,
    pub reason: SkipReason,
}

/// How the walk over the plan ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Termination {
    /// Every phase was visited.
    Completed,
    /// The balance fell to the exhaustion threshold before `next_phase`.
    BalanceExhausted {
        next_phase: String,
        discarded_phases: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub entries: Vec<ScheduleEntry>,
    pub skipped_phases: Vec<SkippedPhase>,
    pub total_paid: Money,
    pub total_interest: Money,
    /// Running balance at the end of the walk, unclamped.
    pub final_balance: Money,
    pub termination: Termination,
}

/// Generate the payment schedule with the historical [`BalancePolicy::Carry`] policy.
pub fn generate(
    price: Money,
    down_payment: Money,
    plan: &PhasePlan,
    start_date: NaiveDate,
) -> PayPlanResult<ScheduleOutput> {
    generate_with_policy(price, down_payment, plan, start_date, BalancePolicy::default())
}

/// Generate the payment schedule.
///
/// Pure: the only state is the running balance (`price - down_payment`) and
/// the current date (`start_date`), both local to this call. Phases that
/// cannot be scheduled are recorded in `skipped_phases` and leave that state
/// untouched. The only error is a payment date outside the calendar range.
pub fn generate_with_policy(
    price: Money,
    down_payment: Money,
    plan: &PhasePlan,
    start_date: NaiveDate,
    policy: BalancePolicy,
) -> PayPlanResult<ScheduleOutput> {
    let mut run = RunState {
        price,
        balance: price - down_payment,
        date: start_date,
        policy,
        entries: Vec::new(),
    };
    let mut skipped_phases = Vec::new();
    let mut termination = Termination::Completed;

    for (position, slot) in plan.slots().iter().enumerate() {
        if run.balance <= BALANCE_EXHAUSTED_THRESHOLD {
            let discarded = plan.len() - position;
            debug!(
                balance = %run.balance,
                discarded,
                "balance exhausted; discarding remaining phases"
            );
            termination = Termination::BalanceExhausted {
                next_phase: slot.label().to_string(),
                discarded_phases: discarded,
            };
            break;
        }

        match slot {
            PhaseSlot::Skipped { label, reason } => {
                debug!(phase = %label, %reason, "skipping phase");
                skipped_phases.push(SkippedPhase {
                    label: label.clone(),
                    reason: reason.clone(),
                });
            }
            PhaseSlot::Ready { label, phase } => {
                if let Err(reason) = run.apply(label, phase)? {
                    warn!(phase = %label, %reason, "phase payment could not be solved");
                    skipped_phases.push(SkippedPhase {
                        label: label.clone(),
                        reason,
                    });
                }
            }
        }
    }

    let (total_paid, total_interest) = ledger::aggregate_totals(&run.entries, down_payment);
    debug!(
        entries = run.entries.len(),
        skipped = skipped_phases.len(),
        final_balance = %run.balance,
        "schedule generated"
    );

    Ok(ScheduleOutput {
        entries: run.entries,
        skipped_phases,
        total_paid,
        total_interest,
        final_balance: run.balance,
        termination,
    })
}

struct RunState {
    price: Money,
    balance: Money,
    date: NaiveDate,
    policy: BalancePolicy,
    entries: Vec<ScheduleEntry>,
}

impl RunState {
    /// Apply one phase. The outer error is fatal; the inner one is a skip.
    fn apply(&mut self, label: &str, phase: &Phase) -> PayPlanResult<Result<(), SkipReason>> {
        match phase {
            Phase::SpecificDate {
                target_date,
                payment,
                annual_rate,
                ..
            } => {
                let explicit = payment.explicit_amount(self.price);
                self.pay_on_date(label, *target_date, explicit, *annual_rate);
                Ok(Ok(()))
            }
            Phase::Recurring {
                frequency,
                total_periods,
                payment,
                annual_rate,
                ..
            } => self.pay_recurring(
                label,
                *frequency,
                *total_periods,
                payment.explicit_amount(self.price),
                *annual_rate,
            ),
        }
    }

    fn pay_on_date(
        &mut self,
        label: &str,
        target_date: NaiveDate,
        explicit: Option<Money>,
        annual_rate: Rate,
    ) {
        let days = (target_date - self.date).num_days().max(0);
        let elapsed_years = Decimal::from(days) / DAYS_PER_YEAR;

        // Simple interest since the previous event.
        let interest = self.balance * annual_rate * elapsed_years;
        let (payment, principal) = match explicit {
            Some(amount) => (amount, amount - interest),
            // Full payoff retires exactly the outstanding balance.
            None => (self.balance + interest, self.balance),
        };

        debug!(phase = %label, %target_date, days, %payment, "dated payment");
        self.record(label, target_date, payment, interest, principal);
        self.date = target_date;
    }

    fn pay_recurring(
        &mut self,
        label: &str,
        frequency: Frequency,
        total_periods: u32,
        explicit: Option<Money>,
        annual_rate: Rate,
    ) -> PayPlanResult<Result<(), SkipReason>> {
        let (Some(ppy), Some(step_days)) = (frequency.periods_per_year(), frequency.period_days())
        else {
            return Ok(Err(SkipReason::NotRecurring));
        };
        let rate = annual_rate / Decimal::from(ppy);

        let payment = match explicit {
            Some(amount) => amount,
            None => match annuity_payment(self.balance, rate, total_periods) {
                Ok(amount) => amount,
                Err(e) => {
                    return Ok(Err(SkipReason::UnsolvablePayment {
                        detail: e.to_string(),
                    }))
                }
            },
        };

        debug!(
            phase = %label,
            %frequency,
            total_periods,
            %payment,
            "recurring payments"
        );

        let step = Days::new(step_days as u64);
        for _ in 0..total_periods {
            let interest = self.balance * rate;
            let date = self.date.checked_add_days(step).ok_or_else(|| {
                PayPlanError::DateError(format!(
                    "{label}: payment date after {} is out of range",
                    self.date
                ))
            })?;
            self.record(label, date, payment, interest, payment - interest);
            self.date = date;
        }
        Ok(Ok(()))
    }

    fn record(
        &mut self,
        label: &str,
        payment_date: NaiveDate,
        payment: Money,
        interest: Money,
        principal: Money,
    ) {
        self.balance -= principal;
        if self.policy == BalancePolicy::ClampRunning && self.balance < Decimal::ZERO {
            self.balance = Decimal::ZERO;
        }
        self.entries.push(ScheduleEntry {
            phase: label.to_string(),
            payment_date,
            payment,
            interest,
            principal,
            balance: self.balance.max(Decimal::ZERO),
        });
    }
}
