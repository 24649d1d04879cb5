//! Phase plan: the ordered list of payment phases for one run.
//!
//! The editor hands over loosely typed [`PhaseRow`]s. Each row is resolved
//! into a validated [`Phase`] (a dated balloon payment or a recurring
//! amortisation segment) or into an explicit [`PhaseSlot::Skipped`] outcome
//! that the generator reports instead of silently dropping.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PayPlanError;
use crate::types::{percent_to_rate, Money, Percent, Rate, Years};
use crate::PayPlanResult;

/// Fewest whole periods a recurring phase needs to contribute any payment.
pub const MIN_RECURRING_PERIODS: u32 = 1;

/// Average year length used for day-count conversions.
pub const DAYS_PER_YEAR: Decimal = dec!(365.25);

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

/// How often a phase pays. `SpecificDate` is a single dated payment; every
/// other variant is a recurring schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(alias = "Specific Date")]
    SpecificDate,
    Daily,
    Weekly,
    #[serde(alias = "Bi-Weekly")]
    BiWeekly,
    Monthly,
    #[serde(alias = "Bi-Monthly")]
    BiMonthly,
    Quarterly,
    #[serde(alias = "Semi-Annually")]
    SemiAnnually,
    Annually,
}

impl Frequency {
    pub const RECURRING: [Frequency; 8] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::BiWeekly,
        Frequency::Monthly,
        Frequency::BiMonthly,
        Frequency::Quarterly,
        Frequency::SemiAnnually,
        Frequency::Annually,
    ];

    /// Payment periods per year; `None` for a one-off dated payment.
    pub fn periods_per_year(&self) -> Option<u32> {
        match self {
            Frequency::SpecificDate => None,
            Frequency::Daily => Some(365),
            Frequency::Weekly => Some(52),
            Frequency::BiWeekly => Some(26),
            Frequency::Monthly => Some(12),
            Frequency::BiMonthly => Some(6),
            Frequency::Quarterly => Some(4),
            Frequency::SemiAnnually => Some(2),
            Frequency::Annually => Some(1),
        }
    }

    /// Calendar days between consecutive payments: `floor(365.25 / periods_per_year)`.
    pub fn period_days(&self) -> Option<i64> {
        let ppy = self.periods_per_year()?;
        (DAYS_PER_YEAR / Decimal::from(ppy)).floor().to_i64()
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Frequency::SpecificDate)
    }

    /// Label as shown in the phase editor.
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::SpecificDate => "Specific Date",
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::BiWeekly => "Bi-Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::BiMonthly => "Bi-Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::SemiAnnually => "Semi-Annually",
            Frequency::Annually => "Annually",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = PayPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "specificdate" | "date" => Ok(Frequency::SpecificDate),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::BiWeekly),
            "monthly" => Ok(Frequency::Monthly),
            "bimonthly" => Ok(Frequency::BiMonthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "semiannually" | "semiannual" => Ok(Frequency::SemiAnnually),
            "annually" | "annual" | "yearly" => Ok(Frequency::Annually),
            _ => Err(PayPlanError::InvalidInput {
                field: "frequency".into(),
                reason: format!("Unknown frequency '{s}'"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Payment basis
// ---------------------------------------------------------------------------

/// Where a phase's payment amount comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentBasis {
    /// Percent of the initial price (10 = 10%).
    PercentOfPrice(Percent),
    /// Explicit currency amount.
    Fixed(Money),
    /// Solved from the running balance: full payoff for a dated phase,
    /// level annuity payment for a recurring one.
    Solved,
}

impl PaymentBasis {
    /// A positive percent wins over a positive fixed amount; neither means solved.
    pub fn from_inputs(payment_pct: Percent, fixed_payment: Money) -> Self {
        if payment_pct > Decimal::ZERO {
            PaymentBasis::PercentOfPrice(payment_pct)
        } else if fixed_payment > Decimal::ZERO {
            PaymentBasis::Fixed(fixed_payment)
        } else {
            PaymentBasis::Solved
        }
    }

    /// Explicit amount for this basis, or `None` when it must be solved.
    pub fn explicit_amount(&self, price: Money) -> Option<Money> {
        match self {
            PaymentBasis::PercentOfPrice(pct) => Some(price * percent_to_rate(*pct)),
            PaymentBasis::Fixed(amount) => Some(*amount),
            PaymentBasis::Solved => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// One validated row of the payment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Phase {
    SpecificDate {
        target_date: NaiveDate,
        payment: PaymentBasis,
        annual_rate: Rate,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        notes: String,
    },
    Recurring {
        years: Years,
        frequency: Frequency,
        total_periods: u32,
        payment: PaymentBasis,
        annual_rate: Rate,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        notes: String,
    },
}

impl Phase {
    /// A one-off payment on `target_date`, accruing simple interest since the previous event.
    pub fn specific_date(
        target_date: NaiveDate,
        payment: PaymentBasis,
        interest_rate_pct: Percent,
    ) -> Self {
        Phase::SpecificDate {
            target_date,
            payment,
            annual_rate: percent_to_rate(interest_rate_pct),
            notes: String::new(),
        }
    }

    /// A recurring segment of `floor(years * periods_per_year)` payments.
    pub fn recurring(
        years: Years,
        frequency: Frequency,
        payment: PaymentBasis,
        interest_rate_pct: Percent,
    ) -> PayPlanResult<Self> {
        build_recurring(years, frequency, payment, interest_rate_pct, String::new()).map_err(
            |reason| PayPlanError::InvalidInput {
                field: "phase".into(),
                reason: reason.to_string(),
            },
        )
    }

    pub fn with_notes(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            Phase::SpecificDate { notes, .. } | Phase::Recurring { notes, .. } => {
                *notes = text.into()
            }
        }
        self
    }

    /// Resolve an editor row, reporting why it cannot be scheduled.
    pub fn from_row(row: &PhaseRow) -> Result<Self, SkipReason> {
        let payment = PaymentBasis::from_inputs(row.payment_pct, row.fixed_payment);
        let notes = row.notes.clone().unwrap_or_default();

        if row.frequency.is_recurring() {
            let years = row.years.unwrap_or(Decimal::ZERO);
            return build_recurring(
                years,
                row.frequency,
                payment,
                row.interest_rate_pct,
                notes,
            );
        }

        let raw = row
            .target_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(SkipReason::MissingTargetDate)?;
        let target_date = parse_target_date(raw)
            .map_err(|_| SkipReason::UnparseableTargetDate {
                raw: raw.to_string(),
            })?;

        Ok(Phase::specific_date(target_date, payment, row.interest_rate_pct).with_notes(notes))
    }

    pub fn frequency(&self) -> Frequency {
        match self {
            Phase::SpecificDate { .. } => Frequency::SpecificDate,
            Phase::Recurring { frequency, .. } => *frequency,
        }
    }

    pub fn payment(&self) -> &PaymentBasis {
        match self {
            Phase::SpecificDate { payment, .. } | Phase::Recurring { payment, .. } => payment,
        }
    }

    pub fn annual_rate(&self) -> Rate {
        match self {
            Phase::SpecificDate { annual_rate, .. } | Phase::Recurring { annual_rate, .. } => {
                *annual_rate
            }
        }
    }

    pub fn notes(&self) -> &str {
        match self {
            Phase::SpecificDate { notes, .. } | Phase::Recurring { notes, .. } => notes,
        }
    }
}

fn build_recurring(
    years: Years,
    frequency: Frequency,
    payment: PaymentBasis,
    interest_rate_pct: Percent,
    notes: String,
) -> Result<Phase, SkipReason> {
    let ppy = frequency
        .periods_per_year()
        .ok_or(SkipReason::NotRecurring)?;
    if years <= Decimal::ZERO {
        return Err(SkipReason::NonPositiveDuration { years });
    }

    let total_periods = (years * Decimal::from(ppy))
        .floor()
        .to_u32()
        .unwrap_or(u32::MAX);
    if total_periods < MIN_RECURRING_PERIODS {
        return Err(SkipReason::NoWholePeriods { years, frequency });
    }

    Ok(Phase::Recurring {
        years,
        frequency,
        total_periods,
        payment,
        annual_rate: percent_to_rate(interest_rate_pct),
        notes,
    })
}

/// Parse an ISO calendar date, also accepting an ISO timestamp.
pub fn parse_target_date(raw: &str) -> PayPlanResult<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(ts.date());
        }
    }
    Err(PayPlanError::DateError(format!(
        "'{raw}' is not a YYYY-MM-DD date"
    )))
}

// ---------------------------------------------------------------------------
// Editor rows and skip outcomes
// ---------------------------------------------------------------------------

/// A phase exactly as the plan editor produces it. Every field is optional
/// in practice; validation happens in [`Phase::from_row`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRow {
    #[serde(default, alias = "Years")]
    pub years: Option<Years>,
    #[serde(alias = "Frequency")]
    pub frequency: Frequency,
    #[serde(default, alias = "Target Date")]
    pub target_date: Option<String>,
    #[serde(default, alias = "Payment %")]
    pub payment_pct: Percent,
    #[serde(default, alias = "Fixed Payment")]
    pub fixed_payment: Money,
    #[serde(default, alias = "Interest Rate %")]
    pub interest_rate_pct: Percent,
    #[serde(default, alias = "Notes")]
    pub notes: Option<String>,
}

/// Why a row contributes nothing to the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    MissingTargetDate,
    UnparseableTargetDate { raw: String },
    NonPositiveDuration { years: Years },
    NoWholePeriods { years: Years, frequency: Frequency },
    NotRecurring,
    UnsolvablePayment { detail: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingTargetDate => write!(f, "dated phase has no target date"),
            SkipReason::UnparseableTargetDate { raw } => {
                write!(f, "target date '{raw}' could not be parsed")
            }
            SkipReason::NonPositiveDuration { years } => {
                write!(f, "recurring phase duration {years} years is not positive")
            }
            SkipReason::NoWholePeriods { years, frequency } => write!(
                f,
                "{years} years at {frequency} frequency is less than {MIN_RECURRING_PERIODS} whole period"
            ),
            SkipReason::NotRecurring => write!(f, "frequency is not a recurring schedule"),
            SkipReason::UnsolvablePayment { detail } => {
                write!(f, "level payment could not be solved: {detail}")
            }
        }
    }
}

/// A plan position: either a schedulable phase or an explicit skip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhaseSlot {
    Ready { label: String, phase: Phase },
    Skipped { label: String, reason: SkipReason },
}

impl PhaseSlot {
    pub fn label(&self) -> &str {
        match self {
            PhaseSlot::Ready { label, .. } | PhaseSlot::Skipped { label, .. } => label,
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Ordered, immutable phase plan for a single computation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhasePlan {
    slots: Vec<PhaseSlot>,
}

fn phase_label(position: usize) -> String {
    format!("Phase {}", position + 1)
}

impl PhasePlan {
    /// Build a plan from already validated phases, labelled `Phase 1..n`.
    pub fn from_phases(phases: impl IntoIterator<Item = Phase>) -> Self {
        let slots = phases
            .into_iter()
            .enumerate()
            .map(|(i, phase)| PhaseSlot::Ready {
                label: phase_label(i),
                phase,
            })
            .collect();
        Self { slots }
    }

    /// Resolve editor rows. Rows that cannot be scheduled keep their position
    /// (and label number) as [`PhaseSlot::Skipped`].
    pub fn from_rows(rows: &[PhaseRow]) -> Self {
        let slots = rows
            .iter()
            .enumerate()
            .map(|(i, row)| match Phase::from_row(row) {
                Ok(phase) => PhaseSlot::Ready {
                    label: phase_label(i),
                    phase,
                },
                Err(reason) => PhaseSlot::Skipped {
                    label: phase_label(i),
                    reason,
                },
            })
            .collect();
        Self { slots }
    }

    /// The editor's starting grid: a 10% deposit, a 5% installment, then the
    /// balance amortised monthly over three years, all at 5%.
    pub fn default_rows() -> Vec<PhaseRow> {
        vec![
            PhaseRow {
                years: Some(Decimal::ZERO),
                frequency: Frequency::SpecificDate,
                target_date: Some("2025-06-15".into()),
                payment_pct: dec!(10),
                fixed_payment: Decimal::ZERO,
                interest_rate_pct: dec!(5),
                notes: Some("10% Deposit".into()),
            },
            PhaseRow {
                years: Some(Decimal::ZERO),
                frequency: Frequency::SpecificDate,
                target_date: Some("2025-12-15".into()),
                payment_pct: dec!(5),
                fixed_payment: Decimal::ZERO,
                interest_rate_pct: dec!(5),
                notes: Some("5% Installment".into()),
            },
            PhaseRow {
                years: Some(dec!(3)),
                frequency: Frequency::Monthly,
                target_date: None,
                payment_pct: Decimal::ZERO,
                fixed_payment: Decimal::ZERO,
                interest_rate_pct: dec!(5),
                notes: Some("Balance Amortization".into()),
            },
        ]
    }

    pub fn slots(&self) -> &[PhaseSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(frequency: Frequency) -> PhaseRow {
        PhaseRow {
            years: None,
            frequency,
            target_date: None,
            payment_pct: Decimal::ZERO,
            fixed_payment: Decimal::ZERO,
            interest_rate_pct: dec!(5),
            notes: None,
        }
    }

    #[test]
    fn test_period_days_table() {
        let days: Vec<i64> = Frequency::RECURRING
            .iter()
            .map(|f| f.period_days().unwrap())
            .collect();
        assert_eq!(days, vec![1, 7, 14, 30, 60, 91, 182, 365]);
        assert_eq!(Frequency::SpecificDate.period_days(), None);
    }

    #[test]
    fn test_frequency_parses_editor_spellings() {
        assert_eq!("Specific Date".parse::<Frequency>().unwrap(), Frequency::SpecificDate);
        assert_eq!("Bi-Weekly".parse::<Frequency>().unwrap(), Frequency::BiWeekly);
        assert_eq!("semi-annually".parse::<Frequency>().unwrap(), Frequency::SemiAnnually);
        assert!("fortnightly-ish".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_frequency_deserialises_display_alias() {
        let f: Frequency = serde_json::from_str("\"Bi-Monthly\"").unwrap();
        assert_eq!(f, Frequency::BiMonthly);
    }

    #[test]
    fn test_percent_takes_precedence_over_fixed() {
        let basis = PaymentBasis::from_inputs(dec!(10), dec!(5000));
        assert_eq!(basis, PaymentBasis::PercentOfPrice(dec!(10)));
        assert_eq!(basis.explicit_amount(dec!(1000000)), Some(dec!(100000)));
    }

    #[test]
    fn test_zero_inputs_mean_solved() {
        let basis = PaymentBasis::from_inputs(Decimal::ZERO, Decimal::ZERO);
        assert_eq!(basis, PaymentBasis::Solved);
        assert_eq!(basis.explicit_amount(dec!(1000)), None);
    }

    #[test]
    fn test_recurring_total_periods_floor() {
        let phase =
            Phase::recurring(dec!(2.99), Frequency::Annually, PaymentBasis::Solved, dec!(5))
                .unwrap();
        match phase {
            Phase::Recurring { total_periods, .. } => assert_eq!(total_periods, 2),
            other => panic!("unexpected phase {other:?}"),
        }
    }

    #[test]
    fn test_recurring_rejects_zero_duration() {
        assert!(
            Phase::recurring(Decimal::ZERO, Frequency::Monthly, PaymentBasis::Solved, dec!(5))
                .is_err()
        );
    }

    #[test]
    fn test_row_with_sub_period_duration_is_skipped() {
        let mut r = row(Frequency::Annually);
        r.years = Some(dec!(0.5));
        assert_eq!(
            Phase::from_row(&r),
            Err(SkipReason::NoWholePeriods {
                years: dec!(0.5),
                frequency: Frequency::Annually
            })
        );
    }

    #[test]
    fn test_dated_row_without_date_is_skipped() {
        assert_eq!(
            Phase::from_row(&row(Frequency::SpecificDate)),
            Err(SkipReason::MissingTargetDate)
        );

        let mut r = row(Frequency::SpecificDate);
        r.target_date = Some("15/06/2025".into());
        assert_eq!(
            Phase::from_row(&r),
            Err(SkipReason::UnparseableTargetDate {
                raw: "15/06/2025".into()
            })
        );
    }

    #[test]
    fn test_target_date_accepts_timestamp() {
        assert_eq!(
            parse_target_date("2025-06-15T00:00:00").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
    }

    #[test]
    fn test_plan_keeps_labels_for_skipped_rows() {
        let mut rows = PhasePlan::default_rows();
        rows[0].target_date = None;
        let plan = PhasePlan::from_rows(&rows);

        assert_eq!(plan.len(), 3);
        assert!(matches!(plan.slots()[0], PhaseSlot::Skipped { .. }));
        assert_eq!(plan.slots()[0].label(), "Phase 1");
        assert_eq!(plan.slots()[2].label(), "Phase 3");
    }

    #[test]
    fn test_row_accepts_grid_column_names() {
        let json = r#"{
            "Years": 3,
            "Frequency": "Monthly",
            "Target Date": null,
            "Payment %": 0,
            "Fixed Payment": 0,
            "Interest Rate %": 5,
            "Notes": "Balance Amortization"
        }"#;
        let r: PhaseRow = serde_json::from_str(json).unwrap();
        assert_eq!(r.frequency, Frequency::Monthly);
        assert_eq!(r.years, Some(dec!(3)));
        assert_eq!(r.interest_rate_pct, dec!(5));
    }
}
