//! Cash-flow ledger and NPV evaluation over a generated schedule.
//!
//! Flows use the buyer-outflow sign convention: the down payment and every
//! scheduled payment enter the series as negative amounts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::schedule::ScheduleEntry;
use crate::time_value::npv;
use crate::types::{percent_to_rate, CashFlow, Money, Percent, Rate};
use crate::PayPlanResult;

/// Aggregates produced by [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    pub npv: Money,
    pub total_paid: Money,
    pub total_interest: Money,
}

/// Annual discount percent reduced to the per-position rate: `pct / 100 / 12`.
pub fn per_position_rate(discount_rate_pct: Percent) -> Rate {
    percent_to_rate(discount_rate_pct) / dec!(12)
}

/// Signed series: `-down_payment`, then `-payment` for each entry in order.
pub fn cash_flow_series(entries: &[ScheduleEntry], down_payment: Money) -> Vec<Money> {
    std::iter::once(-down_payment)
        .chain(entries.iter().map(|e| -e.payment))
        .collect()
}

/// The same series with dates and phase labels attached, the down payment on `start_date`.
pub fn dated_cash_flows(
    entries: &[ScheduleEntry],
    down_payment: Money,
    start_date: NaiveDate,
) -> Vec<CashFlow> {
    std::iter::once(CashFlow {
        date: start_date,
        amount: -down_payment,
        label: Some("Down Payment".into()),
    })
    .chain(entries.iter().map(|e| CashFlow {
        date: e.payment_date,
        amount: -e.payment,
        label: Some(e.phase.clone()),
    }))
    .collect()
}

/// `(total_paid, total_interest)`; an empty schedule yields `(down_payment, 0)`.
pub fn aggregate_totals(entries: &[ScheduleEntry], down_payment: Money) -> (Money, Money) {
    entries.iter().fold(
        (down_payment, Decimal::ZERO),
        |(paid, interest), e| (paid + e.payment, interest + e.interest),
    )
}

/// Discount the schedule's cash flows and total it.
///
/// NPV discounts by sequence index at a fixed monthly-equivalent rate,
/// whatever the real spacing of the payments. Dated and daily phases are
/// therefore discounted as if each payment were one month apart.
pub fn evaluate(
    entries: &[ScheduleEntry],
    down_payment: Money,
    discount_rate_pct: Percent,
) -> PayPlanResult<Valuation> {
    let series = cash_flow_series(entries, down_payment);
    let npv = npv(per_position_rate(discount_rate_pct), &series)?;
    let (total_paid, total_interest) = aggregate_totals(entries, down_payment);

    Ok(Valuation {
        npv,
        total_paid,
        total_interest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(payment: Money, interest: Money) -> ScheduleEntry {
        ScheduleEntry {
            phase: "Phase 1".into(),
            payment_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            payment,
            interest,
            principal: payment - interest,
            balance: Decimal::ZERO,
        }
    }

    #[test]
    fn test_zero_discount_npv_is_exact_sum() {
        let v = evaluate(&[entry(dec!(100000), dec!(0))], dec!(200000), Decimal::ZERO).unwrap();
        assert_eq!(v.npv, dec!(-300000));
        assert_eq!(v.total_paid, dec!(300000));
    }

    #[test]
    fn test_empty_schedule_aggregates() {
        let v = evaluate(&[], dec!(50000), dec!(5)).unwrap();
        assert_eq!(v.total_paid, dec!(50000));
        assert_eq!(v.total_interest, Decimal::ZERO);
        assert_eq!(v.npv, dec!(-50000));
    }

    #[test]
    fn test_discounting_is_by_position() {
        // 12% a year is 1% per position; the second flow is divided by 1.01 once.
        let v = evaluate(&[entry(dec!(101), dec!(1))], Decimal::ZERO, dec!(12)).unwrap();
        assert_eq!(v.npv, dec!(-100));
        assert_eq!(v.total_interest, dec!(1));
    }

    #[test]
    fn test_series_sign_convention() {
        let series = cash_flow_series(&[entry(dec!(10), dec!(1)), entry(dec!(20), dec!(2))], dec!(5));
        assert_eq!(series, vec![dec!(-5), dec!(-10), dec!(-20)]);
    }

    #[test]
    fn test_dated_flows_start_with_down_payment() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let flows = dated_cash_flows(&[entry(dec!(10), dec!(1))], dec!(5), start);
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0].date, start);
        assert_eq!(flows[0].amount, dec!(-5));
        assert_eq!(flows[1].label.as_deref(), Some("Phase 1"));
    }
}
