use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::PayPlanError;
use crate::types::{Money, Rate};
use crate::PayPlanResult;

/// Net Present Value of an ordered cash-flow series.
///
/// Discounting is by position: flow `i` is divided by `(1 + rate)^i`
/// regardless of the calendar spacing between flows. Once the discount
/// factor exceeds `Decimal::MAX` every later term is below Decimal
/// resolution and the sum stops there.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> PayPlanResult<Money> {
    if rate <= dec!(-1) {
        return Err(PayPlanError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100% per period".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            match discount.checked_mul(one_plus_r) {
                Some(next) => discount = next,
                None => break,
            }
        }
        if discount.is_zero() {
            return Err(PayPlanError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf
            .checked_div(discount)
            .ok_or_else(|| PayPlanError::DivisionByZero {
                context: format!("NPV term overflow at period {t}"),
            })?;
    }

    Ok(result)
}

/// Level payment that amortises `balance` over `periods` at `rate` per period.
///
/// `balance * rate / (1 - (1 + rate)^-n)`, or straight-line `balance / n`
/// when the rate is zero. A growth factor past `Decimal::MAX` makes
/// `(1 + rate)^-n` vanish, leaving the interest-only payment `balance * rate`.
pub fn annuity_payment(balance: Money, rate: Rate, periods: u32) -> PayPlanResult<Money> {
    if periods == 0 {
        return Err(PayPlanError::InvalidInput {
            field: "periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(balance / Decimal::from(periods));
    }

    let Some(growth) = checked_pow(Decimal::ONE + rate, periods) else {
        return Ok(balance * rate);
    };
    if growth.is_zero() {
        return Err(PayPlanError::DivisionByZero {
            context: "annuity growth factor".into(),
        });
    }

    let denom = Decimal::ONE - Decimal::ONE / growth;
    if denom.is_zero() {
        return Err(PayPlanError::DivisionByZero {
            context: "annuity discount factor".into(),
        });
    }

    Ok(balance * rate / denom)
}

/// base^n by repeated multiplication; `None` on overflow.
fn checked_pow(base: Decimal, n: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(base)?;
    }
    Some(result)
}
