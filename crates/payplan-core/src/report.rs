//! Printable summary of an analysis run.
//!
//! The report shows the headline figures and only the first
//! [`REPORT_ROW_LIMIT`] schedule entries. Its text must be Latin-1
//! encodable; anything else fails the report, never the analysis.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::analysis::{AnalysisInput, AnalysisOutput};
use crate::error::PayPlanError;
use crate::schedule::ScheduleEntry;
use crate::types::Money;
use crate::PayPlanResult;

/// Schedule rows carried into the report.
pub const REPORT_ROW_LIMIT: usize = 30;

const TITLE: &str = "INVESTMENT ANALYSIS REPORT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub payment_date: NaiveDate,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
}

impl From<&ScheduleEntry> for ReportRow {
    fn from(e: &ScheduleEntry) -> Self {
        Self {
            payment_date: e.payment_date,
            payment: e.payment,
            interest: e.interest,
            principal: e.principal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub project_name: String,
    pub currency_symbol: String,
    pub start_date: NaiveDate,
    pub price: Money,
    pub down_payment: Money,
    pub total_cost: Money,
    pub total_interest: Money,
    /// Magnitude of the NPV.
    pub npv: Money,
    pub rows: Vec<ReportRow>,
    /// Entries in the full schedule, of which `rows` is a prefix.
    pub total_entries: usize,
}

impl ScheduleReport {
    pub fn from_analysis(input: &AnalysisInput, output: &AnalysisOutput) -> Self {
        Self {
            project_name: input.project_name.clone(),
            currency_symbol: input.currency.symbol().to_string(),
            start_date: input.start_date,
            price: input.price,
            down_payment: input.down_payment,
            total_cost: output.total_paid,
            total_interest: output.total_interest,
            npv: output.npv.abs(),
            rows: output
                .schedule
                .iter()
                .take(REPORT_ROW_LIMIT)
                .map(ReportRow::from)
                .collect(),
            total_entries: output.schedule.len(),
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.total_entries > self.rows.len()
    }

    /// Plain-text rendering. Fails if any field cannot be encoded as Latin-1.
    pub fn render_text(&self) -> PayPlanResult<String> {
        ensure_latin1("project_name", &self.project_name)?;
        ensure_latin1("currency_symbol", &self.currency_symbol)?;

        let sym = &self.currency_symbol;
        let money = |v: Money| format!("{sym}{}", format_amount(v));

        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{TITLE}");
        let _ = writeln!(out);
        let _ = writeln!(out, "PROJECT: {}", self.project_name);
        let _ = writeln!(out, "Start Date: {}", self.start_date.format("%B %d, %Y"));
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Property Price: {}    Down Payment: {}",
            money(self.price),
            money(self.down_payment)
        );
        let _ = writeln!(
            out,
            "TOTAL COST: {}    TOTAL INTEREST: {}    NPV: {}",
            money(self.total_cost),
            money(self.total_interest),
            money(self.npv)
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "PAYMENT SCHEDULE");
        let _ = writeln!(
            out,
            "{:<10}{:>16}{:>16}{:>16}",
            "Date", "Payment", "Interest", "Principal"
        );
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<10}{:>16}{:>16}{:>16}",
                row.payment_date.format("%b %Y").to_string(),
                format_amount(row.payment),
                format_amount(row.interest),
                format_amount(row.principal)
            );
        }
        if self.is_truncated() {
            let _ = writeln!(
                out,
                "... {} more payment(s) not shown",
                self.total_entries - self.rows.len()
            );
        }

        Ok(out)
    }

    /// [`render_text`](Self::render_text) encoded as Latin-1 bytes.
    pub fn render_latin1(&self) -> PayPlanResult<Vec<u8>> {
        // Every char is at most U+00FF once rendering succeeds.
        Ok(self.render_text()?.chars().map(|c| c as u8).collect())
    }
}

fn ensure_latin1(field: &str, text: &str) -> PayPlanResult<()> {
    match text.chars().find(|c| u32::from(*c) > 0xFF) {
        Some(character) => Err(PayPlanError::ReportEncoding {
            field: field.to_string(),
            character,
        }),
        None => Ok(()),
    }
}

/// Whole units with comma thousands separators, ties to even.
pub fn format_amount(value: Money) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < Decimal::ZERO {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::run_analysis;
    use crate::types::Currency;
    use rust_decimal_macros::dec;

    fn input(currency: Currency) -> AnalysisInput {
        let mut inp: AnalysisInput = serde_json::from_str(
            r#"{ "start_date": "2025-01-01", "price": 1000000, "down_payment": 200000, "discount_rate_pct": 5 }"#,
        )
        .unwrap();
        inp.currency = currency;
        inp
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(0)), "0");
        assert_eq!(format_amount(dec!(999.4)), "999");
        assert_eq!(format_amount(dec!(1000)), "1,000");
        assert_eq!(format_amount(dec!(1234567.5)), "1,234,568");
        assert_eq!(format_amount(dec!(2.5)), "2");
        assert_eq!(format_amount(dec!(-45000.2)), "-45,000");
    }

    #[test]
    fn test_report_caps_rows() {
        let inp = input(Currency::USD);
        let out = run_analysis(&inp).unwrap().result;
        let report = ScheduleReport::from_analysis(&inp, &out);
        assert_eq!(report.rows.len(), REPORT_ROW_LIMIT);
        assert_eq!(report.total_entries, 38);
        assert!(report.npv > Decimal::ZERO);

        let text = report.render_text().unwrap();
        assert!(text.starts_with(TITLE));
        assert!(text.contains("Start Date: January 01, 2025"));
        assert!(text.contains("Property Price: $1,000,000"));
        assert!(text.contains("Jun 2025"));
        assert!(text.contains("8 more payment(s) not shown"));
    }

    #[test]
    fn test_non_latin1_symbol_fails_report() {
        let inp = input(Currency::EUR);
        let out = run_analysis(&inp).unwrap().result;
        let err = ScheduleReport::from_analysis(&inp, &out)
            .render_text()
            .unwrap_err();
        assert!(matches!(
            err,
            PayPlanError::ReportEncoding { ref field, character: '€' } if field == "currency_symbol"
        ));
    }

    #[test]
    fn test_latin1_symbols_render() {
        let inp = input(Currency::GBP);
        let out = run_analysis(&inp).unwrap().result;
        let text = ScheduleReport::from_analysis(&inp, &out).render_text().unwrap();
        assert!(text.contains("Down Payment: £200,000"));

        let bytes = ScheduleReport::from_analysis(&inp, &out).render_latin1().unwrap();
        assert_eq!(bytes.len(), text.chars().count());
        assert!(bytes.contains(&0xA3));
    }
}
