use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Percentages as a user enters them (5 = 5%). Convert with [`percent_to_rate`].
pub type Percent = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

pub fn percent_to_rate(pct: Percent) -> Rate {
    pct / dec!(100)
}

/// Currency used to label amounts. Amounts themselves are never converted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CNY,
    AED,
    SAR,
    CAD,
    AUD,
    CHF,
    INR,
    RUB,
    TRY,
    ZAR,
    Other(String),
}

impl Currency {
    pub fn code(&self) -> &str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CNY => "CNY",
            Currency::AED => "AED",
            Currency::SAR => "SAR",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::INR => "INR",
            Currency::RUB => "RUB",
            Currency::TRY => "TRY",
            Currency::ZAR => "ZAR",
            Currency::Other(code) => code,
        }
    }

    /// Display prefix in the en_US convention. Unknown codes fall back to the code itself.
    pub fn symbol(&self) -> &str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CNY => "CN¥",
            Currency::CAD => "CA$",
            Currency::AUD => "A$",
            Currency::INR => "₹",
            Currency::RUB => "RUB",
            Currency::TRY => "TRY",
            Currency::AED | Currency::SAR | Currency::CHF | Currency::ZAR => self.code(),
            Currency::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Currency::USD,
            "EUR" => Currency::EUR,
            "GBP" => Currency::GBP,
            "JPY" => Currency::JPY,
            "CNY" => Currency::CNY,
            "AED" => Currency::AED,
            "SAR" => Currency::SAR,
            "CAD" => Currency::CAD,
            "AUD" => Currency::AUD,
            "CHF" => Currency::CHF,
            "INR" => Currency::INR,
            "RUB" => Currency::RUB,
            "TRY" => Currency::TRY,
            "ZAR" => Currency::ZAR,
            other => Currency::Other(other.to_string()),
        }
    }
}

/// A single signed cash flow at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_round_trip_by_code() {
        for code in ["USD", "EUR", "GBP", "JPY", "AED", "ZAR"] {
            assert_eq!(Currency::from_code(code).code(), code);
        }
        assert_eq!(Currency::from_code("brl"), Currency::Other("BRL".into()));
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(Currency::USD.symbol(), "$");
        assert_eq!(Currency::GBP.symbol(), "£");
        assert_eq!(Currency::CHF.symbol(), "CHF");
        assert_eq!(Currency::Other("BRL".into()).symbol(), "BRL");
    }

    #[test]
    fn test_percent_to_rate() {
        assert_eq!(percent_to_rate(dec!(5)), dec!(0.05));
        assert_eq!(percent_to_rate(Decimal::ZERO), Decimal::ZERO);
    }
}
