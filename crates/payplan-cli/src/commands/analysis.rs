use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

use payplan_core::{AnalysisInput, BalancePolicy, Currency};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// Carry overpayments into later phases
    Carry,
    /// Floor the running balance at zero after every payment
    ClampRunning,
}

impl From<PolicyArg> for BalancePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Carry => BalancePolicy::Carry,
            PolicyArg::ClampRunning => BalancePolicy::ClampRunning,
        }
    }
}

/// Inputs shared by every command that runs an analysis
#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    /// Path to a JSON or YAML analysis file (flags below override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Project name shown in reports and scenario names
    #[arg(long)]
    pub project_name: Option<String>,

    /// Currency code used to label amounts (e.g. USD, EUR, AED)
    #[arg(long)]
    pub currency: Option<String>,

    /// Property price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment paid on the start date
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Annual discount (inflation) rate in percent
    #[arg(long, allow_hyphen_values = true)]
    pub discount_rate: Option<Decimal>,

    /// Plan start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// How an overshooting payment affects the running balance
    #[arg(long, value_enum)]
    pub balance_policy: Option<PolicyArg>,
}

/// Resolve the analysis input from `--input`, piped stdin, or flags alone,
/// then apply flag overrides.
pub fn load_input(args: &AnalysisArgs) -> Result<AnalysisInput, Box<dyn std::error::Error>> {
    let mut analysis: AnalysisInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(parsed) = input::stdin::read_stdin()? {
        parsed
    } else {
        let price = args
            .price
            .ok_or("--price is required (or provide --input)")?;
        let start_date = args
            .start_date
            .ok_or("--start-date is required (or provide --input)")?;
        serde_json::from_value(serde_json::json!({
            "start_date": start_date,
            "price": price,
        }))?
    };

    if let Some(ref name) = args.project_name {
        analysis.project_name = name.clone();
    }
    if let Some(ref code) = args.currency {
        analysis.currency = Currency::from_code(code);
    }
    if let Some(price) = args.price {
        analysis.price = price;
    }
    if let Some(down) = args.down_payment {
        analysis.down_payment = down;
    }
    if let Some(rate) = args.discount_rate {
        analysis.discount_rate_pct = rate;
    }
    if let Some(date) = args.start_date {
        analysis.start_date = date;
    }
    if let Some(policy) = args.balance_policy {
        analysis.settings.balance_policy = policy.into();
    }

    Ok(analysis)
}
