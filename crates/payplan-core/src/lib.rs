pub mod analysis;
pub mod error;
pub mod ledger;
pub mod phase;
pub mod schedule;
pub mod time_value;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "report")]
pub mod report;

pub use analysis::{run_analysis, AnalysisInput, AnalysisOutput, EngineSettings};
pub use error::PayPlanError;
pub use ledger::{evaluate, Valuation};
pub use phase::{Frequency, PaymentBasis, Phase, PhasePlan, PhaseRow};
pub use schedule::{generate, generate_with_policy, BalancePolicy, ScheduleEntry, ScheduleOutput};
pub use types::*;

/// Standard result type for all payplan operations
pub type PayPlanResult<T> = Result<T, PayPlanError>;
