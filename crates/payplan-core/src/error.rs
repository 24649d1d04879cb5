use thiserror::Error;

#[cfg(feature = "scenarios")]
use crate::scenarios::ScenarioId;

#[derive(Debug, Error)]
pub enum PayPlanError {
    #[error("Invalid input ({field}): {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Report encoding: {field} contains {character:?}, which the report encoding cannot represent")]
    ReportEncoding { field: String, character: char },

    #[cfg(feature = "scenarios")]
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(ScenarioId),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PayPlanError {
    fn from(e: serde_json::Error) -> Self {
        PayPlanError::SerializationError(e.to_string())
    }
}

impl From<chrono::ParseError> for PayPlanError {
    fn from(e: chrono::ParseError) -> Self {
        PayPlanError::DateError(e.to_string())
    }
}
