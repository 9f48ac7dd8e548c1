use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolarError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SolarError {
    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        SolarError::Overflow {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for SolarError {
    fn from(e: serde_json::Error) -> Self {
        SolarError::SerializationError(e.to_string())
    }
}
