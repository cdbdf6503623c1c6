use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BondCalcError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid scale factor {factor}: a bond can only be scaled by a positive integer")]
    InvalidScaleFactor { factor: i64 },

    #[error("Invalid date range: first coupon {first_coupon} is after maturity {maturity}")]
    InvalidDateRange {
        first_coupon: NaiveDate,
        maturity: NaiveDate,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Solver degenerate at secant iteration {iteration} (rate: {rate})")]
    SolverDegenerate { iteration: u32, rate: Decimal },

    #[error("Numeric overflow in {context}")]
    NumericOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for BondCalcError {
    fn from(e: serde_json::Error) -> Self {
        BondCalcError::SerializationError(e.to_string())
    }
}
