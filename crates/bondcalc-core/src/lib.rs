pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "fixed_income")]
pub mod fixed_income;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use error::BondCalcError;
pub use types::*;

/// Standard result type for all bondcalc operations
pub type BondCalcResult<T> = Result<T, BondCalcError>;
