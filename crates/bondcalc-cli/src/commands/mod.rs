pub mod fixed_income;
pub mod portfolio;
