use clap::Args;
use serde_json::Value;

use bondcalc_core::fixed_income::bonds::{self, Bond};
use bondcalc_core::fixed_income::yields::{self, DealInput};

use crate::input;

/// Arguments for bond schedule analysis
#[derive(Args)]
pub struct BondScheduleArgs {
    /// Path to JSON input file (a bond)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_bond_schedule(args: BondScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bond: Bond = input::load(args.input.as_deref(), "bond schedule")?;
    let result = bonds::analyze_bond(&bond)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for deal yield analysis
#[derive(Args)]
pub struct DealArgs {
    /// Path to JSON input file (bond, price, optional solver settings)
    #[arg(long)]
    pub input: Option<String>,

    /// Override the price given in the input
    #[arg(long)]
    pub price: Option<rust_decimal::Decimal>,

    /// Override the secant iteration budget
    #[arg(long)]
    pub iterations: Option<u32>,
}

pub fn run_deal(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut deal_input: DealInput = input::load(args.input.as_deref(), "deal")?;
    if let Some(price) = args.price {
        deal_input.price = price;
    }
    if let Some(iterations) = args.iterations {
        deal_input.solver.iterations = iterations;
    }
    let result = yields::analyze_deal(&deal_input)?;
    Ok(serde_json::to_value(result)?)
}
