use chrono::NaiveDate;
use clap::Args;
use rust_decimal_macros::dec;
use serde_json::Value;

use bondcalc_core::fixed_income::bonds::Bond;
use bondcalc_core::portfolio::coupons::{self, Holding, PortfolioInput};

use crate::input;

/// Arguments for portfolio coupon reporting
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to JSON input file (holdings of bonds with unit counts)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_portfolio(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio_input: PortfolioInput = input::load(args.input.as_deref(), "portfolio")?;
    let result = coupons::analyze_portfolio(&portfolio_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the example portfolio
#[derive(Args)]
pub struct DemoArgs {
    /// Units of OFZ 29012 held
    #[arg(long, default_value_t = 10)]
    pub ofz_29012_units: i64,

    /// Units of OFZ 26220 held
    #[arg(long, default_value_t = 15)]
    pub ofz_26220_units: i64,
}

pub fn run_demo(args: DemoArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ofz_29012 = Bond::new(
        "OFZ_29012",
        dec!(1000),
        dec!(39.59),
        182,
        ymd(2019, 11, 20)?,
        ymd(2022, 11, 16)?,
    )?;
    let ofz_26220 = Bond::new(
        "OFZ_26220",
        dec!(1000),
        dec!(36.9),
        182,
        ymd(2019, 12, 11)?,
        ymd(2022, 12, 7)?,
    )?;

    let demo_input = PortfolioInput {
        holdings: vec![
            Holding {
                bond: ofz_29012,
                units: args.ofz_29012_units,
            },
            Holding {
                bond: ofz_26220,
                units: args.ofz_26220_units,
            },
        ],
    };
    let result = coupons::analyze_portfolio(&demo_input)?;
    Ok(serde_json::to_value(result)?)
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("Invalid date {}-{}-{}", year, month, day).into())
}
