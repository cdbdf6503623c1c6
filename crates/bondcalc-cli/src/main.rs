mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::fixed_income::{BondScheduleArgs, DealArgs};
use commands::portfolio::{DemoArgs, PortfolioArgs};

/// Bond coupon schedules, yields and portfolio coupon reports
#[derive(Parser)]
#[command(
    name = "bondcalc",
    version,
    about = "Bond coupon schedules, yields and portfolio coupon reports",
    long_about = "A CLI for fixed-coupon bond calculations with decimal precision. \
                  Generates coupon schedules, solves current yield and yield to maturity, \
                  and aggregates portfolio coupons into a monthly cash-flow report. \
                  Set RUST_LOG=debug to trace the solver."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Coupon schedule and coupon metrics for a bond
    BondSchedule(BondScheduleArgs),
    /// Current yield and yield to maturity for a bond at a price
    Deal(DealArgs),
    /// Monthly coupon report for a portfolio of holdings
    Portfolio(PortfolioArgs),
    /// Monthly coupon report for the built-in example portfolio
    Demo(DemoArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::BondSchedule(args) => commands::fixed_income::run_bond_schedule(args),
        Commands::Deal(args) => commands::fixed_income::run_deal(args),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args),
        Commands::Demo(args) => commands::portfolio::run_demo(args),
        Commands::Version => {
            println!("bondcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
