//! Portfolio coupon aggregation.
//!
//! Coupon schedules of several bonds are outer-joined on payment date (a bond
//! with no payment on a date contributes zero), totalled per date, then folded
//! into calendar-month buckets. Months that total zero are left out.

use chrono::{Datelike, NaiveDate};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::time::Instant;

use crate::error::BondCalcError;
use crate::fixed_income::bonds::Bond;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::BondCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An ordered collection of bonds. Order only affects column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub bonds: Vec<Bond>,
}

/// `units` identical copies of a bond.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub bond: Bond,
    #[serde(default = "default_units")]
    pub units: i64,
}

fn default_units() -> i64 {
    1
}

/// Input for portfolio coupon reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub holdings: Vec<Holding>,
}

/// One distinct payment date across the portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub date: NaiveDate,
    /// One amount per bond, in portfolio order; zero where the bond pays nothing
    pub amounts: Vec<Money>,
    pub total: Money,
}

/// Coupon total for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// `YYYY/MM`
    pub month: String,
    pub total: Money,
}

/// Non-zero monthly coupon totals in date order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCouponReport {
    pub months: Vec<MonthlyTotal>,
}

/// Output of portfolio coupon reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    /// Column headers for `payments[].amounts`
    pub bonds: Vec<String>,
    pub payments: Vec<PaymentRow>,
    pub months: Vec<MonthlyTotal>,
    pub total_coupons: Money,
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

impl Portfolio {
    pub fn new(bonds: Vec<Bond>) -> Self {
        Self { bonds }
    }

    /// Expand holdings into bonds, scaling each by its unit count.
    pub fn from_holdings(holdings: &[Holding]) -> BondCalcResult<Self> {
        let bonds = holdings
            .iter()
            .map(|h| {
                if h.units == 1 {
                    Ok(h.bond.clone())
                } else {
                    h.bond.scale(h.units)
                }
            })
            .collect::<BondCalcResult<Vec<Bond>>>()?;
        Ok(Self { bonds })
    }

    pub fn bond_names(&self) -> Vec<String> {
        self.bonds.iter().map(|b| b.name.clone()).collect()
    }

    /// Outer join of every bond's coupon schedule on date, with per-date totals.
    pub fn payment_table(&self) -> Vec<PaymentRow> {
        let width = self.bonds.len();
        let mut joined: BTreeMap<NaiveDate, Vec<Money>> = BTreeMap::new();

        for (column, bond) in self.bonds.iter().enumerate() {
            for cf in bond.coupon_payments() {
                let row = joined
                    .entry(cf.date)
                    .or_insert_with(|| vec![Decimal::ZERO; width]);
                row[column] += cf.amount;
            }
        }

        debug!(
            "joined {} payment dates across {} bonds",
            joined.len(),
            width
        );

        joined
            .into_iter()
            .map(|(date, amounts)| {
                let total = amounts.iter().copied().sum();
                PaymentRow {
                    date,
                    amounts,
                    total,
                }
            })
            .collect()
    }

    /// Per-date totals folded into calendar months, zero months dropped.
    pub fn monthly_totals(&self) -> MonthlyCouponReport {
        bucket_by_month(&self.payment_table())
    }
}

/// Sum payment rows per year-month and keep the non-zero buckets in order.
fn bucket_by_month(rows: &[PaymentRow]) -> MonthlyCouponReport {
    let mut buckets: BTreeMap<(i32, u32), Money> = BTreeMap::new();
    for row in rows {
        *buckets
            .entry((row.date.year(), row.date.month()))
            .or_insert(Decimal::ZERO) += row.total;
    }

    let months = buckets
        .into_iter()
        .filter(|(_, total)| !total.is_zero())
        .map(|((year, month), total)| MonthlyTotal {
            month: format!("{year:04}/{month:02}"),
            total,
        })
        .collect();

    MonthlyCouponReport { months }
}

impl MonthlyCouponReport {
    pub fn total(&self) -> Money {
        self.months.iter().map(|m| m.total).sum()
    }

    pub fn get(&self, month: &str) -> Option<Money> {
        self.months.iter().find(|m| m.month == month).map(|m| m.total)
    }
}

impl fmt::Display for MonthlyCouponReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Coupons by month excluding 0s")?;
        for m in &self.months {
            writeln!(f, "{}: {}", m.month, m.total)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Payment table and monthly coupon report for a set of holdings.
pub fn analyze_portfolio(
    input: &PortfolioInput,
) -> BondCalcResult<ComputationOutput<PortfolioReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.holdings.is_empty() {
        return Err(BondCalcError::InvalidInput {
            field: "holdings".into(),
            reason: "At least one holding is required".into(),
        });
    }
    for holding in &input.holdings {
        holding.bond.validate()?;
    }

    let portfolio = Portfolio::from_holdings(&input.holdings)?;

    let mut seen = HashSet::new();
    for name in portfolio.bond_names() {
        if !seen.insert(name.clone()) {
            warnings.push(format!("Several holdings are named '{name}'; columns are positional"));
        }
    }

    let payments = portfolio.payment_table();
    let report = bucket_by_month(&payments);

    let output = PortfolioReport {
        bonds: portfolio.bond_names(),
        total_coupons: report.total(),
        payments,
        months: report.months,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "join": "outer join on payment date, missing amounts are zero",
        "bucketing": "calendar month, labelled YYYY/MM",
        "zero_months": "excluded",
    });

    Ok(with_metadata(
        "Portfolio coupon cash flows by month",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
