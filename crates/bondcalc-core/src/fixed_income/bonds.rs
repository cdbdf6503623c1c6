//! Fixed-coupon bond model.
//!
//! A bond pays a constant coupon every `coupon_period_days` calendar days,
//! starting on its first coupon date, for as long as the payment date does not
//! pass maturity. The schedule is not forced onto the maturity date: when the
//! period does not divide the span evenly, the last coupon falls before it.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::error::BondCalcError;
use crate::types::{
    format_percent, with_metadata, CashFlow, ComputationOutput, Money, Rate, DAYS_PER_YEAR,
};
use crate::BondCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Static terms of a fixed-coupon bond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    /// Identifier, e.g. "OFZ_29012"
    pub name: String,
    /// Principal repaid at maturity
    pub face_value: Money,
    /// Coupon amount paid each period (not a rate)
    pub coupon: Money,
    /// Calendar days between coupon payments
    pub coupon_period_days: u32,
    /// Date of the first coupon payment
    pub first_coupon_date: NaiveDate,
    /// Date the principal is repaid
    pub maturity_date: NaiveDate,
}

/// Lazy coupon date sequence shared by the schedule and the coupon count.
#[derive(Debug, Clone)]
pub struct CouponDates {
    next: Option<NaiveDate>,
    maturity: NaiveDate,
    period_days: u32,
}

impl Iterator for CouponDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let date = self.next?;
        if date > self.maturity {
            self.next = None;
            return None;
        }
        // A zero period would never advance; it yields the first date only.
        self.next = if self.period_days == 0 {
            None
        } else {
            date.checked_add_days(Days::new(u64::from(self.period_days)))
        };
        Some(date)
    }
}

/// Schedule and derived metrics for a single bond.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondAnalysis {
    pub name: String,
    pub face_value: Money,
    pub coupon: Money,
    pub coupon_period_days: u32,
    /// coupon * 365 / coupon_period_days
    pub annual_coupon: Money,
    /// annual_coupon / face_value
    pub coupon_rate: Rate,
    pub coupon_rate_pct: String,
    pub coupon_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_coupon_date: Option<NaiveDate>,
    pub maturity_aligned: bool,
    /// Sum of all coupons over the schedule
    pub total_coupon_income: Money,
    /// Coupons plus principal
    pub total_cash_flow: Money,
    pub schedule: Vec<CashFlow>,
}

// ---------------------------------------------------------------------------
// Bond
// ---------------------------------------------------------------------------

impl Bond {
    /// Build a bond, validating its terms.
    pub fn new(
        name: impl Into<String>,
        face_value: Money,
        coupon: Money,
        coupon_period_days: u32,
        first_coupon_date: NaiveDate,
        maturity_date: NaiveDate,
    ) -> BondCalcResult<Self> {
        let bond = Self {
            name: name.into(),
            face_value,
            coupon,
            coupon_period_days,
            first_coupon_date,
            maturity_date,
        };
        bond.validate()?;
        Ok(bond)
    }

    /// Check the terms. Needed for bonds that arrived through deserialization.
    pub fn validate(&self) -> BondCalcResult<()> {
        if self.name.trim().is_empty() {
            return Err(BondCalcError::InvalidInput {
                field: "name".into(),
                reason: "Bond name cannot be empty".into(),
            });
        }
        if self.face_value <= Decimal::ZERO {
            return Err(BondCalcError::InvalidInput {
                field: "face_value".into(),
                reason: "Face value must be positive".into(),
            });
        }
        if self.coupon < Decimal::ZERO {
            return Err(BondCalcError::InvalidInput {
                field: "coupon".into(),
                reason: "Coupon cannot be negative".into(),
            });
        }
        if self.coupon_period_days == 0 {
            return Err(BondCalcError::InvalidInput {
                field: "coupon_period_days".into(),
                reason: "Coupon period must be at least one day".into(),
            });
        }
        if self.first_coupon_date > self.maturity_date {
            return Err(BondCalcError::InvalidDateRange {
                first_coupon: self.first_coupon_date,
                maturity: self.maturity_date,
            });
        }
        Ok(())
    }

    /// Coupon dates from the first coupon, stepping by the period, up to and
    /// including maturity.
    pub fn coupon_dates(&self) -> CouponDates {
        CouponDates {
            next: Some(self.first_coupon_date),
            maturity: self.maturity_date,
            period_days: self.coupon_period_days,
        }
    }

    /// One coupon cash flow per period, in date order.
    pub fn coupon_payments(&self) -> Vec<CashFlow> {
        self.coupon_dates()
            .map(|date| CashFlow {
                date,
                amount: self.coupon,
                label: Some(self.name.clone()),
            })
            .collect()
    }

    /// Number of coupon periods; always equals `coupon_payments().len()`.
    pub fn coupon_count(&self) -> u32 {
        self.coupon_dates().count() as u32
    }

    pub fn last_coupon_date(&self) -> Option<NaiveDate> {
        self.coupon_dates().last()
    }

    /// Whether the final coupon falls exactly on maturity.
    pub fn is_maturity_aligned(&self) -> bool {
        self.last_coupon_date() == Some(self.maturity_date)
    }

    /// Convert a per-period amount to a per-year amount: `x * 365 / period`.
    pub fn annualize(&self, per_period: Decimal) -> BondCalcResult<Decimal> {
        if self.coupon_period_days == 0 {
            return Err(BondCalcError::DivisionByZero {
                context: "coupon period days".into(),
            });
        }
        Ok(per_period * Decimal::from(DAYS_PER_YEAR) / Decimal::from(self.coupon_period_days))
    }

    /// Coupon income per year.
    pub fn annual_coupon(&self) -> BondCalcResult<Money> {
        self.annualize(self.coupon)
    }

    /// Annual coupon relative to face value.
    pub fn coupon_rate(&self) -> BondCalcResult<Rate> {
        if self.face_value.is_zero() {
            return Err(BondCalcError::DivisionByZero {
                context: "coupon rate (face value)".into(),
            });
        }
        Ok(self.annual_coupon()? / self.face_value)
    }

    /// Holding of `factor` identical units: face value and coupon multiplied,
    /// dates unchanged, renamed `"<name>*<factor>"`.
    pub fn scale(&self, factor: i64) -> BondCalcResult<Bond> {
        if factor <= 0 {
            return Err(BondCalcError::InvalidScaleFactor { factor });
        }
        let multiplier = Decimal::from(factor);
        let overflow = || BondCalcError::NumericOverflow {
            context: format!("scaling {} by {factor}", self.name),
        };

        Ok(Bond {
            name: format!("{}*{}", self.name, factor),
            face_value: self.face_value.checked_mul(multiplier).ok_or_else(overflow)?,
            coupon: self.coupon.checked_mul(multiplier).ok_or_else(overflow)?,
            coupon_period_days: self.coupon_period_days,
            first_coupon_date: self.first_coupon_date,
            maturity_date: self.maturity_date,
        })
    }
}

impl fmt::Display for Bond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (face {}, coupon {} every {} days, {} to {})",
            self.name,
            self.face_value,
            self.coupon,
            self.coupon_period_days,
            self.first_coupon_date,
            self.maturity_date
        )
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Coupon schedule and derived coupon metrics for a bond.
pub fn analyze_bond(bond: &Bond) -> BondCalcResult<ComputationOutput<BondAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    bond.validate()?;

    let schedule = bond.coupon_payments();
    let coupon_count = schedule.len() as u32;
    let annual_coupon = bond.annual_coupon()?;
    let coupon_rate = bond.coupon_rate()?;
    let total_coupon_income: Money = schedule.iter().map(|cf| cf.amount).sum();
    let last_coupon_date = schedule.last().map(|cf| cf.date);
    let maturity_aligned = last_coupon_date == Some(bond.maturity_date);

    if let Some(last) = last_coupon_date {
        if !maturity_aligned {
            warnings.push(format!(
                "Final coupon on {last} precedes maturity {}; the period does not divide the \
                 schedule evenly and no payment is forced on maturity",
                bond.maturity_date
            ));
        }
    }
    if bond.coupon.is_zero() {
        warnings.push("Coupon is zero; schedule carries no income".into());
    }

    let output = BondAnalysis {
        name: bond.name.clone(),
        face_value: bond.face_value,
        coupon: bond.coupon,
        coupon_period_days: bond.coupon_period_days,
        annual_coupon,
        coupon_rate,
        coupon_rate_pct: format_percent(coupon_rate),
        coupon_count,
        last_coupon_date,
        maturity_aligned,
        total_coupon_income,
        total_cash_flow: total_coupon_income + bond.face_value,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "schedule": "first coupon date stepped by the period in days while <= maturity",
        "days_per_year": DAYS_PER_YEAR,
    });

    Ok(with_metadata(
        "Fixed-period coupon schedule",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
