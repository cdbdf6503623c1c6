use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BondCalcError;
use crate::fixed_income::bonds::Bond;
use crate::time_value::{level_coupon_pv, secant, SecantConfig};
use crate::types::{format_percent, with_metadata, ComputationOutput, Money, Rate};
use crate::BondCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A bond bought at a given dirty price per unit.
#[derive(Debug, Clone, Copy)]
pub struct BondDeal<'a> {
    pub bond: &'a Bond,
    pub price: Money,
}

/// Input for deal analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealInput {
    pub bond: Bond,
    /// Dirty price paid for one unit
    pub price: Money,
    /// Secant solver settings; defaults reproduce the reference solve.
    #[serde(default)]
    pub solver: SecantConfig,
}

/// Output of deal analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealAnalysis {
    pub bond_name: String,
    pub price: Money,
    /// Annual coupon / price
    pub current_yield: Rate,
    pub current_yield_pct: String,
    /// Rate per coupon period solving the pricing equation
    pub periodic_ytm: Rate,
    /// periodic_ytm * 365 / coupon_period_days
    pub ytm: Rate,
    pub ytm_pct: String,
    pub coupon_count: u32,
    /// "premium", "discount" or "par" relative to face value
    pub discount_or_premium: String,
}

// ---------------------------------------------------------------------------
// Yield engine
// ---------------------------------------------------------------------------

impl<'a> BondDeal<'a> {
    pub fn new(bond: &'a Bond, price: Money) -> Self {
        Self { bond, price }
    }

    /// Annual coupon divided by price.
    pub fn current_yield(&self) -> BondCalcResult<Rate> {
        if self.price.is_zero() {
            return Err(BondCalcError::DivisionByZero {
                context: "current yield (price)".into(),
            });
        }
        Ok(self.bond.annual_coupon()? / self.price)
    }

    /// Annualised yield to maturity with the reference solver settings.
    pub fn yield_to_maturity(&self) -> BondCalcResult<Rate> {
        self.yield_to_maturity_with(&SecantConfig::default())
    }

    pub fn yield_to_maturity_with(&self, config: &SecantConfig) -> BondCalcResult<Rate> {
        let periodic = self.periodic_yield_to_maturity(config)?;
        self.bond.annualize(periodic)
    }

    /// Per-period rate `r` with `pricing_error(r) == 0`, found by the secant method.
    pub fn periodic_yield_to_maturity(&self, config: &SecantConfig) -> BondCalcResult<Rate> {
        if self.price <= Decimal::ZERO {
            return Err(BondCalcError::InvalidInput {
                field: "price".into(),
                reason: "Price must be positive".into(),
            });
        }
        if self.bond.coupon_count() == 0 {
            return Err(BondCalcError::InvalidInput {
                field: "bond".into(),
                reason: "Bond has no coupon periods".into(),
            });
        }

        let rate = secant(|r| self.pricing_error(r), config)?;
        debug!("{} at {}: periodic YTM {rate}", self.bond.name, self.price);
        Ok(rate)
    }

    /// Present value of the bond's cash flows at periodic rate `rate`, less the price.
    pub fn pricing_error(&self, rate: Rate) -> BondCalcResult<Money> {
        let pv = level_coupon_pv(
            self.bond.coupon,
            self.bond.face_value,
            rate,
            self.bond.coupon_count(),
        )?;
        Ok(pv - self.price)
    }

    pub fn discount_or_premium(&self) -> &'static str {
        if self.price > self.bond.face_value {
            "premium"
        } else if self.price < self.bond.face_value {
            "discount"
        } else {
            "par"
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Current yield and yield to maturity for a bond bought at `input.price`.
pub fn analyze_deal(input: &DealInput) -> BondCalcResult<ComputationOutput<DealAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.bond.validate()?;
    validate_solver(&input.solver)?;

    let deal = BondDeal::new(&input.bond, input.price);
    let coupon_count = input.bond.coupon_count();

    let undiscounted = input.bond.coupon * Decimal::from(coupon_count) + input.bond.face_value;
    if input.price == undiscounted {
        warnings.push(
            "Price equals the undiscounted cash flows; the yield root sits at zero where the \
             secant method is undefined"
                .into(),
        );
    } else if input.price > undiscounted {
        warnings.push(
            "Price exceeds the undiscounted cash flows; yield to maturity is negative".into(),
        );
    }

    let current_yield = deal.current_yield()?;
    let periodic_ytm = deal.periodic_yield_to_maturity(&input.solver)?;
    let ytm = input.bond.annualize(periodic_ytm)?;

    let output = DealAnalysis {
        bond_name: input.bond.name.clone(),
        price: input.price,
        current_yield,
        current_yield_pct: format_percent(current_yield),
        periodic_ytm,
        ytm,
        ytm_pct: format_percent(ytm),
        coupon_count,
        discount_or_premium: deal.discount_or_premium().to_string(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "ytm_method": "Secant, fixed iteration budget",
        "initial_guesses": [input.solver.initial_low, input.solver.initial_high],
        "iterations": input.solver.iterations,
        "annualisation": "periodic * 365 / coupon_period_days",
        "price_type": "dirty"
    });

    Ok(with_metadata(
        "Bond deal yields (current yield, yield to maturity)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_solver(config: &SecantConfig) -> BondCalcResult<()> {
    if config.initial_low == config.initial_high {
        return Err(BondCalcError::InvalidInput {
            field: "solver".into(),
            reason: "Initial guesses must differ".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
