use log::{debug, trace};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BondCalcError;
use crate::types::{Money, Rate};
use crate::BondCalcResult;

/// Lower starting guess for the secant solver (a small positive rate).
const DEFAULT_INITIAL_LOW: Decimal = dec!(0.000001);

/// Fixed iteration budget for the secant solver.
const DEFAULT_SECANT_ITERATIONS: u32 = 100;

/// Iterates closer than this have collapsed at working precision.
const STATIONARY_EPSILON: Decimal = dec!(0.00000000000000000001);

/// Secant solver settings. The solver always spends the full budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecantConfig {
    /// First starting guess `r0`
    pub initial_low: Rate,
    /// Second starting guess `r1`
    pub initial_high: Rate,
    /// Number of secant steps
    pub iterations: u32,
}

impl Default for SecantConfig {
    fn default() -> Self {
        Self {
            initial_low: DEFAULT_INITIAL_LOW,
            initial_high: Decimal::ONE,
            iterations: DEFAULT_SECANT_ITERATIONS,
        }
    }
}

/// `(1 + rate)^periods` by iterative multiplication, with overflow checks.
pub fn compound_factor(rate: Rate, periods: u32) -> BondCalcResult<Decimal> {
    let one_plus_r = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| overflow("compound factor base"))?;

    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor
            .checked_mul(one_plus_r)
            .ok_or_else(|| overflow(&format!("compound factor (1+{rate})^{periods}")))?;
    }
    Ok(factor)
}

/// Present value of `periods` level coupons plus the face value, discounted at
/// the periodic `rate`:
///
/// `coupon * (1 - (1+r)^-n) / r + face * (1+r)^-n`
pub fn level_coupon_pv(
    coupon: Money,
    face_value: Money,
    rate: Rate,
    periods: u32,
) -> BondCalcResult<Money> {
    if rate.is_zero() {
        return Err(BondCalcError::DivisionByZero {
            context: "annuity factor at zero rate".into(),
        });
    }

    let factor = compound_factor(rate, periods)?;
    if factor.is_zero() {
        return Err(BondCalcError::DivisionByZero {
            context: format!("discount factor at rate {rate}"),
        });
    }

    let discount = Decimal::ONE
        .checked_div(factor)
        .ok_or_else(|| overflow("discount factor"))?;
    let annuity = (Decimal::ONE - discount)
        .checked_div(rate)
        .ok_or_else(|| overflow("annuity factor"))?;

    coupon
        .checked_mul(annuity)
        .and_then(|c| face_value.checked_mul(discount).and_then(|p| c.checked_add(p)))
        .ok_or_else(|| overflow("level coupon present value"))
}

/// Secant root finder over Decimal.
///
/// Runs `config.iterations` steps of
/// `r_next = r1 - f(r1) * (r1 - r0) / (f(r1) - f(r0))` without a tolerance
/// check and returns the last `r1`. A vanishing denominator with distinct
/// iterates is `SolverDegenerate`; with iterates that have collapsed onto each
/// other the map is at a fixed point and the current iterate is returned.
///
/// Overflow while evaluating a secant iterate means the iterates diverged and
/// is also reported as `SolverDegenerate`. Overflow at the starting guesses
/// propagates as `NumericOverflow`.
pub fn secant<F>(f: F, config: &SecantConfig) -> BondCalcResult<Rate>
where
    F: Fn(Rate) -> BondCalcResult<Decimal>,
{
    let mut r0 = config.initial_low;
    let mut r1 = config.initial_high;
    let mut f0 = f(r0)?;

    for iteration in 0..config.iterations {
        let f1 = match f(r1) {
            Err(BondCalcError::NumericOverflow { context }) if iteration > 0 => {
                debug!("secant diverged at iteration {iteration}: {context}");
                return Err(BondCalcError::SolverDegenerate {
                    iteration,
                    rate: r1,
                });
            }
            evaluated => evaluated?,
        };
        let Some(denom) = f1.checked_sub(f0) else {
            return Err(BondCalcError::SolverDegenerate {
                iteration,
                rate: r1,
            });
        };

        if denom.is_zero() {
            if r1.checked_sub(r0).is_some_and(|dr| dr.abs() <= STATIONARY_EPSILON) {
                debug!("secant reached a fixed point at iteration {iteration}: {r1}");
                return Ok(r1);
            }
            return Err(BondCalcError::SolverDegenerate {
                iteration,
                rate: r1,
            });
        }

        let next = r1
            .checked_sub(r0)
            .and_then(|dr| f1.checked_mul(dr))
            .and_then(|num| num.checked_div(denom))
            .and_then(|step| r1.checked_sub(step));
        let Some(next) = next else {
            debug!("secant step overflowed at iteration {iteration}");
            return Err(BondCalcError::SolverDegenerate {
                iteration,
                rate: r1,
            });
        };

        trace!("secant iteration {iteration}: r={r1} f(r)={f1} next={next}");

        r0 = r1;
        f0 = f1;
        r1 = next;
    }

    debug!("secant finished {} iterations: {r1}", config.iterations);
    Ok(r1)
}

fn overflow(context: &str) -> BondCalcError {
    BondCalcError::NumericOverflow {
        context: context.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compound_factor_integer_power() {
        assert_eq!(compound_factor(dec!(0.1), 2).unwrap(), dec!(1.21));
        assert_eq!(compound_factor(dec!(0.05), 0).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_compound_factor_overflow() {
        let err = compound_factor(dec!(1), 200).unwrap_err();
        assert!(matches!(err, BondCalcError::NumericOverflow { .. }));
    }

    #[test]
    fn test_level_coupon_pv_par_bond() {
        // Coupon equal to rate * face prices at par
        let pv = level_coupon_pv(dec!(50), dec!(1000), dec!(0.05), 10).unwrap();
        assert!((pv - dec!(1000)).abs() < dec!(0.0000001), "got {pv}");
    }

    #[test]
    fn test_level_coupon_pv_zero_rate_rejected() {
        let err = level_coupon_pv(dec!(50), dec!(1000), Decimal::ZERO, 10).unwrap_err();
        assert!(matches!(err, BondCalcError::DivisionByZero { .. }));
    }

    #[test]
    fn test_level_coupon_pv_minus_one_rate_rejected() {
        let err = level_coupon_pv(dec!(50), dec!(1000), dec!(-1), 3).unwrap_err();
        assert!(matches!(err, BondCalcError::DivisionByZero { .. }));
    }

    #[test]
    fn test_secant_linear_root() {
        // Secant is exact on a line: one step lands on the root, then the
        // iterates collapse onto it.
        let root = secant(|x| Ok(dec!(2) * x - dec!(1)), &SecantConfig::default()).unwrap();
        assert_eq!(root, dec!(0.5));
    }

    #[test]
    fn test_secant_quadratic_root() {
        let config = SecantConfig {
            initial_low: dec!(1),
            initial_high: dec!(2),
            iterations: 100,
        };
        let root = secant(|x| Ok(x * x - dec!(2)), &config).unwrap();
        assert!((root - dec!(1.41421356237)).abs() < dec!(0.00000001), "got {root}");
    }

    #[test]
    fn test_secant_flat_function_is_degenerate() {
        let err = secant(|_| Ok(dec!(3)), &SecantConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            BondCalcError::SolverDegenerate { iteration: 0, .. }
        ));
    }

    #[test]
    fn test_secant_diverging_iterate_is_degenerate() {
        // The first step lands on 100, where the function overflows.
        let f = |x: Decimal| {
            if x > dec!(10) {
                Err(overflow("test"))
            } else {
                Ok(x - dec!(100))
            }
        };
        let err = secant(f, &SecantConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            BondCalcError::SolverDegenerate { iteration: 1, rate } if rate == dec!(100)
        ));
    }

    #[test]
    fn test_secant_overflow_at_starting_guess_propagates() {
        let err = secant(|_| Err(overflow("test")), &SecantConfig::default()).unwrap_err();
        assert!(matches!(err, BondCalcError::NumericOverflow { .. }));
    }

    #[test]
    fn test_secant_zero_iterations_returns_high_guess() {
        let config = SecantConfig {
            iterations: 0,
            ..SecantConfig::default()
        };
        let root = secant(|x| Ok(x - dec!(0.3)), &config).unwrap();
        assert_eq!(root, Decimal::ONE);
    }

    #[test]
    fn test_secant_propagates_function_error() {
        let result = secant(
            |_| {
                Err(BondCalcError::DivisionByZero {
                    context: "test".into(),
                })
            },
            &SecantConfig::default(),
        );
        assert!(matches!(result, Err(BondCalcError::DivisionByZero { .. })));
    }
}
