use bondcalc_core::fixed_income::bonds::Bond;
use bondcalc_core::fixed_income::yields::{self, BondDeal, DealInput};
use bondcalc_core::time_value::{compound_factor, SecantConfig};
use bondcalc_core::BondCalcError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ofz_29012() -> Bond {
    Bond::new(
        "OFZ_29012",
        dec!(1000),
        dec!(39.59),
        182,
        date(2019, 11, 20),
        date(2022, 11, 16),
    )
    .unwrap()
}

/// Zero-coupon bond with six 182-day periods.
fn zero_coupon() -> Bond {
    Bond::new("ZC", dec!(1000), Decimal::ZERO, 182, date(2024, 1, 1), date(2026, 6, 29)).unwrap()
}

// ===========================================================================
// Current yield
// ===========================================================================

#[test]
fn test_current_yield_is_annual_coupon_over_price() {
    let bond = ofz_29012();
    let deal = BondDeal::new(&bond, dec!(1012.5));
    assert_eq!(
        deal.current_yield().unwrap(),
        bond.annual_coupon().unwrap() / dec!(1012.5)
    );
}

#[test]
fn test_current_yield_zero_price_is_division_by_zero() {
    let bond = ofz_29012();
    let err = BondDeal::new(&bond, Decimal::ZERO).current_yield().unwrap_err();
    assert!(matches!(err, BondCalcError::DivisionByZero { .. }));
}

// ===========================================================================
// Yield to maturity
// ===========================================================================

#[test]
fn test_zero_coupon_round_trip_recovers_rate() {
    let bond = zero_coupon();
    assert_eq!(bond.coupon_count(), 6);

    let r = dec!(0.04);
    let price = dec!(1000) / compound_factor(r, 6).unwrap();
    let deal = BondDeal::new(&bond, price);
    let solved = deal
        .periodic_yield_to_maturity(&SecantConfig::default())
        .unwrap();
    assert!(
        (solved - r).abs() < dec!(0.0001),
        "expected ~{r}, got {solved}"
    );
}

#[test]
fn test_reference_bond_at_par() {
    // Par price: the periodic yield is coupon / face.
    let bond = ofz_29012();
    let deal = BondDeal::new(&bond, dec!(1000));
    let periodic = deal
        .periodic_yield_to_maturity(&SecantConfig::default())
        .unwrap();
    assert!((periodic - dec!(0.03959)).abs() < dec!(0.0000001), "got {periodic}");

    let annual = deal.yield_to_maturity().unwrap();
    assert!((annual - bond.coupon_rate().unwrap()).abs() < dec!(0.000001));
}

#[test]
fn test_ytm_above_coupon_rate_below_par() {
    let bond = ofz_29012();
    let deal = BondDeal::new(&bond, dec!(970));
    let ytm = deal.yield_to_maturity().unwrap();
    assert!(ytm > bond.coupon_rate().unwrap());
}

#[test]
fn test_ytm_below_coupon_rate_above_par() {
    let bond = ofz_29012();
    let deal = BondDeal::new(&bond, dec!(1030));
    let ytm = deal.yield_to_maturity().unwrap();
    assert!(ytm < bond.coupon_rate().unwrap());
}

#[test]
fn test_solver_is_deterministic() {
    let bond = ofz_29012();
    let deal = BondDeal::new(&bond, dec!(985.40));
    assert_eq!(
        deal.yield_to_maturity().unwrap(),
        deal.yield_to_maturity().unwrap()
    );
}

#[test]
fn test_long_schedule_overflow_surfaces_as_error() {
    // 200 weekly periods: the reference starting guess of 100% per period
    // compounds past the decimal range.
    let bond = Bond::new(
        "W",
        dec!(1000),
        dec!(1),
        7,
        date(2024, 1, 1),
        date(2027, 10, 31),
    )
    .unwrap();
    assert_eq!(bond.coupon_count(), 200);
    let err = BondDeal::new(&bond, dec!(990)).yield_to_maturity().unwrap_err();
    assert!(matches!(err, BondCalcError::NumericOverflow { .. }));
}

#[test]
fn test_deep_discount_divergence_is_degenerate() {
    // Far below par the secant iterates run away from the root until
    // discounting seven periods no longer fits in a decimal.
    let bond = ofz_29012();
    let err = BondDeal::new(&bond, dec!(700)).yield_to_maturity().unwrap_err();
    assert!(
        matches!(err, BondCalcError::SolverDegenerate { iteration, .. } if iteration > 0),
        "got {err:?}"
    );
}

// ===========================================================================
// Deal analysis envelope
// ===========================================================================

#[test]
fn test_analyze_deal_reference_bond() {
    let input = DealInput {
        bond: ofz_29012(),
        price: dec!(1000),
        solver: SecantConfig::default(),
    };
    let result = yields::analyze_deal(&input).unwrap();
    let out = &result.result;
    assert_eq!(out.bond_name, "OFZ_29012");
    assert_eq!(out.coupon_count, 7);
    assert_eq!(out.discount_or_premium, "par");
    assert_eq!(out.ytm_pct, "7.94%");
    assert_eq!(out.current_yield_pct, "7.94%");
}

#[test]
fn test_analyze_deal_warns_when_price_exceeds_cash_flows() {
    // Undiscounted flows are 1000 + 6 * 40 = 1240.
    let bond = Bond::new(
        "B",
        dec!(1000),
        dec!(40),
        182,
        date(2024, 1, 1),
        date(2026, 6, 29),
    )
    .unwrap();
    let input = DealInput {
        bond,
        price: dec!(1300),
        solver: SecantConfig::default(),
    };
    let result = yields::analyze_deal(&input).unwrap();
    assert!(result.result.periodic_ytm < Decimal::ZERO);
    assert_eq!(result.result.discount_or_premium, "premium");
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("exceeds the undiscounted")));
}

#[test]
fn test_analyze_deal_rejects_invalid_bond() {
    let input = DealInput {
        bond: Bond {
            face_value: Decimal::ZERO,
            ..ofz_29012()
        },
        price: dec!(1000),
        solver: SecantConfig::default(),
    };
    assert!(matches!(
        yields::analyze_deal(&input),
        Err(BondCalcError::InvalidInput { .. })
    ));
}
