pub mod bonds;
pub mod yields;

pub use bonds::{analyze_bond, Bond, BondAnalysis, CouponDates};
pub use yields::{analyze_deal, BondDeal, DealAnalysis, DealInput};
