pub mod coupons;

pub use coupons::{
    analyze_portfolio, Holding, MonthlyCouponReport, MonthlyTotal, PaymentRow, Portfolio,
    PortfolioInput, PortfolioReport,
};
