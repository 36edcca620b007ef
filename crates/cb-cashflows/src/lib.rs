//! # cb-cashflows
//!
//! Cash flows, fixed-rate coupons, and the leg analytics bonds are priced
//! and quoted with.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cashflow;
pub mod cashflows;
pub mod coupon;
pub mod fixed_rate_coupon;

pub use cashflow::{CashFlow, Leg, Redemption, SimpleCashFlow};
pub use cashflows::{
    accrued_amount, maturity_date, next_cashflow_date, npv, npv_at_yield, previous_cashflow_date,
    yield_rate,
};
pub use coupon::Coupon;
pub use fixed_rate_coupon::{FixedRateCoupon, FixedRateLegBuilder};
