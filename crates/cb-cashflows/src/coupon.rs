//! `Coupon` trait: cash flows that accrue interest.
//!
//! A coupon accrues over `[accrual_start, accrual_end)` and pays on its
//! payment date. Irregular coupons carry a notional reference period for
//! day counters that need one.

use crate::cashflow::CashFlow;
use cb_core::{Rate, Real, Time};
use cb_time::{Date, DayCounter};

/// An interest-rate coupon.
pub trait Coupon: CashFlow {
    /// The notional (face) amount.
    fn nominal(&self) -> Real;

    /// Start of the accrual period.
    fn accrual_start_date(&self) -> Date;

    /// End of the accrual period.
    fn accrual_end_date(&self) -> Date;

    /// Reference period start (may differ for irregular coupons).
    fn reference_period_start(&self) -> Date {
        self.accrual_start_date()
    }

    /// Reference period end (may differ for irregular coupons).
    fn reference_period_end(&self) -> Date {
        self.accrual_end_date()
    }

    /// The accrual period in year-fraction units.
    fn accrual_period(&self) -> Time;

    /// The day counter used for accrual.
    fn day_counter(&self) -> &dyn DayCounter;

    /// The annualized rate of the coupon.
    fn rate(&self) -> Rate;

    /// Interest accrued from the start of the period to `date`. Zero outside
    /// `(accrual_start, payment date]`.
    fn accrued_amount(&self, date: Date) -> Real;
}
