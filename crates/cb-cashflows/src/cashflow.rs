//! `CashFlow` trait: the base for all cash-flow types.
//!
//! A cash flow is an amount of money paid at a specific date.

use crate::coupon::Coupon;
use cb_core::Real;
use cb_time::Date;
use std::fmt;

/// Base trait for all cash flows.
pub trait CashFlow: fmt::Debug + Send + Sync {
    /// The date on which this cash flow is paid.
    fn date(&self) -> Date;

    /// The amount of cash paid on the payment date.
    fn amount(&self) -> Real;

    /// Whether this cash flow has already occurred relative to `ref_date`.
    ///
    /// A flow paid on `ref_date` itself counts as occurred unless
    /// `include_ref_date` is set.
    fn has_occurred(&self, ref_date: Date, include_ref_date: bool) -> bool {
        if include_ref_date {
            self.date() < ref_date
        } else {
            self.date() <= ref_date
        }
    }

    /// The coupon view of this flow, if it accrues interest.
    fn as_coupon(&self) -> Option<&dyn Coupon> {
        None
    }
}

/// A `Leg` is a sequence of cash flows sorted by payment date.
pub type Leg = Vec<Box<dyn CashFlow>>;

/// A fixed amount at a fixed date.
#[derive(Debug, Clone)]
pub struct SimpleCashFlow {
    /// The payment amount.
    pub amount: Real,
    /// The payment date.
    pub date: Date,
}

impl SimpleCashFlow {
    /// Create a new simple cash flow.
    pub fn new(amount: Real, date: Date) -> Self {
        Self { amount, date }
    }
}

impl CashFlow for SimpleCashFlow {
    fn date(&self) -> Date {
        self.date
    }

    fn amount(&self) -> Real {
        self.amount
    }
}

/// Repayment of principal.
#[derive(Debug, Clone)]
pub struct Redemption {
    /// The redemption amount.
    pub amount: Real,
    /// The redemption date.
    pub date: Date,
}

impl Redemption {
    /// Create a new redemption cash flow.
    pub fn new(amount: Real, date: Date) -> Self {
        Self { amount, date }
    }
}

impl CashFlow for Redemption {
    fn date(&self) -> Date {
        self.date
    }

    fn amount(&self) -> Real {
        self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_cashflow() {
        let d = Date::from_ymd(2025, 6, 15).unwrap();
        let cf = SimpleCashFlow::new(100.0, d);
        assert!((cf.amount() - 100.0).abs() < 1e-15);
        assert_eq!(cf.date(), d);
        assert!(cf.as_coupon().is_none());
    }

    #[test]
    fn has_occurred() {
        let d = Date::from_ymd(2025, 6, 15).unwrap();
        let cf = Redemption::new(100.0, d);
        let before = Date::from_ymd(2025, 6, 14).unwrap();
        let after = Date::from_ymd(2025, 6, 16).unwrap();
        assert!(!cf.has_occurred(before, false));
        assert!(cf.has_occurred(d, false));
        assert!(!cf.has_occurred(d, true));
        assert!(cf.has_occurred(after, true));
    }
}
