//! `ZeroSpreadedTermStructure`: a base curve shifted by a constant
//! continuously-compounded zero spread.
//!
//! Parallel rate shocks for effective duration and convexity are built from
//! this overlay.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use cb_core::{DiscountFactor, Rate, Spread, Time};
use cb_time::{Date, DayCounter};
use std::sync::Arc;

/// `P'(t) = P(t) · exp(-s·t)` over a shared base curve.
#[derive(Debug, Clone)]
pub struct ZeroSpreadedTermStructure {
    base: Arc<dyn YieldTermStructure>,
    spread: Spread,
}

impl ZeroSpreadedTermStructure {
    /// Shift `base` by `spread`.
    pub fn new(base: Arc<dyn YieldTermStructure>, spread: Spread) -> Self {
        Self { base, spread }
    }

    /// The applied spread.
    pub fn spread(&self) -> Spread {
        self.spread
    }

    /// The underlying curve.
    pub fn base(&self) -> &Arc<dyn YieldTermStructure> {
        &self.base
    }
}

impl TermStructure for ZeroSpreadedTermStructure {
    fn reference_date(&self) -> Date {
        self.base.reference_date()
    }

    fn day_counter(&self) -> &dyn DayCounter {
        self.base.day_counter()
    }

    fn max_date(&self) -> Date {
        self.base.max_date()
    }
}

impl YieldTermStructure for ZeroSpreadedTermStructure {
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        self.base.discount(t) * (-self.spread * t).exp()
    }

    fn zero_rate_impl(&self, t: Time) -> Rate {
        self.base.zero_rate_impl(t) + self.spread
    }

    fn forward_rate_impl(&self, t: Time) -> Rate {
        self.base.instantaneous_forward(t) + self.spread
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat_forward::FlatForward;
    use approx::assert_abs_diff_eq;
    use cb_time::Actual365Fixed;

    #[test]
    fn spread_shifts_flat_curve() {
        let base: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::continuous(
            Date::from_ymd(2019, 2, 25).unwrap(),
            0.03,
            Arc::new(Actual365Fixed),
        ));
        let up = ZeroSpreadedTermStructure::new(Arc::clone(&base), 0.0001);
        assert_abs_diff_eq!(up.discount(4.0), (-0.0301_f64 * 4.0).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(up.instantaneous_forward(2.0), 0.0301, epsilon = 1e-15);
        assert_eq!(up.reference_date(), base.reference_date());
        let down = ZeroSpreadedTermStructure::new(base, -0.0001);
        assert!(down.discount(4.0) > up.discount(4.0));
    }
}
