//! `YieldTermStructure`: yield / interest-rate term structures.
//!
//! This module defines the `YieldTermStructure` trait together with the three
//! fundamental quantities any yield curve must provide:
//!
//! * **discount factor**: `P(0,t)`
//! * **zero rate**: the continuously-compounded zero rate for maturity *t*
//! * **forward rate**: the instantaneous forward rate at *t*

use crate::term_structure::TermStructure;
use cb_core::{errors::Result, Compounding, DiscountFactor, Rate, Real, Time};
use cb_time::{Date, DayCounter, Frequency, InterestRate};
use std::sync::Arc;

/// Small time step used for instantaneous forward rate computations.
const DT: Real = 1.0e-4;

/// A yield (interest-rate) term structure.
///
/// Implementors must provide [`discount_impl`](YieldTermStructure::discount_impl);
/// zero and forward rates are derived from it unless overridden.
pub trait YieldTermStructure: TermStructure {
    /// Discount factor for time `t`.
    fn discount_impl(&self, t: Time) -> DiscountFactor;

    /// Continuously-compounded zero rate for time `t`.
    fn zero_rate_impl(&self, t: Time) -> Rate {
        if t <= 0.0 {
            return self.forward_rate_impl(0.0);
        }
        -self.discount_impl(t).ln() / t
    }

    /// Instantaneous forward rate at time `t`, by central difference of
    /// `ln P`.
    fn forward_rate_impl(&self, t: Time) -> Rate {
        let t1 = (t - DT / 2.0).max(0.0);
        let t2 = t1 + DT;
        (self.discount_impl(t1).ln() - self.discount_impl(t2).ln()) / (t2 - t1)
    }

    // ── Public interface ─────────────────────────────────────────────────

    /// Discount factor for a time.
    fn discount(&self, t: Time) -> DiscountFactor {
        self.discount_impl(t)
    }

    /// Discount factor for a date.
    fn discount_date(&self, date: Date) -> DiscountFactor {
        self.discount_impl(self.time_from_reference(date))
    }

    /// Instantaneous forward rate at time `t`.
    fn instantaneous_forward(&self, t: Time) -> Rate {
        self.forward_rate_impl(t)
    }

    /// Zero rate between the reference date and `date`, expressed under the
    /// given compounding and frequency conventions.
    fn zero_rate(
        &self,
        date: Date,
        dc: Arc<dyn DayCounter>,
        comp: Compounding,
        freq: Frequency,
    ) -> Result<InterestRate> {
        let t = dc.year_fraction(self.reference_date(), date);
        let df = self.discount_date(date);
        if t <= 0.0 {
            let r = self.zero_rate_impl(0.0);
            let continuous = InterestRate::new(r, dc, Compounding::Continuous, Frequency::NoFrequency)?;
            return continuous.equivalent_rate(comp, freq, DT);
        }
        InterestRate::implied_rate(1.0 / df, dc, comp, freq, t)
    }
}

// ── Helpers for concrete term structures ──────────────────────────────────────

/// Common data shared by the yield-curve implementations.
#[derive(Debug, Clone)]
pub struct YieldTermStructureData {
    /// Reference date.
    pub reference_date: Date,
    /// Day counter for time calculations.
    pub day_counter: Arc<dyn DayCounter>,
}

impl YieldTermStructureData {
    /// Create a new data bundle.
    pub fn new(reference_date: Date, day_counter: Arc<dyn DayCounter>) -> Self {
        Self {
            reference_date,
            day_counter,
        }
    }
}
