//! `FlatForward`: a yield term structure with a constant forward rate.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::{YieldTermStructure, YieldTermStructureData};
use cb_core::{errors::Result, Compounding, Rate, Time};
use cb_time::{Actual365Fixed, Date, DayCounter, Frequency, InterestRate};
use std::sync::Arc;

/// A flat (constant) forward-rate yield term structure.
///
/// Discount factors are computed as `P(t) = exp(-r * t)` where `r` is the
/// continuously-compounded equivalent of the supplied rate.
#[derive(Debug, Clone)]
pub struct FlatForward {
    data: YieldTermStructureData,
    /// The continuously-compounded flat rate.
    rate: Rate,
}

impl FlatForward {
    /// Create a flat-forward curve from a rate quoted under the given
    /// compounding convention.
    pub fn new(
        reference_date: Date,
        rate: Rate,
        day_counter: Arc<dyn DayCounter>,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Result<Self> {
        let continuous_rate = if compounding == Compounding::Continuous {
            rate
        } else {
            InterestRate::new(rate, Arc::new(Actual365Fixed), compounding, frequency)?
                .compound_factor_time(1.0)?
                .ln()
        };
        Ok(Self {
            data: YieldTermStructureData::new(reference_date, day_counter),
            rate: continuous_rate,
        })
    }

    /// Create a flat-forward curve assuming continuous compounding.
    pub fn continuous(reference_date: Date, rate: Rate, day_counter: Arc<dyn DayCounter>) -> Self {
        Self {
            data: YieldTermStructureData::new(reference_date, day_counter),
            rate,
        }
    }

    /// The continuously-compounded flat rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl TermStructure for FlatForward {
    fn reference_date(&self) -> Date {
        self.data.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.data.day_counter
    }
}

impl YieldTermStructure for FlatForward {
    fn discount_impl(&self, t: Time) -> f64 {
        (-self.rate * t).exp()
    }

    fn zero_rate_impl(&self, _t: Time) -> Rate {
        self.rate
    }

    fn forward_rate_impl(&self, _t: Time) -> Rate {
        self.rate
    }
}
