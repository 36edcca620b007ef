//! `InterpolatedDiscountCurve`: a yield term structure built from
//! discount factors at pillar dates.
//!
//! Discount factors are interpolated log-linearly in time, which gives a
//! piecewise-constant instantaneous forward rate. Beyond the last pillar the
//! last forward rate is extended.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::{YieldTermStructure, YieldTermStructureData};
use cb_core::{ensure, errors::Result, DiscountFactor, Rate, Real, Time};
use cb_time::{Date, DayCounter};
use std::sync::Arc;

/// A yield curve defined by discount factors at known dates.
#[derive(Debug, Clone)]
pub struct InterpolatedDiscountCurve {
    data: YieldTermStructureData,
    dates: Vec<Date>,
    times: Vec<Time>,
    discounts: Vec<DiscountFactor>,
    log_discounts: Vec<Real>,
}

impl InterpolatedDiscountCurve {
    /// Build a discount-factor curve from dates and discount factors.
    ///
    /// The first date is the reference date and its discount factor must be
    /// 1.0. Dates must be strictly increasing and every discount factor
    /// finite and positive.
    pub fn new(
        dates: &[Date],
        discounts: &[DiscountFactor],
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        ensure!(
            dates.len() >= 2,
            "need at least 2 dates (reference + 1 pillar), got {}",
            dates.len()
        );
        ensure!(
            dates.len() == discounts.len(),
            "dates ({}) and discounts ({}) must have the same length",
            dates.len(),
            discounts.len()
        );
        ensure!(
            (discounts[0] - 1.0).abs() < 1e-12,
            "first discount factor must be 1.0, got {}",
            discounts[0]
        );
        for w in dates.windows(2) {
            ensure!(w[0] < w[1], "pillar dates must be increasing: {} >= {}", w[0], w[1]);
        }
        for (d, df) in dates.iter().zip(discounts) {
            ensure!(
                df.is_finite() && *df > 0.0,
                "discount factor at {d} must be finite and positive, got {df}"
            );
        }

        let reference_date = dates[0];
        let times: Vec<Time> = dates
            .iter()
            .map(|&d| day_counter.year_fraction(reference_date, d))
            .collect();
        for w in times.windows(2) {
            ensure!(w[0] < w[1], "pillar times must be increasing: {} >= {}", w[0], w[1]);
        }

        Ok(Self {
            data: YieldTermStructureData::new(reference_date, day_counter),
            dates: dates.to_vec(),
            times,
            log_discounts: discounts.iter().map(|df| df.ln()).collect(),
            discounts: discounts.to_vec(),
        })
    }

    /// Return the pillar dates.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Return the pillar times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Return the pillar discount factors.
    pub fn discounts(&self) -> &[DiscountFactor] {
        &self.discounts
    }

    /// Index `i` of the segment `[times[i], times[i+1]]` used for `t`.
    fn segment(&self, t: Time) -> usize {
        let n = self.times.len();
        let i = self.times.partition_point(|x| *x <= t);
        i.clamp(1, n - 1) - 1
    }

    fn segment_forward(&self, i: usize) -> Rate {
        -(self.log_discounts[i + 1] - self.log_discounts[i]) / (self.times[i + 1] - self.times[i])
    }
}

impl TermStructure for InterpolatedDiscountCurve {
    fn reference_date(&self) -> Date {
        self.data.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.data.day_counter
    }

    fn max_date(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }
}

impl YieldTermStructure for InterpolatedDiscountCurve {
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        if t <= 0.0 {
            return 1.0;
        }
        let i = self.segment(t);
        let f = self.segment_forward(i);
        (self.log_discounts[i] - f * (t - self.times[i])).exp()
    }

    fn forward_rate_impl(&self, t: Time) -> Rate {
        self.segment_forward(self.segment(t.max(0.0)))
    }
}
