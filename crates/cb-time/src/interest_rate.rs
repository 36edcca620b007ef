//! Interest rate with compounding and day-counting conventions.
//!
//! An `InterestRate` bundles a rate value with a `DayCounter`, a
//! `Compounding` convention, and a `Frequency`. Bond yields are expressed
//! through it.

use crate::date::Date;
use crate::day_counter::DayCounter;
use crate::frequency::Frequency;
use cb_core::errors::{Error, Result};
use cb_core::{Compounding, Real, Time};
use std::sync::Arc;

/// An interest rate with associated compounding and day-counting conventions.
#[derive(Debug, Clone)]
pub struct InterestRate {
    rate: Real,
    dc: Arc<dyn DayCounter>,
    compounding: Compounding,
    frequency: Frequency,
}

impl InterestRate {
    /// Create a new interest rate.
    ///
    /// `Compounded` and `SimpleThenCompounded` need a frequency with a
    /// positive number of periods per year.
    pub fn new(
        rate: Real,
        dc: Arc<dyn DayCounter>,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Result<Self> {
        if matches!(compounding, Compounding::Compounded | Compounding::SimpleThenCompounded)
            && !matches!(frequency.periods_per_year(), Some(n) if n > 0)
        {
            return Err(Error::InvalidConfiguration(format!(
                "{frequency} frequency not allowed with {compounding} compounding"
            )));
        }
        Ok(Self {
            rate,
            dc,
            compounding,
            frequency,
        })
    }

    /// The rate value.
    pub fn rate(&self) -> Real {
        self.rate
    }

    /// The day counter.
    pub fn day_counter(&self) -> &Arc<dyn DayCounter> {
        &self.dc
    }

    /// The compounding convention.
    pub fn compounding(&self) -> Compounding {
        self.compounding
    }

    /// The compounding frequency.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    fn freq_value(&self) -> Real {
        self.frequency.periods_per_year().unwrap_or(1).max(1) as Real
    }

    /// Growth of one unit invested over `t` years.
    pub fn compound_factor_time(&self, t: Time) -> Result<Real> {
        if t < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "negative time ({t}) not allowed"
            )));
        }
        let f = self.freq_value();
        let factor = match self.compounding {
            Compounding::Simple => 1.0 + self.rate * t,
            Compounding::Compounded => (1.0 + self.rate / f).powf(f * t),
            Compounding::Continuous => (self.rate * t).exp(),
            Compounding::SimpleThenCompounded => {
                if t <= 1.0 / f {
                    1.0 + self.rate * t
                } else {
                    (1.0 + self.rate / f).powf(f * t)
                }
            }
        };
        Ok(factor)
    }

    /// Compound factor between two dates.
    pub fn compound_factor(&self, d1: Date, d2: Date) -> Result<Real> {
        self.compound_factor_time(self.dc.year_fraction(d1, d2))
    }

    /// `1 / compound_factor_time(t)`.
    pub fn discount_factor_time(&self, t: Time) -> Result<Real> {
        Ok(1.0 / self.compound_factor_time(t)?)
    }

    /// Discount factor between two dates.
    pub fn discount_factor(&self, d1: Date, d2: Date) -> Result<Real> {
        Ok(1.0 / self.compound_factor(d1, d2)?)
    }

    /// The rate under the given conventions that produces `compound` over
    /// `t` years.
    pub fn implied_rate(
        compound: Real,
        dc: Arc<dyn DayCounter>,
        compounding: Compounding,
        frequency: Frequency,
        t: Time,
    ) -> Result<Self> {
        if compound <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "positive compound factor required, got {compound}"
            )));
        }
        let template = Self::new(0.0, dc, compounding, frequency)?;
        let rate = if compound == 1.0 {
            0.0
        } else {
            if t <= 0.0 {
                return Err(Error::InvalidConfiguration(format!(
                    "non-positive time ({t}) not allowed"
                )));
            }
            let f = template.freq_value();
            match compounding {
                Compounding::Simple => (compound - 1.0) / t,
                Compounding::Compounded => (compound.powf(1.0 / (f * t)) - 1.0) * f,
                Compounding::Continuous => compound.ln() / t,
                Compounding::SimpleThenCompounded => {
                    if t <= 1.0 / f {
                        (compound - 1.0) / t
                    } else {
                        (compound.powf(1.0 / (f * t)) - 1.0) * f
                    }
                }
            }
        };
        Ok(Self { rate, ..template })
    }

    /// This rate re-expressed under other conventions over `t` years.
    pub fn equivalent_rate(&self, compounding: Compounding, frequency: Frequency, t: Time) -> Result<Self> {
        Self::implied_rate(
            self.compound_factor_time(t)?,
            Arc::clone(&self.dc),
            compounding,
            frequency,
            t,
        )
    }
}

impl std::fmt::Display for InterestRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.6}% {} {} compounding",
            self.rate * 100.0,
            self.dc.name(),
            self.compounding
        )?;
        if matches!(self.compounding, Compounding::Compounded | Compounding::SimpleThenCompounded) {
            write!(f, " ({})", self.frequency)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day_counter::Actual365Fixed;
    use approx::assert_abs_diff_eq;

    fn dc() -> Arc<dyn DayCounter> {
        Arc::new(Actual365Fixed)
    }

    #[test]
    fn continuous_factor() {
        let r = InterestRate::new(0.05, dc(), Compounding::Continuous, Frequency::Annual).unwrap();
        assert_abs_diff_eq!(r.compound_factor_time(2.0).unwrap(), (0.1f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(r.discount_factor_time(2.0).unwrap(), (-0.1f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn implied_rate_inverts_factor() {
        for comp in [
            Compounding::Simple,
            Compounding::Compounded,
            Compounding::Continuous,
            Compounding::SimpleThenCompounded,
        ] {
            let r = InterestRate::new(0.0375, dc(), comp, Frequency::Semiannual).unwrap();
            let t = 3.4;
            let cf = r.compound_factor_time(t).unwrap();
            let back = InterestRate::implied_rate(cf, dc(), comp, Frequency::Semiannual, t).unwrap();
            assert_abs_diff_eq!(back.rate(), 0.0375, epsilon = 1e-12);
        }
    }

    #[test]
    fn equivalent_continuous_of_annual() {
        let r = InterestRate::new(0.05, dc(), Compounding::Compounded, Frequency::Annual).unwrap();
        let c = r.equivalent_rate(Compounding::Continuous, Frequency::Annual, 1.0).unwrap();
        assert_abs_diff_eq!(c.rate(), (1.05f64).ln(), epsilon = 1e-14);
    }

    #[test]
    fn rejects_missing_frequency() {
        assert!(InterestRate::new(0.05, dc(), Compounding::Compounded, Frequency::NoFrequency).is_err());
        let r = InterestRate::new(0.05, dc(), Compounding::Simple, Frequency::NoFrequency).unwrap();
        assert!(r.compound_factor_time(-1.0).is_err());
    }
}
