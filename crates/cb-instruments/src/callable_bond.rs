//! Callable fixed-rate bond.

use crate::bond::FixedRateBond;
use crate::callability::{validate_schedule, Callability, CallabilitySchedule, PriceType};
use crate::instrument::Instrument;
use cb_core::errors::Result;
use cb_core::Real;
use cb_time::Date;

/// A fixed-rate bond with embedded call and/or put rights.
///
/// With an empty callability schedule the bond is economically identical
/// to the underlying straight bond.
#[derive(Debug)]
pub struct CallableFixedRateBond {
    bond: FixedRateBond,
    callability: CallabilitySchedule,
}

impl CallableFixedRateBond {
    /// Attach a callability schedule to a fixed-rate bond.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the schedule is not strictly increasing,
    /// has a date outside `[issue, maturity]`, or a non-positive price.
    pub fn new(bond: FixedRateBond, callability: CallabilitySchedule) -> Result<Self> {
        validate_schedule(&callability, bond.issue_date(), bond.maturity_date())?;
        Ok(Self { bond, callability })
    }

    /// The underlying straight bond.
    pub fn bond(&self) -> &FixedRateBond {
        &self.bond
    }

    /// The exercise rights, ordered by date.
    pub fn callability(&self) -> &[Callability] {
        &self.callability
    }

    /// Amount paid on exercise of `callability`, in currency.
    ///
    /// Clean prices are grossed up with the interest accrued on the
    /// exercise date.
    pub fn exercise_amount(&self, callability: &Callability) -> Real {
        let price = callability.price();
        let mut amount = price.amount / 100.0 * self.bond.face_amount();
        if price.price_type == PriceType::Clean {
            amount += self.bond.accrued_amount(callability.date());
        }
        amount
    }
}

impl Instrument for CallableFixedRateBond {
    fn is_expired(&self, ref_date: Date) -> bool {
        self.bond.is_expired(ref_date)
    }

    fn maturity_date(&self) -> Date {
        self.bond.maturity_date()
    }
}
