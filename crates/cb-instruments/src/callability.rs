//! Call and put provisions of a bond.
//!
//! A callability entry gives the issuer (call) or the holder (put) the right
//! to redeem the bond on a date at a quoted price. Prices are per 100 of
//! face, quoted clean or dirty.

use cb_core::errors::Result;
use cb_core::{ensure, Price};
use cb_time::Date;
use std::fmt;

/// Who holds the redemption right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallabilityType {
    /// The issuer may redeem; caps the holder's value.
    Call,
    /// The holder may redeem; floors the holder's value.
    Put,
}

impl fmt::Display for CallabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallabilityType::Call => write!(f, "Call"),
            CallabilityType::Put => write!(f, "Put"),
        }
    }
}

/// Quoting convention of a redemption price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceType {
    /// Excludes accrued interest; accrued is added on exercise.
    Clean,
    /// Includes accrued interest.
    Dirty,
}

/// A price per 100 of face with its quoting convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondPrice {
    /// Price per 100 of face.
    pub amount: Price,
    /// Clean or dirty.
    pub price_type: PriceType,
}

impl BondPrice {
    /// Create a bond price.
    pub fn new(amount: Price, price_type: PriceType) -> Self {
        Self { amount, price_type }
    }
}

/// One exercise right of a callable or puttable bond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Callability {
    price: BondPrice,
    kind: CallabilityType,
    date: Date,
}

impl Callability {
    /// Create a callability entry.
    pub fn new(price: BondPrice, kind: CallabilityType, date: Date) -> Self {
        Self { price, kind, date }
    }

    /// Shorthand for a call at `price` on `date`.
    pub fn call(price: Price, price_type: PriceType, date: Date) -> Self {
        Self::new(BondPrice::new(price, price_type), CallabilityType::Call, date)
    }

    /// Shorthand for a put at `price` on `date`.
    pub fn put(price: Price, price_type: PriceType, date: Date) -> Self {
        Self::new(BondPrice::new(price, price_type), CallabilityType::Put, date)
    }

    /// Exercise price.
    pub fn price(&self) -> BondPrice {
        self.price
    }

    /// Call or put.
    pub fn kind(&self) -> CallabilityType {
        self.kind
    }

    /// Exercise date.
    pub fn date(&self) -> Date {
        self.date
    }
}

/// Exercise rights ordered by date.
pub type CallabilitySchedule = Vec<Callability>;

/// Check that a schedule is usable on a bond issued on `issue_date` and
/// maturing on `maturity_date`.
///
/// # Errors
/// `InvalidConfiguration` for dates that are not strictly increasing, a
/// date outside `[issue_date, maturity_date]`, or a non-positive price.
pub fn validate_schedule(
    schedule: &[Callability],
    issue_date: Date,
    maturity_date: Date,
) -> Result<()> {
    for (i, c) in schedule.iter().enumerate() {
        let amount = c.price.amount;
        ensure!(
            amount.is_finite() && amount > 0.0,
            "callability {i} on {}: price must be positive, got {amount}",
            c.date
        );
        ensure!(
            c.date >= issue_date && c.date <= maturity_date,
            "callability {i} on {} lies outside [{issue_date}, {maturity_date}]",
            c.date
        );
    }
    for pair in schedule.windows(2) {
        ensure!(
            pair[0].date < pair[1].date,
            "callability dates must be strictly increasing: {} then {}",
            pair[0].date,
            pair[1].date
        );
    }
    Ok(())
}
