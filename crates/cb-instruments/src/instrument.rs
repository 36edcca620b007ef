//! `Instrument` and `PricingEngine` traits.
//!
//! Instruments hold their contractual terms only; engines hold market data
//! and models and compute results on demand. Nothing is cached between
//! calls.

use cb_core::{errors::Result, Real};
use cb_time::Date;
use std::collections::HashMap;

/// Results of pricing an instrument.
///
/// Contains the NPV and optionally additional named results
/// (e.g. `"settlement_value"`, `"clean_price"`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingResults {
    /// Net present value at the curve's reference date.
    pub npv: Real,
    /// Error estimate, when the method has one.
    pub error_estimate: Option<Real>,
    /// Additional named results.
    pub additional_results: HashMap<String, Real>,
}

impl PricingResults {
    /// Create pricing results with just an NPV.
    pub fn from_npv(npv: Real) -> Self {
        Self {
            npv,
            error_estimate: None,
            additional_results: HashMap::new(),
        }
    }

    /// Add a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }

    /// Look up a named result.
    pub fn result(&self, key: &str) -> Option<Real> {
        self.additional_results.get(key).copied()
    }
}

/// A pricing engine computes `PricingResults` for one instrument type.
pub trait PricingEngine<I>: std::fmt::Debug + Send + Sync {
    /// Price `instrument`.
    fn calculate(&self, instrument: &I) -> Result<PricingResults>;
}

/// Base trait for all financial instruments.
pub trait Instrument: std::fmt::Debug + Send + Sync {
    /// Whether every payment has been made by `ref_date`.
    fn is_expired(&self, ref_date: Date) -> bool;

    /// The maturity or last relevant date.
    fn maturity_date(&self) -> Date;
}
