//! # cb-termstructures
//!
//! Yield curves: a flat forward curve, a log-linear discount curve built from
//! pillar dates, and a parallel zero-spread overlay used for rate shocks.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `TermStructure`: base trait for all term structures.
pub mod term_structure;

/// `YieldTermStructure`: yield / interest-rate term structures.
pub mod yield_term_structure;

/// `FlatForward`: constant forward-rate yield curve.
pub mod flat_forward;

/// `InterpolatedDiscountCurve`: discount-factor interpolated yield curve.
pub mod interpolated_discount_curve;

/// `ZeroSpreadedTermStructure`: a curve shifted by a constant zero spread.
pub mod zero_spreaded;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use flat_forward::FlatForward;
pub use interpolated_discount_curve::InterpolatedDiscountCurve;
pub use term_structure::TermStructure;
pub use yield_term_structure::{YieldTermStructure, YieldTermStructureData};
pub use zero_spreaded::ZeroSpreadedTermStructure;
