//! # cb-instruments
//!
//! Bonds and the embedded options they carry: a fixed-rate bond, a
//! callability schedule, and the callable fixed-rate bond combining them.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bond;
pub mod callability;
pub mod callable_bond;
pub mod instrument;

pub use bond::FixedRateBond;
pub use callability::{BondPrice, Callability, CallabilitySchedule, CallabilityType, PriceType};
pub use callable_bond::CallableFixedRateBond;
pub use instrument::{Instrument, PricingEngine, PricingResults};
