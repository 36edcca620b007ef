//! # cb-pricingengines
//!
//! Pricing engines for bonds.
//!
//! ## Engines
//!
//! - [`DiscountingBondEngine`]: discounted cash flows of a straight bond
//! - [`TreeCallableFixedRateBondEngine`]: backward induction of a callable
//!   bond on a fitted one-factor short-rate lattice, with option-adjusted
//!   spread, effective duration and convexity

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod discounting_bond_engine;
pub mod discretized_callable_bond;
pub mod tree_callable_bond_engine;

pub use discounting_bond_engine::DiscountingBondEngine;
pub use discretized_callable_bond::{BondEvent, DiscretizedCallableFixedRateBond};
pub use tree_callable_bond_engine::TreeCallableFixedRateBondEngine;
