//! # cb-methods
//!
//! Numerical methods for short-rate lattices.
//!
//! # Modules
//!
//! * [`lattice`]: time grids, trinomial branching, the fitted short-rate
//!   tree, and the backward-induction protocol for discretized assets

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Lattice methods: time grids, trinomial trees, backward induction.
pub mod lattice;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use lattice::{
    DiscretizedAsset, DiscretizedDiscountBond, ShortRateTree, TimeGrid, TrinomialTree,
};
