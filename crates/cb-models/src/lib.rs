//! # cb-models
//!
//! One-factor short-rate models that reproduce a yield curve exactly.
//!
//! ## Trait hierarchy
//!
//! ```text
//! ShortRateModel
//! └── OneFactorModel  → HullWhite
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Infrastructure ───────────────────────────────────────────────────────
pub mod short_rate_model;

// ── One-factor short-rate models ─────────────────────────────────────────
pub mod hull_white_model;

// ── Re-exports ───────────────────────────────────────────────────────────
pub use hull_white_model::HullWhite;
pub use short_rate_model::{fit_tree, OneFactorModel, ShortRateModel};
