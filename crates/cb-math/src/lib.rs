//! # cb-math
//!
//! One-dimensional root finders used to back out option-adjusted spreads
//! and bond yields.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// 1D root-finding solvers.
pub mod solvers1d;

pub use solvers1d::{brent, solve, Bounds};
