//! Error types shared by every crate in the workspace.
//!
//! A single `thiserror`-derived enum covers setup validation, term-structure
//! fitting, lattice construction, and rollback failures. The `ensure!` and
//! `fail!` macros are the short forms used at call sites.

use crate::{Real, Time};
use thiserror::Error;

/// The top-level error type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error (solver failures and the like).
    #[error("{0}")]
    Runtime(String),

    /// Inputs rejected before any lattice work starts: non-positive step
    /// counts, face or redemption amounts, empty or unordered schedules,
    /// non-positive model parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The term structure cannot be reproduced by the short-rate lattice.
    #[error("calibration failed at step {step} (t = {time:.6}): {reason}")]
    Calibration {
        /// Grid step whose fitting parameter could not be solved.
        step: usize,
        /// Grid time of that step.
        time: Time,
        /// What was wrong with the data.
        reason: String,
    },

    /// A branching probability fell outside `[0, 1]` while building the
    /// tree. Usually the step size is too large for the mean reversion.
    #[error("lattice unstable at step {step}, node {node}: {reason}")]
    LatticeInstability {
        /// Step index of the offending branching.
        step: usize,
        /// Node index within the step.
        node: usize,
        /// Description of the offending quantity.
        reason: String,
    },

    /// A node discount factor was not finite or not strictly positive
    /// during backward induction.
    #[error("numerical instability at step {step}, node {node}: discount factor {discount}")]
    NumericalInstability {
        /// Step index being rolled back.
        step: usize,
        /// Node index within the step.
        node: usize,
        /// The offending discount factor.
        discount: Real,
    },

    /// Date construction or arithmetic error.
    #[error("date error: {0}")]
    Date(String),
}

impl Error {
    /// Whether the error was raised during setup, before any lattice was
    /// built.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::InvalidConfiguration(_) | Error::Date(_))
    }
}

/// Shorthand `Result` type used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Validate a setup condition.
///
/// Returns `Err(Error::InvalidConfiguration(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use cb_core::{ensure, errors::Error};
/// fn positive(x: f64) -> cb_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::InvalidConfiguration(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidConfiguration(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use cb_core::{fail, errors::Error};
/// fn always_err() -> cb_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_location() {
        let e = Error::LatticeInstability {
            step: 12,
            node: 3,
            reason: "p_mid = -0.1".into(),
        };
        assert_eq!(
            e.to_string(),
            "lattice unstable at step 12, node 3: p_mid = -0.1"
        );

        let e = Error::Calibration {
            step: 4,
            time: 0.25,
            reason: "discount factor is not positive".into(),
        };
        assert!(e.to_string().contains("step 4"));
        assert!(e.to_string().contains("0.250000"));
    }

    #[test]
    fn configuration_classification() {
        assert!(Error::InvalidConfiguration("steps".into()).is_configuration());
        assert!(!Error::NumericalInstability {
            step: 0,
            node: 0,
            discount: f64::NAN
        }
        .is_configuration());
    }
}
