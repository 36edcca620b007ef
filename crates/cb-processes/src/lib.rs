//! # cb-processes
//!
//! One-dimensional diffusion processes. The trinomial lattice reads only the
//! conditional mean and variance of a process over each time step.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// `StochasticProcess1D`: scalar diffusions.
pub mod stochastic_process;

/// Ornstein-Uhlenbeck mean-reverting process.
pub mod ornstein_uhlenbeck_process;

pub use ornstein_uhlenbeck_process::OrnsteinUhlenbeckProcess;
pub use stochastic_process::StochasticProcess1D;
