//! # callable-bonds
//!
//! Callable fixed-rate bond pricing on a Hull-White trinomial lattice.
//!
//! This crate is a **façade** that re-exports the workspace crates and adds
//! a serde configuration layer with a one-call pricing entry point,
//! [`price_callable_bond`]. Application code should depend on this crate
//! rather than on the individual `cb-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use callable_bonds::config::{ModelConfig, EngineConfig};
//!
//! let model = ModelConfig { reversion_speed: 0.03, volatility: 0.1 };
//! let engine = EngineConfig { time_steps: 100, spread: 0.0 };
//! assert!(model.validate().is_ok() && engine.validate().is_ok());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
mod pricing;

pub use config::{
    CallabilityConfig, CallableBondConfig, CurveConfig, EngineConfig, ModelConfig,
    PeriodicCallabilityConfig, ScenarioConfig,
};
pub use pricing::price_callable_bond;

/// Core types, aliases, and error definitions.
pub use cb_core as core;

/// Date, calendar, day counter, and schedule types.
pub use cb_time as time;

/// One-dimensional root finders.
pub use cb_math as math;

/// Yield term structures.
pub use cb_termstructures as termstructures;

/// The Ornstein-Uhlenbeck state process.
pub use cb_processes as processes;

/// Short-rate models.
pub use cb_models as models;

/// Time grids and trinomial lattices.
pub use cb_methods as methods;

/// Cash flows and coupons.
pub use cb_cashflows as cashflows;

/// Bonds and callability schedules.
pub use cb_instruments as instruments;

/// Pricing engines.
pub use cb_pricingengines as pricingengines;
