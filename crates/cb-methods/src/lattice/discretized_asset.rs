//! The protocol between an asset and the lattice that values it.
//!
//! An asset names the times it needs on the grid, binds its events to grid
//! indices once the grid exists, and adjusts node values at those indices
//! while the lattice rolls back.

use cb_core::errors::Result;
use cb_core::{Real, Time};

use super::TimeGrid;

/// An asset that can be valued by backward induction on a lattice.
pub trait DiscretizedAsset {
    /// Times at which the asset has events; the grid must contain them.
    fn mandatory_times(&self) -> Vec<Time>;

    /// Bind events to grid indices.
    ///
    /// # Errors
    /// When an event time is not on `grid`.
    fn attach(&mut self, grid: &TimeGrid) -> Result<()>;

    /// Grid index at which rollback starts; `None` until attached.
    fn terminal_step(&self) -> Option<usize>;

    /// Fill the node values at [`terminal_step`](Self::terminal_step).
    fn initialize(&self, values: &mut [Real]);

    /// Apply the events bound to `step` to the node values there.
    fn adjust_values(&self, _step: usize, _values: &mut [Real]) {}
}

/// A unit zero-coupon claim paying 1 at `maturity`.
#[derive(Debug, Clone)]
pub struct DiscretizedDiscountBond {
    maturity: Time,
    step: Option<usize>,
}

impl DiscretizedDiscountBond {
    /// A claim paying 1 at `maturity`.
    pub fn new(maturity: Time) -> Self {
        Self {
            maturity,
            step: None,
        }
    }
}

impl DiscretizedAsset for DiscretizedDiscountBond {
    fn mandatory_times(&self) -> Vec<Time> {
        vec![self.maturity]
    }

    fn attach(&mut self, grid: &TimeGrid) -> Result<()> {
        self.step = Some(grid.index(self.maturity)?);
        Ok(())
    }

    fn terminal_step(&self) -> Option<usize> {
        self.step
    }

    fn initialize(&self, values: &mut [Real]) {
        values.fill(1.0);
    }
}
