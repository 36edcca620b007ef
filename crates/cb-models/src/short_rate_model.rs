//! Short-rate model traits and the curve-fitting of their lattices.
//!
//! A one-factor model here is written as `r(t) = x(t) + alpha(t)`, where
//! `x` is a state process starting at the origin and `alpha` is whatever
//! deterministic shift makes the model reproduce its term structure. The
//! lattice carries `x`; [`fit_tree`] solves the shifts step by step.

use cb_core::errors::{Error, Result};
use cb_core::{DiscountFactor, Real, Time};
use cb_methods::{ShortRateTree, TimeGrid, TrinomialTree};
use cb_processes::StochasticProcess1D;
use cb_termstructures::YieldTermStructure;
use std::sync::Arc;

/// A general short-rate model.
pub trait ShortRateModel: std::fmt::Debug + Send + Sync {
    /// The discount bond price `P(t, T)` given the short rate `r` at `t`.
    fn discount_bond(&self, t: Time, maturity: Time, rate: Real) -> DiscountFactor;

    /// The yield curve the model is fitted to.
    fn term_structure(&self) -> &Arc<dyn YieldTermStructure>;
}

/// A one-factor short-rate model with a lattice representation.
pub trait OneFactorModel: ShortRateModel {
    /// The state process `x`, whose lattice is shifted to give the rate.
    fn state_process(&self) -> Result<Box<dyn StochasticProcess1D>>;

    /// The same model parameters fitted to another curve.
    fn with_term_structure(
        &self,
        term_structure: Arc<dyn YieldTermStructure>,
    ) -> Result<Arc<dyn OneFactorModel>>;

    /// A short-rate lattice on `grid` that reprices the term structure at
    /// every grid time.
    ///
    /// # Errors
    /// `LatticeInstability` from the branching and `Calibration` from the
    /// fit.
    fn tree(&self, grid: &TimeGrid) -> Result<ShortRateTree> {
        let process = self.state_process()?;
        let tree = TrinomialTree::new(process.as_ref(), grid)?;
        fit_tree(tree, self.term_structure().as_ref())
    }
}

/// Shift every step of `tree` so that a claim paying 1 at grid time
/// `t_{i+1}` is worth `P(0, t_{i+1})` on the curve.
///
/// Steps are fitted in increasing time order; the state prices of step `i`
/// only depend on the shifts before it.
///
/// # Errors
/// `Calibration` at the first step whose curve discount factor is not
/// finite, not strictly positive, or larger than the one before it, or
/// whose shift is not finite.
pub fn fit_tree(tree: TrinomialTree, curve: &dyn YieldTermStructure) -> Result<ShortRateTree> {
    let mut tree = ShortRateTree::new(tree);
    let grid = tree.time_grid().clone();
    let mut previous = curve.discount(grid.time(0));

    for i in 0..grid.steps() {
        let time = grid.time(i + 1);
        let calibration = |reason: String| Error::Calibration {
            step: i,
            time,
            reason,
        };

        let target = curve.discount(time);
        if !target.is_finite() || target <= 0.0 {
            return Err(calibration(format!(
                "discount factor {target} is not strictly positive"
            )));
        }
        if target > previous {
            return Err(calibration(format!(
                "discount factor increases from {previous} to {target}"
            )));
        }

        let value = tree.unshifted_discount(i);
        let alpha = (value / target).ln() / grid.dt(i);
        if !alpha.is_finite() {
            return Err(calibration(format!("fitted shift {alpha} is not finite")));
        }
        tree.push_alpha(alpha)?;
        tracing::trace!(step = i, time, alpha, "fitted lattice step");
        previous = target;
    }

    tracing::debug!(steps = grid.steps(), "short-rate lattice fitted");
    Ok(tree)
}
