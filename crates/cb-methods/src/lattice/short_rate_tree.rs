//! A trinomial tree of short rates, shifted step by step to fit a curve.
//!
//! The tree carries the state variable `x`; the short rate at node `(i, j)`
//! is `x[i][j] + alpha[i] + spread`. Shifts are appended in increasing time
//! order by the model that fits the tree, and the forward-propagated
//! Arrow-Debreu state prices are kept so each new shift can be solved from
//! the previous ones.

use cb_core::errors::{Error, Result};
use cb_core::{fail, DiscountFactor, Rate, Real, Spread};

use super::{DiscretizedAsset, TimeGrid, TrinomialTree};

/// A short-rate lattice with per-step drift shifts and backward induction.
#[derive(Debug, Clone)]
pub struct ShortRateTree {
    tree: TrinomialTree,
    alpha: Vec<Real>,
    spread: Spread,
    state_prices: Vec<Vec<Real>>,
}

impl ShortRateTree {
    /// An unfitted short-rate tree over `tree`.
    pub fn new(tree: TrinomialTree) -> Self {
        let steps = tree.steps();
        let mut state_prices = Vec::with_capacity(steps + 1);
        state_prices.push(vec![1.0]);
        Self {
            tree,
            alpha: Vec::with_capacity(steps),
            spread: 0.0,
            state_prices,
        }
    }

    /// The underlying branching.
    pub fn tree(&self) -> &TrinomialTree {
        &self.tree
    }

    /// The grid the tree lives on.
    pub fn time_grid(&self) -> &TimeGrid {
        self.tree.time_grid()
    }

    /// Number of nodes at step `i`.
    pub fn size(&self, i: usize) -> usize {
        self.tree.size(i)
    }

    /// Number of steps whose shift is known.
    pub fn fitted_steps(&self) -> usize {
        self.alpha.len()
    }

    /// Whether every step has a shift.
    pub fn is_fitted(&self) -> bool {
        self.alpha.len() == self.tree.steps()
    }

    /// The shift at step `i`.
    pub fn alpha(&self, i: usize) -> Real {
        self.alpha[i]
    }

    /// Constant spread added to every node's short rate.
    pub fn spread(&self) -> Spread {
        self.spread
    }

    /// Set the spread used by [`short_rate`](Self::short_rate) and the
    /// rollback. State prices are unaffected.
    pub fn set_spread(&mut self, spread: Spread) {
        self.spread = spread;
    }

    /// Arrow-Debreu prices of the nodes at step `i`, for `i <= fitted_steps()`.
    pub fn state_prices(&self, i: usize) -> &[Real] {
        &self.state_prices[i]
    }

    /// `Σ_j Q[i][j]·exp(-x[i][j]·dt_i)`: the price of a claim paying 1 at
    /// step `i+1` before the shift of step `i` is applied.
    pub fn unshifted_discount(&self, i: usize) -> Real {
        let dt = self.time_grid().dt(i);
        self.state_prices[i]
            .iter()
            .enumerate()
            .map(|(j, q)| q * (-self.tree.underlying(i, j) * dt).exp())
            .sum()
    }

    /// Append the shift of the next unfitted step and propagate the state
    /// prices to the step after it.
    ///
    /// # Errors
    /// `Runtime` if every step already has a shift.
    pub fn push_alpha(&mut self, alpha: Real) -> Result<()> {
        let i = self.alpha.len();
        if i >= self.tree.steps() {
            fail!("all {} steps of the tree are already fitted", self.tree.steps());
        }
        let dt = self.time_grid().dt(i);
        let mut next = vec![0.0; self.tree.size(i + 1)];
        for (j, q) in self.state_prices[i].iter().enumerate() {
            let x = self.tree.underlying(i, j);
            let disc = q * (-(x + alpha) * dt).exp();
            for b in 0..3 {
                next[self.tree.descendant(i, j, b)] += disc * self.tree.probability(i, j, b);
            }
        }
        self.alpha.push(alpha);
        self.state_prices.push(next);
        Ok(())
    }

    /// Short rate at node `(i, j)`.
    pub fn short_rate(&self, i: usize, j: usize) -> Rate {
        self.tree.underlying(i, j) + self.alpha[i] + self.spread
    }

    /// One-step discount factor at node `(i, j)`.
    pub fn discount(&self, i: usize, j: usize) -> DiscountFactor {
        (-self.short_rate(i, j) * self.time_grid().dt(i)).exp()
    }

    /// Roll `values` from step `from` back to step `to`, applying the
    /// asset's events at every step passed through (but not at `from`).
    ///
    /// # Errors
    /// `NumericalInstability` if a node discount factor is not finite or not
    /// strictly positive; `Runtime` if a step between `to` and `from` has
    /// no shift yet.
    pub fn rollback(
        &self,
        asset: &dyn DiscretizedAsset,
        values: &mut Vec<Real>,
        from: usize,
        to: usize,
    ) -> Result<()> {
        if from > self.alpha.len() {
            fail!("cannot roll back from step {from}: only {} steps are fitted", self.alpha.len());
        }
        let mut scratch = Vec::with_capacity(values.len());
        for i in (to..from).rev() {
            self.step_back(i, values, &mut scratch)?;
            asset.adjust_values(i, &mut scratch);
            std::mem::swap(values, &mut scratch);
        }
        Ok(())
    }

    /// Value of an attached asset at the root of the tree.
    ///
    /// # Errors
    /// `Runtime` if the asset is not attached or ends beyond the tree,
    /// plus the rollback errors.
    pub fn present_value(&self, asset: &dyn DiscretizedAsset) -> Result<Real> {
        let n = asset
            .terminal_step()
            .ok_or_else(|| Error::Runtime("asset is not attached to a time grid".into()))?;
        if n > self.tree.steps() {
            fail!("asset ends at step {n} beyond the last step {}", self.tree.steps());
        }
        let mut values = vec![0.0; self.tree.size(n)];
        asset.initialize(&mut values);
        asset.adjust_values(n, &mut values);
        self.rollback(asset, &mut values, n, 0)?;
        Ok(values[0])
    }

    fn step_back(&self, i: usize, next: &[Real], out: &mut Vec<Real>) -> Result<()> {
        out.clear();
        for j in 0..self.tree.size(i) {
            let discount = self.discount(i, j);
            if !discount.is_finite() || discount <= 0.0 {
                return Err(Error::NumericalInstability {
                    step: i,
                    node: j,
                    discount,
                });
            }
            let expected: Real = (0..3)
                .map(|b| self.tree.probability(i, j, b) * next[self.tree.descendant(i, j, b)])
                .sum();
            out.push(discount * expected);
        }
        Ok(())
    }
}
