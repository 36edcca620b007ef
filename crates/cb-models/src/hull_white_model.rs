//! Hull-White (extended Vasicek) model.
//!
//! ```text
//! dr = (θ(t) − a·r) dt + σ dW
//! ```
//!
//! The function `θ(t)` is chosen to exactly fit the initial yield curve. On
//! a lattice this is done numerically: the tree carries the zero-mean
//! Ornstein-Uhlenbeck state `dx = −a·x dt + σ dW` and each step is shifted
//! by `alpha[i]` (see [`fit_tree`](crate::fit_tree)).
//!
//! Discount bond price:
//! `P(t,T) = A(t,T) exp(−B(t,T) r(t))`
//!
//! where `B` is the same as Vasicek and `A` is adjusted to fit the
//! initial curve.

use crate::short_rate_model::{OneFactorModel, ShortRateModel};
use cb_core::errors::Result;
use cb_core::{ensure, DiscountFactor, Real, Time, Volatility};
use cb_processes::{OrnsteinUhlenbeckProcess, StochasticProcess1D};
use cb_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Hull-White one-factor model with constant reversion and volatility.
#[derive(Debug, Clone)]
pub struct HullWhite {
    a: Real,
    sigma: Volatility,
    term_structure: Arc<dyn YieldTermStructure>,
}

impl HullWhite {
    /// Create a Hull-White model fitted to `term_structure`.
    ///
    /// # Errors
    /// `InvalidConfiguration` unless `a` and `sigma` are finite and
    /// strictly positive.
    pub fn new(term_structure: Arc<dyn YieldTermStructure>, a: Real, sigma: Volatility) -> Result<Self> {
        ensure!(
            a.is_finite() && a > 0.0,
            "mean reversion speed must be positive, got {a}"
        );
        ensure!(
            sigma.is_finite() && sigma > 0.0,
            "volatility must be positive, got {sigma}"
        );
        Ok(Self {
            a,
            sigma,
            term_structure,
        })
    }

    /// Mean-reversion speed.
    pub fn a(&self) -> Real {
        self.a
    }

    /// Short-rate volatility.
    pub fn sigma(&self) -> Volatility {
        self.sigma
    }

    /// `B(t,T) = (1 - exp(-a(T-t)))/a`
    pub fn b_function(&self, t: Time, maturity: Time) -> Real {
        (1.0 - (-self.a * (maturity - t)).exp()) / self.a
    }

    /// `ln A(t,T) = ln(P(0,T)/P(0,t)) + B(t,T)·f(0,t) − σ²/(4a)·B²·(1−e^{-2at})`
    fn log_a(&self, t: Time, maturity: Time) -> Real {
        let ts = &self.term_structure;
        let b = self.b_function(t, maturity);
        let forward = ts.instantaneous_forward(t);
        let variance_term =
            self.sigma * self.sigma / (4.0 * self.a) * b * b * (1.0 - (-2.0 * self.a * t).exp());
        (ts.discount(maturity) / ts.discount(t)).ln() + b * forward - variance_term
    }
}

impl ShortRateModel for HullWhite {
    fn discount_bond(&self, t: Time, maturity: Time, rate: Real) -> DiscountFactor {
        (self.log_a(t, maturity) - self.b_function(t, maturity) * rate).exp()
    }

    fn term_structure(&self) -> &Arc<dyn YieldTermStructure> {
        &self.term_structure
    }
}

impl OneFactorModel for HullWhite {
    fn state_process(&self) -> Result<Box<dyn StochasticProcess1D>> {
        Ok(Box::new(OrnsteinUhlenbeckProcess::new(
            self.a, self.sigma, 0.0, 0.0,
        )?))
    }

    fn with_term_structure(
        &self,
        term_structure: Arc<dyn YieldTermStructure>,
    ) -> Result<Arc<dyn OneFactorModel>> {
        Ok(Arc::new(Self::new(term_structure, self.a, self.sigma)?))
    }
}
