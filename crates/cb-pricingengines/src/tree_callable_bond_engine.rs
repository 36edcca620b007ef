//! Lattice engine for callable fixed-rate bonds.
//!
//! The bond's coupon, exercise and redemption times are made mandatory grid
//! points, a short-rate lattice fitted to the model's curve is built on the
//! grid, and the bond is rolled back to the root. A constant spread on every
//! node's short rate gives option-adjusted valuation.

use crate::discretized_callable_bond::DiscretizedCallableFixedRateBond;
use cb_cashflows::CashFlow;
use cb_core::errors::Result;
use cb_core::{ensure, fail, Price, Real, Spread};
use cb_instruments::{CallableFixedRateBond, Instrument, PricingEngine, PricingResults};
use cb_math::{solve, Bounds};
use cb_methods::{DiscretizedAsset, ShortRateTree, TimeGrid};
use cb_models::OneFactorModel;
use cb_termstructures::{TermStructure, YieldTermStructure, ZeroSpreadedTermStructure};
use cb_time::Date;
use std::sync::Arc;

const OAS_ACCURACY: Real = 1e-10;
const OAS_BOUNDS: (Spread, Spread) = (-1.0, 1.0);

/// Prices callable fixed-rate bonds on a fitted one-factor lattice.
///
/// Each valuation builds its own grid and lattice; the engine itself is
/// immutable and can be shared between threads.
#[derive(Debug, Clone)]
pub struct TreeCallableFixedRateBondEngine {
    model: Arc<dyn OneFactorModel>,
    time_steps: usize,
    spread: Spread,
}

impl TreeCallableFixedRateBondEngine {
    /// An engine using at least `time_steps` lattice steps.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `time_steps` is zero.
    pub fn new(model: Arc<dyn OneFactorModel>, time_steps: usize) -> Result<Self> {
        ensure!(time_steps > 0, "the lattice needs at least one time step");
        Ok(Self {
            model,
            time_steps,
            spread: 0.0,
        })
    }

    /// Value with a constant spread on every short rate.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `spread` is not finite.
    pub fn with_spread(mut self, spread: Spread) -> Result<Self> {
        ensure!(spread.is_finite(), "spread must be finite, got {spread}");
        self.spread = spread;
        Ok(self)
    }

    /// The model the lattice is built from.
    pub fn model(&self) -> &Arc<dyn OneFactorModel> {
        &self.model
    }

    /// Requested number of lattice steps.
    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// Spread over the fitted short rate.
    pub fn spread(&self) -> Spread {
        self.spread
    }

    /// Option-adjusted spread implied by a clean price per 100 of face.
    ///
    /// The lattice is fitted once; only the spread varies between trials.
    ///
    /// # Errors
    /// `InvalidConfiguration` for a non-positive price, `Runtime` if no
    /// spread in `[-100%, 100%]` reproduces it, plus the pricing errors.
    pub fn oas(&self, bond: &CallableFixedRateBond, clean_price: Price) -> Result<Spread> {
        ensure!(
            clean_price.is_finite() && clean_price > 0.0,
            "clean price must be positive, got {clean_price}"
        );
        let valuation = Valuation::build(self.model.as_ref(), bond, self.time_steps)?;
        let target = valuation.npv_from_clean(bond, clean_price);
        let Valuation {
            mut tree, asset, ..
        } = valuation;

        let mut iterations = 0_u32;
        let objective = |s: Spread| -> Result<Real> {
            iterations += 1;
            tree.set_spread(s);
            let npv = tree.present_value(&asset)?;
            tracing::trace!(iteration = iterations, spread = s, npv, target, "oas trial");
            Ok(npv - target)
        };
        let oas = solve(
            objective,
            OAS_ACCURACY,
            self.spread,
            0.001,
            Bounds::new(OAS_BOUNDS.0, OAS_BOUNDS.1),
        )?;
        tracing::debug!(clean_price, oas, "option-adjusted spread solved");
        Ok(oas)
    }

    /// Clean price per 100 of face at a given option-adjusted spread.
    ///
    /// # Errors
    /// The pricing errors.
    pub fn clean_price_at_oas(&self, bond: &CallableFixedRateBond, oas: Spread) -> Result<Price> {
        let mut valuation = Valuation::build(self.model.as_ref(), bond, self.time_steps)?;
        valuation.tree.set_spread(oas);
        let npv = valuation.tree.present_value(&valuation.asset)?;
        Ok(valuation.clean_price(bond, npv))
    }

    /// Effective duration at `oas`: the relative dirty-price change for a
    /// parallel shift of the curve by `±bump`, the model re-fitted to each
    /// shifted curve.
    ///
    /// # Errors
    /// `InvalidConfiguration` for a non-positive bump, plus the pricing
    /// errors.
    pub fn effective_duration(&self, bond: &CallableFixedRateBond, oas: Spread, bump: Real) -> Result<Real> {
        let (p0, up, down) = self.bumped_dirty_prices(bond, oas, bump)?;
        Ok((down - up) / (2.0 * p0 * bump))
    }

    /// Effective convexity at `oas` for a parallel shift of `±bump`.
    ///
    /// # Errors
    /// As for [`effective_duration`](Self::effective_duration).
    pub fn effective_convexity(&self, bond: &CallableFixedRateBond, oas: Spread, bump: Real) -> Result<Real> {
        let (p0, up, down) = self.bumped_dirty_prices(bond, oas, bump)?;
        Ok((up + down - 2.0 * p0) / (p0 * bump * bump))
    }

    /// Value of the embedded options to the issuer: the straight bond's NPV
    /// less the callable bond's, both on the same lattice. Negative when
    /// the holder's puts dominate.
    ///
    /// # Errors
    /// The pricing errors.
    pub fn embedded_option_value(&self, bond: &CallableFixedRateBond) -> Result<Real> {
        let mut valuation = Valuation::build(self.model.as_ref(), bond, self.time_steps)?;
        valuation.tree.set_spread(self.spread);
        let callable = valuation.tree.present_value(&valuation.asset)?;

        let mut straight = valuation.asset.without_options();
        straight.attach(valuation.tree.time_grid())?;
        let straight = valuation.tree.present_value(&straight)?;
        Ok(straight - callable)
    }

    fn bumped_dirty_prices(
        &self,
        bond: &CallableFixedRateBond,
        oas: Spread,
        bump: Real,
    ) -> Result<(Price, Price, Price)> {
        ensure!(bump.is_finite() && bump > 0.0, "rate bump must be positive, got {bump}");
        let base = Arc::clone(self.model.term_structure());
        let mut prices = [0.0; 3];
        for (price, shift) in prices.iter_mut().zip([0.0, bump, -bump]) {
            let model = if shift == 0.0 {
                Arc::clone(&self.model)
            } else {
                let curve: Arc<dyn YieldTermStructure> =
                    Arc::new(ZeroSpreadedTermStructure::new(Arc::clone(&base), shift));
                self.model.with_term_structure(curve)?
            };
            let mut valuation = Valuation::build(model.as_ref(), bond, self.time_steps)?;
            valuation.tree.set_spread(oas);
            let npv = valuation.tree.present_value(&valuation.asset)?;
            *price = valuation.dirty_price(bond, npv);
        }
        let [p0, up, down] = prices;
        tracing::debug!(oas, bump, p0, up, down, "bumped dirty prices");
        Ok((p0, up, down))
    }
}

impl PricingEngine<CallableFixedRateBond> for TreeCallableFixedRateBondEngine {
    /// NPV at the curve's reference date, plus `settlement_value`,
    /// `dirty_price`, `clean_price`, `accrued_amount` and
    /// `embedded_option_value`.
    fn calculate(&self, bond: &CallableFixedRateBond) -> Result<PricingResults> {
        let mut valuation = Valuation::build(self.model.as_ref(), bond, self.time_steps)?;
        valuation.tree.set_spread(self.spread);
        let npv = valuation.tree.present_value(&valuation.asset)?;

        let mut straight = valuation.asset.without_options();
        straight.attach(valuation.tree.time_grid())?;
        let straight_npv = valuation.tree.present_value(&straight)?;

        let settlement_value = npv / valuation.settlement_discount;
        let accrued = bond.bond().accrued_amount(valuation.settlement);
        tracing::debug!(
            npv,
            straight_npv,
            steps = valuation.tree.time_grid().steps(),
            spread = self.spread,
            "callable bond priced on lattice"
        );
        Ok(PricingResults::from_npv(npv)
            .with_result("settlement_value", settlement_value)
            .with_result("dirty_price", valuation.dirty_price(bond, npv))
            .with_result("clean_price", valuation.clean_price(bond, npv))
            .with_result("accrued_amount", accrued)
            .with_result("embedded_option_value", straight_npv - npv))
    }
}

/// One grid, one fitted lattice and one attached bond.
struct Valuation {
    tree: ShortRateTree,
    asset: DiscretizedCallableFixedRateBond,
    settlement: Date,
    settlement_discount: Real,
}

impl Valuation {
    fn build(model: &dyn OneFactorModel, bond: &CallableFixedRateBond, time_steps: usize) -> Result<Self> {
        let curve = model.term_structure();
        let settlement = bond.bond().settlement_date(curve.reference_date());
        // Flows paid on the settlement date belong to the seller.
        if bond.bond().cashflows().iter().all(|cf| cf.has_occurred(settlement, false)) {
            fail!(
                "bond matured on {} on or before settlement on {settlement}",
                bond.maturity_date()
            );
        }

        let mut asset = DiscretizedCallableFixedRateBond::new(bond, curve.as_ref(), settlement);
        let grid = TimeGrid::new(&asset.mandatory_times(), time_steps)?;
        let tree = model.tree(&grid)?;
        asset.attach(&grid)?;
        tracing::debug!(
            grid_points = grid.size(),
            horizon = grid.end(),
            width = tree.size(grid.steps()),
            "lattice built"
        );
        Ok(Self {
            tree,
            asset,
            settlement,
            settlement_discount: curve.discount_date(settlement),
        })
    }

    fn dirty_price(&self, bond: &CallableFixedRateBond, npv: Real) -> Price {
        npv / self.settlement_discount / bond.bond().face_amount() * 100.0
    }

    fn clean_price(&self, bond: &CallableFixedRateBond, npv: Real) -> Price {
        bond.bond()
            .clean_price_from_dirty(self.dirty_price(bond, npv), self.settlement)
    }

    fn npv_from_clean(&self, bond: &CallableFixedRateBond, clean_price: Price) -> Real {
        let dirty = bond.bond().dirty_price_from_clean(clean_price, self.settlement);
        dirty / 100.0 * bond.bond().face_amount() * self.settlement_discount
    }
}
