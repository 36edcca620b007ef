//! Discounting bond pricing engine.
//!
//! Prices a straight bond by discounting the flows still to be paid after
//! settlement on a yield curve:
//! NPV = Σ cf.amount() × discount(cf.date()).

use std::sync::Arc;

use cb_core::errors::Result;
use cb_instruments::{FixedRateBond, PricingEngine, PricingResults};
use cb_termstructures::{TermStructure, YieldTermStructure};

/// Discounting engine for fixed-rate bonds.
///
/// Results: the NPV at the curve's reference date, plus
/// `settlement_value`, `dirty_price`, `clean_price` and `accrued_amount`.
#[derive(Debug, Clone)]
pub struct DiscountingBondEngine {
    discount_curve: Arc<dyn YieldTermStructure>,
}

impl DiscountingBondEngine {
    /// Create a new engine with the given discount curve.
    pub fn new(discount_curve: Arc<dyn YieldTermStructure>) -> Self {
        Self { discount_curve }
    }

    /// The discount curve.
    pub fn discount_curve(&self) -> &Arc<dyn YieldTermStructure> {
        &self.discount_curve
    }
}

impl PricingEngine<FixedRateBond> for DiscountingBondEngine {
    fn calculate(&self, bond: &FixedRateBond) -> Result<PricingResults> {
        let curve = self.discount_curve.as_ref();
        let today = curve.reference_date();
        let settlement = bond.settlement_date(today);

        let npv = cb_cashflows::npv(bond.cashflows(), curve, settlement, today);
        let settlement_value = cb_cashflows::npv(bond.cashflows(), curve, settlement, settlement);
        let dirty_price = settlement_value / bond.face_amount() * 100.0;
        let clean_price = bond.clean_price_from_dirty(dirty_price, settlement);
        tracing::debug!(npv, dirty_price, clean_price, %settlement, "bond discounted");

        Ok(PricingResults::from_npv(npv)
            .with_result("settlement_value", settlement_value)
            .with_result("dirty_price", dirty_price)
            .with_result("clean_price", clean_price)
            .with_result("accrued_amount", bond.accrued_amount(settlement)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cb_cashflows::CashFlow;
    use cb_core::Real;
    use cb_termstructures::FlatForward;
    use cb_time::{
        Actual365Fixed, ActualActual, BusinessDayConvention, Date, DayCounter, NullCalendar,
        Period, ScheduleBuilder, TimeUnit,
    };

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    /// Two-year semiannual 4% bond on 100 face.
    fn bond(settlement_days: u32) -> FixedRateBond {
        let schedule = ScheduleBuilder::new(
            date(2025, 1, 15),
            date(2027, 1, 15),
            Period::new(6, TimeUnit::Months),
            Arc::new(NullCalendar),
        )
        .build()
        .unwrap();
        FixedRateBond::new(
            settlement_days,
            100.0,
            &schedule,
            vec![0.04],
            Arc::new(ActualActual::bond()),
            BusinessDayConvention::Unadjusted,
            100.0,
            None,
        )
        .unwrap()
    }

    fn engine(today: Date, rate: Real) -> DiscountingBondEngine {
        let dc: Arc<dyn DayCounter> = Arc::new(Actual365Fixed);
        DiscountingBondEngine::new(Arc::new(FlatForward::continuous(today, rate, dc)))
    }

    #[test]
    fn discounts_every_future_flow() {
        let today = date(2025, 1, 15);
        let engine = engine(today, 0.05);
        let results = engine.calculate(&bond(0)).unwrap();
        let by_hand: Real = bond(0)
            .cashflows()
            .iter()
            .map(|cf| cf.amount() * (-0.05 * Actual365Fixed.year_fraction(today, cf.date())).exp())
            .sum();
        assert_abs_diff_eq!(results.npv, by_hand, epsilon = 1e-12);
        // Coupon below the market rate: below par.
        assert!(results.npv < 100.0 && results.npv > 95.0);
        assert_abs_diff_eq!(results.result("settlement_value").unwrap(), results.npv, epsilon = 1e-12);
    }

    #[test]
    fn settlement_value_and_prices() {
        let today = date(2025, 3, 14);
        let engine = engine(today, 0.03);
        let bond = bond(2);
        let results = engine.calculate(&bond).unwrap();
        let settlement = bond.settlement_date(today);
        assert_eq!(settlement, date(2025, 3, 16));

        let df = engine.discount_curve().discount_date(settlement);
        let settlement_value = results.result("settlement_value").unwrap();
        assert_abs_diff_eq!(settlement_value, results.npv / df, epsilon = 1e-12);

        let dirty = results.result("dirty_price").unwrap();
        let clean = results.result("clean_price").unwrap();
        let accrued = results.result("accrued_amount").unwrap();
        assert!(accrued > 0.0);
        assert_abs_diff_eq!(dirty - clean, accrued, epsilon = 1e-12);
    }

    #[test]
    fn paid_flows_are_excluded() {
        let today = date(2026, 1, 15);
        let engine = engine(today, 0.04);
        let results = engine.calculate(&bond(0)).unwrap();
        // Two coupons and the redemption remain; the coupon paid today does not count.
        let remaining: Real = bond(0)
            .cashflows()
            .iter()
            .filter(|cf| cf.date() > today)
            .map(|cf| cf.amount() * engine.discount_curve().discount_date(cf.date()))
            .sum();
        assert_abs_diff_eq!(results.npv, remaining, epsilon = 1e-12);
        assert_abs_diff_eq!(results.result("accrued_amount").unwrap(), 0.0, epsilon = 1e-15);
    }
}
