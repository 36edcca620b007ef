//! Cash-flow analysis functions.
//!
//! Functions that operate on a [`Leg`]:
//! - `npv`: present value on a yield curve
//! - `npv_at_yield`: present value at a flat yield
//! - `yield_rate`: internal rate of return (solver-based)
//! - `accrued_amount`: interest accrued in the running coupon
//! - `maturity_date`, `previous_cashflow_date`, `next_cashflow_date`
//!
//! A flow paid on the settlement date counts as already paid.

use crate::cashflow::Leg;
use cb_core::errors::Result;
use cb_core::{fail, Compounding, Rate, Real};
use cb_math::{solve, Bounds};
use cb_termstructures::YieldTermStructure;
use cb_time::{Date, DayCounter, Frequency, InterestRate, TimeUnit};
use std::sync::Arc;

// ── Leg queries ──────────────────────────────────────────────────────────────

/// The maturity (last payment) date of a leg.
pub fn maturity_date(leg: &Leg) -> Option<Date> {
    leg.iter().map(|cf| cf.date()).max()
}

/// The date of the last cash flow paid on or before `ref_date`.
pub fn previous_cashflow_date(leg: &Leg, ref_date: Date) -> Option<Date> {
    leg.iter()
        .filter(|cf| cf.has_occurred(ref_date, false))
        .map(|cf| cf.date())
        .max()
}

/// The date of the next cash flow paid strictly after `ref_date`.
pub fn next_cashflow_date(leg: &Leg, ref_date: Date) -> Option<Date> {
    leg.iter()
        .filter(|cf| !cf.has_occurred(ref_date, false))
        .map(|cf| cf.date())
        .min()
}

/// Interest accrued at `settlement` in the coupons paid on the next
/// cash-flow date.
pub fn accrued_amount(leg: &Leg, settlement: Date) -> Real {
    let Some(next) = next_cashflow_date(leg, settlement) else {
        return 0.0;
    };
    leg.iter()
        .filter(|cf| cf.date() == next)
        .filter_map(|cf| cf.as_coupon())
        .map(|c| c.accrued_amount(settlement))
        .sum()
}

// ── NPV with a yield curve ──────────────────────────────────────────────────

/// Value at `npv_date` of the flows paid after `settlement`, discounted on
/// `curve`.
pub fn npv(leg: &Leg, curve: &dyn YieldTermStructure, settlement: Date, npv_date: Date) -> Real {
    let total: Real = leg
        .iter()
        .filter(|cf| !cf.has_occurred(settlement, false))
        .map(|cf| cf.amount() * curve.discount_date(cf.date()))
        .sum();
    total / curve.discount_date(npv_date)
}

// ── NPV with a flat yield ───────────────────────────────────────────────────

/// Value at `settlement` of the remaining flows at a flat yield.
///
/// Discounting compounds period by period between payment dates, measuring
/// each coupon period against its reference period, so a regular bond
/// priced at its own coupon rate is worth par on a coupon date.
pub fn npv_at_yield(leg: &Leg, y: &InterestRate, settlement: Date) -> Result<Real> {
    let dc = y.day_counter();
    let mut npv = 0.0;
    let mut discount = 1.0;
    let mut last_date = settlement;

    for cf in leg.iter().filter(|cf| !cf.has_occurred(settlement, false)) {
        let date = cf.date();
        let (ref_start, ref_end) = match cf.as_coupon() {
            Some(c) => (c.reference_period_start(), c.reference_period_end()),
            None if last_date == settlement => (date.advance(-1, TimeUnit::Years)?, date),
            None => (last_date, date),
        };
        let t = dc.year_fraction_with_ref(last_date, date, ref_start, ref_end);
        discount *= y.discount_factor_time(t)?;
        last_date = date;
        npv += cf.amount() * discount;
    }
    Ok(npv)
}

/// The flat yield at which the leg is worth `target_npv` at `settlement`.
///
/// # Errors
/// `Runtime` if no yield reproduces the price.
#[allow(clippy::too_many_arguments)]
pub fn yield_rate(
    leg: &Leg,
    target_npv: Real,
    dc: Arc<dyn DayCounter>,
    compounding: Compounding,
    frequency: Frequency,
    settlement: Date,
    accuracy: Real,
    guess: Rate,
) -> Result<Rate> {
    if leg.iter().all(|cf| cf.has_occurred(settlement, false)) {
        fail!("no cash flows left after {settlement}");
    }
    let objective = |r: Rate| -> Result<Real> {
        let y = InterestRate::new(r, Arc::clone(&dc), compounding, frequency)?;
        Ok(npv_at_yield(leg, &y, settlement)? - target_npv)
    };
    solve(objective, accuracy, guess, 0.01, Bounds::new(-0.99, 10.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflow::Redemption;
    use crate::fixed_rate_coupon::FixedRateLegBuilder;
    use approx::assert_abs_diff_eq;
    use cb_termstructures::FlatForward;
    use cb_time::{ActualActual, NullCalendar, Period, ScheduleBuilder};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn dc() -> Arc<dyn DayCounter> {
        Arc::new(ActualActual::bond())
    }

    /// Five-year annual 5% bond with its redemption.
    fn make_fixed_leg(coupon_rate: Real) -> Leg {
        let schedule = ScheduleBuilder::new(
            date(2025, 1, 15),
            date(2030, 1, 15),
            Period::new(1, TimeUnit::Years),
            Arc::new(NullCalendar),
        )
        .build()
        .unwrap();
        let mut leg = FixedRateLegBuilder::new(&schedule)
            .with_coupon_rate(coupon_rate)
            .with_day_counter(dc())
            .build()
            .unwrap();
        leg.push(Box::new(Redemption::new(100.0, date(2030, 1, 15))));
        leg
    }

    fn annual(rate: Rate) -> InterestRate {
        InterestRate::new(rate, dc(), Compounding::Compounded, Frequency::Annual).unwrap()
    }

    #[test]
    fn par_at_coupon_rate() {
        let leg = make_fixed_leg(0.05);
        let npv = npv_at_yield(&leg, &annual(0.05), date(2025, 1, 15)).unwrap();
        assert_abs_diff_eq!(npv, 100.0, epsilon = 1e-10);
    }

    #[test]
    fn premium_and_discount() {
        let leg = make_fixed_leg(0.05);
        let settlement = date(2025, 1, 15);
        assert!(npv_at_yield(&leg, &annual(0.03), settlement).unwrap() > 100.0);
        assert!(npv_at_yield(&leg, &annual(0.08), settlement).unwrap() < 100.0);
    }

    #[test]
    fn yield_rate_roundtrip() {
        let leg = make_fixed_leg(0.05);
        let settlement = date(2026, 3, 2);
        let target = npv_at_yield(&leg, &annual(0.0437), settlement).unwrap();
        let found = yield_rate(
            &leg,
            target,
            dc(),
            Compounding::Compounded,
            Frequency::Annual,
            settlement,
            1e-12,
            0.05,
        )
        .unwrap();
        assert_abs_diff_eq!(found, 0.0437, epsilon = 1e-8);
    }

    #[test]
    fn yield_of_expired_leg_is_an_error() {
        let leg = make_fixed_leg(0.05);
        let late = date(2031, 1, 1);
        assert!(yield_rate(&leg, 100.0, dc(), Compounding::Continuous, Frequency::Annual, late, 1e-10, 0.05).is_err());
    }

    #[test]
    fn curve_npv_discounts_remaining_flows() {
        let leg = make_fixed_leg(0.05);
        let today = date(2025, 1, 15);
        let curve = FlatForward::continuous(today, 0.04, dc());
        let value = npv(&leg, &curve, today, today);
        let by_hand: Real = leg
            .iter()
            .map(|cf| cf.amount() * (-0.04 * dc().year_fraction(today, cf.date())).exp())
            .sum();
        assert_abs_diff_eq!(value, by_hand, epsilon = 1e-10);

        // Forward valuation at a later date removes the paid coupons.
        let later = date(2027, 3, 1);
        let forward = npv(&leg, &curve, later, later);
        assert!(forward < value / curve.discount_date(later));
    }

    #[test]
    fn accrued_in_running_coupon() {
        let leg = make_fixed_leg(0.05);
        assert_eq!(accrued_amount(&leg, date(2026, 1, 15)), 0.0);
        let mid = date(2026, 7, 15);
        let expected = 5.0 * date(2026, 1, 15).days_between(mid) as Real / 365.0;
        assert_abs_diff_eq!(accrued_amount(&leg, mid), expected, epsilon = 1e-12);
        assert_eq!(accrued_amount(&leg, date(2030, 6, 1)), 0.0);
    }

    #[test]
    fn leg_dates() {
        let leg = make_fixed_leg(0.05);
        assert_eq!(maturity_date(&leg), Some(date(2030, 1, 15)));
        let ref_date = date(2027, 6, 1);
        assert_eq!(previous_cashflow_date(&leg, ref_date), Some(date(2027, 1, 15)));
        assert_eq!(next_cashflow_date(&leg, ref_date), Some(date(2028, 1, 15)));
        assert_eq!(next_cashflow_date(&leg, date(2028, 1, 15)), Some(date(2029, 1, 15)));
    }
}
