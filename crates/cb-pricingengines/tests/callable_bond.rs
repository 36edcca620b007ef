//! End-to-end pricing of callable fixed-rate bonds on a Hull-White lattice.

use approx::assert_abs_diff_eq;
use cb_core::errors::Error;
use cb_core::Real;
use cb_instruments::{
    Callability, CallableFixedRateBond, FixedRateBond, Instrument, PriceType, PricingEngine,
};
use cb_models::{HullWhite, OneFactorModel};
use cb_pricingengines::{DiscountingBondEngine, TreeCallableFixedRateBondEngine};
use cb_termstructures::{FlatForward, YieldTermStructure};
use cb_time::{
    ActualActual, BusinessDayConvention, DateGeneration, Date, DayCounter, Period,
    ScheduleBuilder, Target, TimeUnit,
};
use proptest::prelude::*;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

fn issue() -> Date {
    date(2019, 2, 25)
}

fn day_counter() -> Arc<dyn DayCounter> {
    Arc::new(ActualActual::bond())
}

fn curve(today: Date) -> Arc<dyn YieldTermStructure> {
    Arc::new(FlatForward::continuous(today, 0.0275, day_counter()))
}

/// Ten-year quarterly 5% bond on TARGET, two settlement days.
fn straight_bond() -> FixedRateBond {
    let maturity = issue().advance(10, TimeUnit::Years).unwrap();
    let schedule = ScheduleBuilder::new(issue(), maturity, Period::new(3, TimeUnit::Months), Arc::new(Target))
        .with_convention(BusinessDayConvention::Following)
        .with_termination_convention(BusinessDayConvention::Following)
        .with_rule(DateGeneration::Backward)
        .end_of_month(false)
        .build()
        .unwrap();
    FixedRateBond::new(
        2,
        100.0,
        &schedule,
        vec![0.05],
        day_counter(),
        BusinessDayConvention::Following,
        100.0,
        Some(issue()),
    )
    .unwrap()
}

/// 38 quarterly rights from three months after settlement.
fn rights(price: Real, price_type: PriceType, put: bool) -> Vec<Callability> {
    let mut dates = Vec::with_capacity(38);
    let mut d = (issue() + 2).advance(3, TimeUnit::Months).unwrap();
    for _ in 0..38 {
        dates.push(d);
        d = d.advance(3, TimeUnit::Months).unwrap();
    }
    dates
        .into_iter()
        .map(|d| {
            if put {
                Callability::put(price, price_type, d)
            } else {
                Callability::call(price, price_type, d)
            }
        })
        .collect()
}

fn callable_at(price: Real) -> CallableFixedRateBond {
    CallableFixedRateBond::new(straight_bond(), rights(price, PriceType::Clean, false)).unwrap()
}

fn model(today: Date, sigma: Real) -> Arc<dyn OneFactorModel> {
    Arc::new(HullWhite::new(curve(today), 0.03, sigma).unwrap())
}

fn engine(steps: usize) -> TreeCallableFixedRateBondEngine {
    TreeCallableFixedRateBondEngine::new(model(issue(), 0.1), steps).unwrap()
}

fn npv(engine: &TreeCallableFixedRateBondEngine, bond: &CallableFixedRateBond) -> Real {
    engine.calculate(bond).unwrap().npv
}

#[test]
fn test_call_schedule_dates() {
    let calls = rights(102.0, PriceType::Clean, false);
    assert_eq!(calls[0].date(), date(2019, 5, 27));
    assert_eq!(calls[37].date(), date(2028, 8, 27));
}

#[test]
fn test_scenario_is_worth_less_than_the_straight_bond() {
    let engine = engine(100);
    let callable = npv(&engine, &callable_at(102.0));
    let straight = npv(&engine, &CallableFixedRateBond::new(straight_bond(), Vec::new()).unwrap());
    assert!(callable.is_finite());
    assert!(callable > 0.0);
    assert!(callable < straight, "callable {callable} vs straight {straight}");
}

#[test]
fn test_empty_schedule_matches_discounting() {
    let engine = engine(100);
    let bond = CallableFixedRateBond::new(straight_bond(), Vec::new()).unwrap();
    let tree = engine.calculate(&bond).unwrap();
    let discounting = DiscountingBondEngine::new(curve(issue())).calculate(bond.bond()).unwrap();

    assert_abs_diff_eq!(tree.npv, discounting.npv, epsilon = 1e-6);
    for key in ["settlement_value", "dirty_price", "clean_price", "accrued_amount"] {
        assert_abs_diff_eq!(
            tree.result(key).unwrap(),
            discounting.result(key).unwrap(),
            epsilon = 1e-6
        );
    }
    assert_abs_diff_eq!(tree.result("embedded_option_value").unwrap(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_npv_increases_with_call_price() {
    let engine = engine(100);
    let low = npv(&engine, &callable_at(100.0));
    let mid = npv(&engine, &callable_at(102.0));
    let high = npv(&engine, &callable_at(110.0));
    assert!(low <= mid + 1e-12, "{low} > {mid}");
    assert!(mid <= high + 1e-12, "{mid} > {high}");
}

#[test]
fn test_clean_call_price_adds_accrued() {
    let engine = engine(100);
    let clean = npv(&engine, &callable_at(102.0));
    let dirty = npv(
        &engine,
        &CallableFixedRateBond::new(straight_bond(), rights(102.0, PriceType::Dirty, false)).unwrap(),
    );
    assert!(clean >= dirty - 1e-12, "clean {clean} < dirty {dirty}");
}

#[test]
fn test_converges_in_time_steps() {
    let bond = callable_at(102.0);
    let coarse = npv(&engine(100), &bond);
    let fine = npv(&engine(400), &bond);
    assert!((coarse - fine).abs() < 0.01 * 100.0, "100 steps: {coarse}, 400 steps: {fine}");
}

#[test]
fn test_put_floors_the_value() {
    let engine = engine(100);
    let straight = npv(&engine, &CallableFixedRateBond::new(straight_bond(), Vec::new()).unwrap());
    let puttable =
        CallableFixedRateBond::new(straight_bond(), rights(100.0, PriceType::Dirty, true)).unwrap();
    let results = engine.calculate(&puttable).unwrap();
    assert!(results.npv > straight);
    assert!(results.result("embedded_option_value").unwrap() < 0.0);
}

#[test]
fn test_option_value() {
    let engine = engine(100);
    let bond = callable_at(102.0);
    let results = engine.calculate(&bond).unwrap();
    let option = engine.embedded_option_value(&bond).unwrap();
    assert!(option > 0.0);
    assert_abs_diff_eq!(option, results.result("embedded_option_value").unwrap(), epsilon = 1e-10);
}

#[test]
fn test_oas_roundtrip() {
    let engine = engine(100);
    let bond = callable_at(102.0);
    let clean = engine.clean_price_at_oas(&bond, 0.005).unwrap();
    let at_zero = engine.calculate(&bond).unwrap().result("clean_price").unwrap();
    assert!(clean < at_zero);

    let oas = engine.oas(&bond, clean).unwrap();
    assert_abs_diff_eq!(oas, 0.005, epsilon = 1e-7);
    assert_abs_diff_eq!(engine.oas(&bond, at_zero).unwrap(), 0.0, epsilon = 1e-7);
}

#[test]
fn test_effective_duration_and_convexity() {
    let engine = engine(100);
    let bond = callable_at(102.0);
    let straight = CallableFixedRateBond::new(straight_bond(), Vec::new()).unwrap();

    let duration = engine.effective_duration(&bond, 0.0, 1e-4).unwrap();
    let straight_duration = engine.effective_duration(&straight, 0.0, 1e-4).unwrap();
    assert!(duration > 0.0);
    assert!(duration < straight_duration, "{duration} vs {straight_duration}");

    let straight_convexity = engine.effective_convexity(&straight, 0.0, 1e-4).unwrap();
    assert!(straight_convexity > 0.0);
    assert!(engine.effective_convexity(&bond, 0.0, 1e-4).unwrap().is_finite());
    assert!(matches!(
        engine.effective_duration(&bond, 0.0, 0.0),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_spread_lowers_the_price() {
    let bond = callable_at(102.0);
    let base = npv(&engine(100), &bond);
    let spread = engine(100).with_spread(0.01).unwrap();
    assert!(npv(&spread, &bond) < base);
    assert!(engine(100).with_spread(Real::NAN).is_err());
}

#[test]
fn test_invalid_configurations() {
    assert!(matches!(
        TreeCallableFixedRateBondEngine::new(model(issue(), 0.1), 0),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        HullWhite::new(curve(issue()), 0.0, 0.1),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        HullWhite::new(curve(issue()), 0.03, -0.1),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_expired_bond_is_an_error() {
    let engine = TreeCallableFixedRateBondEngine::new(model(date(2030, 1, 2), 0.1), 50).unwrap();
    assert!(matches!(engine.calculate(&callable_at(102.0)), Err(Error::Runtime(_))));
}

#[test]
fn test_bond_settling_on_maturity_is_expired() {
    // Two TARGET days after 2029-02-22 is the maturity date itself.
    let today = date(2029, 2, 22);
    assert_eq!(straight_bond().settlement_date(today), straight_bond().maturity_date());
    let engine = TreeCallableFixedRateBondEngine::new(model(today, 0.1), 50).unwrap();
    let straight = CallableFixedRateBond::new(straight_bond(), Vec::new()).unwrap();
    assert!(matches!(engine.calculate(&straight), Err(Error::Runtime(_))));
    assert!(matches!(engine.calculate(&callable_at(102.0)), Err(Error::Runtime(_))));
}

#[test]
fn test_seasoned_bond_skips_paid_flows() {
    // Valued mid-life: earlier coupons and calls are gone.
    let today = date(2024, 4, 10);
    let engine = TreeCallableFixedRateBondEngine::new(model(today, 0.1), 100).unwrap();
    let straight = CallableFixedRateBond::new(straight_bond(), Vec::new()).unwrap();
    let tree = engine.calculate(&straight).unwrap();
    let discounting = DiscountingBondEngine::new(curve(today)).calculate(straight.bond()).unwrap();
    assert_abs_diff_eq!(tree.npv, discounting.npv, epsilon = 1e-6);
    assert!(npv(&engine, &callable_at(102.0)) < tree.npv);
}

#[test]
fn test_parallel_valuations_agree() {
    let engine = engine(100);
    let prices = [100.0, 101.0, 102.0, 105.0];
    let sequential: Vec<Real> = prices.iter().map(|&p| npv(&engine, &callable_at(p))).collect();

    let parallel: Vec<Real> = std::thread::scope(|s| {
        let handles: Vec<_> = prices
            .iter()
            .map(|&p| {
                let engine = &engine;
                s.spawn(move || npv(engine, &callable_at(p)))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(sequential, parallel);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn callable_never_exceeds_straight(price in 99.0f64..110.0, sigma in 0.005f64..0.05) {
        let engine = TreeCallableFixedRateBondEngine::new(model(issue(), sigma), 50).unwrap();
        let straight = npv(&engine, &CallableFixedRateBond::new(straight_bond(), Vec::new()).unwrap());
        let callable = npv(&engine, &callable_at(price));
        prop_assert!(callable.is_finite());
        prop_assert!(callable <= straight + 1e-9);
    }
}
