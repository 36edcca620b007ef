//! The shipped demo scenario file and the built-in example agree.

use approx::assert_abs_diff_eq;
use callable_bonds::instruments::PricingEngine;
use callable_bonds::models::HullWhite;
use callable_bonds::pricingengines::TreeCallableFixedRateBondEngine;
use callable_bonds::{price_callable_bond, ScenarioConfig};
use std::sync::Arc;

const DEMO: &str = include_str!("../demos/callable_bond.toml");

#[test]
fn test_demo_file_matches_builtin_example() {
    let from_file = ScenarioConfig::from_toml_str(DEMO).unwrap();
    assert_eq!(from_file, ScenarioConfig::callable_bond_example().unwrap());
}

#[test]
fn test_hosting_call_matches_engine() {
    let scenario = ScenarioConfig::from_toml_str(DEMO).unwrap();
    let curve = scenario.curve.build().unwrap();
    let hosted = price_callable_bond(&scenario.bond, &scenario.model, &scenario.engine, Arc::clone(&curve)).unwrap();

    let model = HullWhite::new(curve, scenario.model.reversion_speed, scenario.model.volatility).unwrap();
    let engine = TreeCallableFixedRateBondEngine::new(Arc::new(model), scenario.engine.time_steps).unwrap();
    let direct = engine.calculate(&scenario.bond.build().unwrap()).unwrap();

    assert_abs_diff_eq!(hosted.npv, direct.npv, epsilon = 1e-12);
    assert!(hosted.npv < 100.0 * 1.5);
}
