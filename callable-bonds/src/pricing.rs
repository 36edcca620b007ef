use crate::config::{CallableBondConfig, EngineConfig, ModelConfig};
use cb_core::errors::Result;
use cb_instruments::{PricingEngine, PricingResults};
use cb_models::HullWhite;
use cb_pricingengines::TreeCallableFixedRateBondEngine;
use cb_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Price a callable bond on a Hull-White lattice fitted to `curve`.
///
/// The NPV is at the curve's reference date; the results also carry the
/// settlement value, dirty and clean prices, accrued amount and embedded
/// option value.
///
/// # Errors
/// `InvalidConfiguration` from any section, `Calibration`,
/// `LatticeInstability` or `NumericalInstability` from the lattice.
pub fn price_callable_bond(
    bond: &CallableBondConfig,
    model: &ModelConfig,
    engine: &EngineConfig,
    curve: Arc<dyn YieldTermStructure>,
) -> Result<PricingResults> {
    model.validate()?;
    engine.validate()?;
    let callable = bond.build()?;
    let hull_white = HullWhite::new(curve, model.reversion_speed, model.volatility)?;
    let tree_engine = TreeCallableFixedRateBondEngine::new(Arc::new(hull_white), engine.time_steps)?
        .with_spread(engine.spread)?;
    let results = tree_engine.calculate(&callable)?;
    tracing::debug!(
        issue = %bond.issue_date,
        maturity = %bond.maturity_date,
        rights = callable.callability().len(),
        time_steps = engine.time_steps,
        npv = results.npv,
        "callable bond priced"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use cb_core::errors::Error;
    use std::io;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn prices_the_example() {
        let scenario = ScenarioConfig::callable_bond_example().unwrap();
        let curve = scenario.curve.build().unwrap();
        let results = price_callable_bond(&scenario.bond, &scenario.model, &scenario.engine, curve).unwrap();
        assert!(results.npv.is_finite() && results.npv > 0.0);
        assert!(results.result("embedded_option_value").unwrap() > 0.0);
    }

    #[test]
    fn rejects_invalid_model() {
        let mut scenario = ScenarioConfig::callable_bond_example().unwrap();
        scenario.model.reversion_speed = -0.01;
        let curve = scenario.curve.build().unwrap();
        assert!(matches!(
            price_callable_bond(&scenario.bond, &scenario.model, &scenario.engine, curve),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn logs_the_priced_bond() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let scenario = ScenarioConfig::callable_bond_example().unwrap();
        let curve = scenario.curve.build().unwrap();
        tracing::subscriber::with_default(subscriber, || {
            price_callable_bond(&scenario.bond, &scenario.model, &scenario.engine, curve).unwrap();
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("callable bond priced"), "{output}");
        assert!(output.contains("rights=38"), "{output}");
    }
}
