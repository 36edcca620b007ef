//! Callable-bond valuation and fixed-rate bond analytics.
//!
//! Usage: `cargo run --example callable_bond [scenario.toml]`
//!
//! Without an argument the built-in ten-year quarterly bond, callable at 102
//! clean, is priced. Set `RUST_LOG=debug` to see lattice diagnostics.

use callable_bonds::cashflows::CashFlow;
use callable_bonds::core::errors::Result;
use callable_bonds::core::Compounding;
use callable_bonds::instruments::{FixedRateBond, Instrument};
use callable_bonds::time::{
    BusinessDayConvention, Date, DateGeneration, DayCounter, Frequency, Period, ScheduleBuilder,
    Thirty360, TimeUnit, WeekendsOnly,
};
use callable_bonds::{price_callable_bond, ScenarioConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let scenario = match std::env::args().nth(1) {
        Some(path) => ScenarioConfig::from_file(path)?,
        None => ScenarioConfig::callable_bond_example()?,
    };
    callable_bond(&scenario)?;
    println!();
    fixed_rate_bond_analytics()
}

fn callable_bond(scenario: &ScenarioConfig) -> Result<()> {
    let bond = &scenario.bond;
    println!("CALLABLE BOND PRICING");
    println!("Today = {}", scenario.curve.reference_date);
    println!("Issuance = {}", bond.issue_date);
    println!("Maturity = {}", bond.maturity_date);
    println!("Risk-free rate = {}", scenario.curve.rate);
    println!("Face value = {}", bond.face_amount);
    println!("Coupon = {:?}", bond.coupon_rates);
    if let Some(calls) = &bond.periodic_callability {
        println!("Call price = {} ({:?})", calls.price, calls.price_type);
    }
    println!("Coupon tenor = {} months", bond.coupon_tenor_months);
    println!();

    let curve = scenario.curve.build()?;
    let results = price_callable_bond(bond, &scenario.model, &scenario.engine, curve)?;
    println!("NPV: {:.6}", results.npv);
    for key in ["clean_price", "dirty_price", "accrued_amount", "embedded_option_value"] {
        if let Some(value) = results.result(key) {
            println!("{key}: {value:.6}");
        }
    }
    Ok(())
}

fn fixed_rate_bond_analytics() -> Result<()> {
    println!("FIXED RATE BOND ANALYTICS");
    let today = Date::from_ymd(2019, 3, 14)?;
    let issue = Date::from_ymd(2017, 8, 31)?;
    let maturity = Date::from_ymd(2022, 8, 31)?;
    let day_counter: Arc<dyn DayCounter> = Arc::new(Thirty360);
    let clean_price = 97.989976;

    // Stands in for a US government bond calendar: the schedule is unadjusted,
    // so holidays never move a date.
    let schedule = ScheduleBuilder::new(issue, maturity, Period::new(6, TimeUnit::Months), Arc::new(WeekendsOnly))
        .with_convention(BusinessDayConvention::Unadjusted)
        .with_termination_convention(BusinessDayConvention::Unadjusted)
        .with_rule(DateGeneration::Backward)
        .end_of_month(false)
        .build()?;
    let bond = FixedRateBond::new(
        0,
        100.0,
        &schedule,
        vec![0.03125],
        Arc::clone(&day_counter),
        BusinessDayConvention::Unadjusted,
        100.0,
        Some(issue),
    )?;

    let ytm = bond.yield_to_maturity(clean_price, day_counter, Compounding::Simple, Frequency::Semiannual, today)?;
    println!("yield to maturity: {ytm:.8}");
    println!("accrued interest: {:.8}", bond.accrued_amount(today));
    println!("maturity: {}", bond.maturity_date());
    println!("Cashflows");
    let coupons = &bond.cashflows()[..bond.cashflows().len() - 1];
    for cf in coupons {
        println!(" date: {} value: {}", cf.date(), cf.amount());
    }
    Ok(())
}
