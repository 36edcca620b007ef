use cb_instruments::{Callability, CallableFixedRateBond, FixedRateBond, PriceType, PricingEngine};
use cb_models::{HullWhite, OneFactorModel};
use cb_pricingengines::TreeCallableFixedRateBondEngine;
use cb_termstructures::{FlatForward, YieldTermStructure};
use cb_time::{
    ActualActual, BusinessDayConvention, Date, DayCounter, Period, ScheduleBuilder, Target, TimeUnit,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::sync::Arc;

fn benchmark_bond() -> CallableFixedRateBond {
    let issue = Date::from_ymd(2019, 2, 25).expect("valid issue date");
    let maturity = issue.advance(10, TimeUnit::Years).expect("valid maturity");
    let schedule = ScheduleBuilder::new(issue, maturity, Period::new(3, TimeUnit::Months), Arc::new(Target))
        .build()
        .expect("benchmark schedule should be valid");
    let dc: Arc<dyn DayCounter> = Arc::new(ActualActual::bond());
    let bond = FixedRateBond::new(
        2,
        100.0,
        &schedule,
        vec![0.05],
        dc,
        BusinessDayConvention::Following,
        100.0,
        Some(issue),
    )
    .expect("benchmark bond should be valid");

    let mut calls = Vec::with_capacity(38);
    let mut d = (issue + 2).advance(3, TimeUnit::Months).expect("valid call date");
    for _ in 0..38 {
        calls.push(Callability::call(102.0, PriceType::Clean, d));
        d = d.advance(3, TimeUnit::Months).expect("valid call date");
    }
    CallableFixedRateBond::new(bond, calls).expect("benchmark call schedule should be valid")
}

fn benchmark_model() -> Arc<dyn OneFactorModel> {
    let today = Date::from_ymd(2019, 2, 25).expect("valid date");
    let curve: Arc<dyn YieldTermStructure> =
        Arc::new(FlatForward::continuous(today, 0.0275, Arc::new(ActualActual::bond())));
    Arc::new(HullWhite::new(curve, 0.03, 0.1).expect("benchmark model should be valid"))
}

fn bench_tree_engine_steps(c: &mut Criterion) {
    let bond = benchmark_bond();
    let mut group = c.benchmark_group("tree_callable_bond");
    for steps in [100usize, 400] {
        let engine = TreeCallableFixedRateBondEngine::new(benchmark_model(), steps)
            .expect("engine should be valid");
        group.bench_with_input(BenchmarkId::from_parameter(steps), &steps, |b, _| {
            b.iter(|| {
                let npv = engine
                    .calculate(black_box(&bond))
                    .expect("pricing should succeed")
                    .npv;
                black_box(npv)
            })
        });
    }
    group.finish();
}

fn bench_oas(c: &mut Criterion) {
    let bond = benchmark_bond();
    let engine = TreeCallableFixedRateBondEngine::new(benchmark_model(), 100).expect("engine should be valid");
    c.bench_function("tree_callable_bond_oas", |b| {
        b.iter(|| {
            let oas = engine.oas(black_box(&bond), black_box(95.0)).expect("oas should solve");
            black_box(oas)
        })
    });
}

criterion_group!(benches, bench_tree_engine_steps, bench_oas);
criterion_main!(benches);
