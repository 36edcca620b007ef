//! Day-count conventions used by bond coupons and curves.

use approx::assert_abs_diff_eq;
use cb_time::{Actual360, Actual365Fixed, ActualActual, Date, DayCounter, Thirty360};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

fn arb_date() -> impl Strategy<Value = Date> {
    (1990i32..2060, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| date(y, m, d))
}

#[test]
fn test_actual_actual_bond_semiannual_cases() {
    let dc = ActualActual::bond();
    // Regular semiannual period
    assert_abs_diff_eq!(
        dc.year_fraction_with_ref(date(2003, 11, 1), date(2004, 5, 1), date(2003, 11, 1), date(2004, 5, 1)),
        0.5,
        epsilon = 1e-14
    );
    // Accrual stops before the reference period ends
    let yf = dc.year_fraction_with_ref(
        date(2000, 1, 30),
        date(2000, 6, 30),
        date(2000, 1, 30),
        date(2000, 7, 30),
    );
    assert_abs_diff_eq!(yf, 0.5 * 152.0 / 182.0, epsilon = 1e-14);
}

#[test]
fn test_actual_actual_isda_vs_bond_over_leap_year() {
    let d1 = date(2019, 11, 25);
    let d2 = date(2020, 2, 25);
    let isda = ActualActual::isda().year_fraction(d1, d2);
    let bond = ActualActual::bond().year_fraction_with_ref(d1, d2, d1, d2);
    assert_abs_diff_eq!(isda, 37.0 / 365.0 + 55.0 / 366.0, epsilon = 1e-14);
    assert_abs_diff_eq!(bond, 0.25, epsilon = 1e-14);
}

#[test]
fn test_names() {
    assert_eq!(Actual365Fixed.name(), "Actual/365 (Fixed)");
    assert_eq!(Actual360.name(), "Actual/360");
    assert_eq!(Thirty360.name(), "30/360 (Bond Basis)");
    assert_eq!(ActualActual::bond().name(), "Actual/Actual (ISMA)");
}

proptest! {
    #[test]
    fn isda_is_additive(a in arb_date(), b in arb_date(), c in arb_date()) {
        let dc = ActualActual::isda();
        let lhs = dc.year_fraction(a, b) + dc.year_fraction(b, c);
        let rhs = dc.year_fraction(a, c);
        prop_assert!((lhs - rhs).abs() < 1e-12);
    }

    #[test]
    fn fractions_are_antisymmetric(a in arb_date(), b in arb_date()) {
        let counters: [&dyn DayCounter; 4] =
            [&Actual365Fixed, &Actual360, &ActualActual::isda(), &ActualActual::bond()];
        for dc in counters {
            let fwd = dc.year_fraction(a, b);
            let bwd = dc.year_fraction(b, a);
            prop_assert!((fwd + bwd).abs() < 1e-12, "{}: {fwd} vs {bwd}", dc.name());
        }
    }
}
