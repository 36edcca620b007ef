//! `DayCounter` trait and the day-count conventions used by bond cash flows
//! and term structures.
//!
//! A day counter computes the **day count fraction**, the fraction of a year
//! between two dates used when discounting or accruing interest.

use crate::date::{is_leap_year, Date};
use crate::time_unit::TimeUnit;
use cb_core::{Real, Time};

/// A convention for counting the fraction of a year between two dates.
pub trait DayCounter: std::fmt::Debug + Send + Sync {
    /// Human-readable name of this convention (e.g. `"Actual/365 (Fixed)"`).
    fn name(&self) -> &str;

    /// Number of days between `d1` and `d2` according to this convention.
    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        d1.days_between(d2)
    }

    /// Fraction of a year between `d1` and `d2`.
    fn year_fraction(&self, d1: Date, d2: Date) -> Time;

    /// Fraction of a year between `d1` and `d2` measured against the coupon
    /// reference period `[ref_start, ref_end]`.
    ///
    /// Only conventions that depend on the coupon period override this.
    fn year_fraction_with_ref(&self, d1: Date, d2: Date, _ref_start: Date, _ref_end: Date) -> Time {
        self.year_fraction(d1, d2)
    }
}

/// Actual/365 (Fixed): `actual_days / 365`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual365Fixed;

impl DayCounter for Actual365Fixed {
    fn name(&self) -> &str {
        "Actual/365 (Fixed)"
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 365.0
    }
}

/// Actual/360: `actual_days / 360`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual360;

impl DayCounter for Actual360 {
    fn name(&self) -> &str {
        "Actual/360"
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}

/// 30/360 (Bond Basis).
///
/// A 31st is treated as the 30th; the end date only when the start date
/// was itself moved to (or already was) the 30th.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thirty360;

impl DayCounter for Thirty360 {
    fn name(&self) -> &str {
        "30/360 (Bond Basis)"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        let dd1 = d1.day_of_month().min(30) as i64;
        let mut dd2 = d2.day_of_month() as i64;
        if dd2 == 31 && dd1 >= 30 {
            dd2 = 30;
        }
        let years = (d2.year() - d1.year()) as i64;
        let months = d2.month() as i64 - d1.month() as i64;
        360 * years + 30 * months + (dd2 - dd1)
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}

/// Which flavour of Actual/Actual to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActualActualConvention {
    /// ISDA: days in each calendar year divided by that year's length.
    Isda,
    /// ISMA / Bond: accrual measured against the coupon reference period.
    #[default]
    Bond,
}

/// Actual/Actual day counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActualActual {
    convention: ActualActualConvention,
}

impl ActualActual {
    /// Create an Actual/Actual counter with the given convention.
    pub fn new(convention: ActualActualConvention) -> Self {
        Self { convention }
    }

    /// Actual/Actual (ISDA).
    pub fn isda() -> Self {
        Self::new(ActualActualConvention::Isda)
    }

    /// Actual/Actual (Bond), also known as ISMA.
    pub fn bond() -> Self {
        Self::new(ActualActualConvention::Bond)
    }

    /// The convention this counter applies.
    pub fn convention(&self) -> ActualActualConvention {
        self.convention
    }
}

impl DayCounter for ActualActual {
    fn name(&self) -> &str {
        match self.convention {
            ActualActualConvention::Isda => "Actual/Actual (ISDA)",
            ActualActualConvention::Bond => "Actual/Actual (ISMA)",
        }
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        if d1 > d2 {
            return -self.year_fraction(d2, d1);
        }
        self.year_fraction_with_ref(d1, d2, d1, d2)
    }

    fn year_fraction_with_ref(&self, d1: Date, d2: Date, ref_start: Date, ref_end: Date) -> Time {
        match self.convention {
            ActualActualConvention::Isda => isda_fraction(d1, d2),
            ActualActualConvention::Bond => {
                // An inconsistent reference period degrades to the plain
                // two-date measure.
                isma_fraction(d1, d2, ref_start, ref_end)
                    .or_else(|| isma_fraction(d1, d2, d1, d2))
                    .unwrap_or_else(|| isda_fraction(d1, d2))
            }
        }
    }
}

fn days_in_year(year: i32) -> Real {
    if is_leap_year(year) {
        366.0
    } else {
        365.0
    }
}

fn isda_fraction(d1: Date, d2: Date) -> Time {
    if d1 == d2 {
        return 0.0;
    }
    if d1 > d2 {
        return -isda_fraction(d2, d1);
    }
    let y1 = d1.year();
    let y2 = d2.year();
    let (Ok(next_year_start), Ok(last_year_start)) =
        (Date::from_ymd(y1 + 1, 1, 1), Date::from_ymd(y2, 1, 1))
    else {
        return d1.days_between(d2) as Real / 365.0;
    };
    let mut sum = (y2 - y1 - 1) as Real;
    sum += d1.days_between(next_year_start) as Real / days_in_year(y1);
    sum += last_year_start.days_between(d2) as Real / days_in_year(y2);
    sum
}

/// ISMA accrual. `None` when the reference period cannot bracket the
/// accrual dates.
fn isma_fraction(d1: Date, d2: Date, ref_start: Date, ref_end: Date) -> Option<Time> {
    if d1 == d2 {
        return Some(0.0);
    }
    if d1 > d2 {
        return isma_fraction(d2, d1, ref_start, ref_end).map(|t| -t);
    }
    if !(ref_end > ref_start && ref_end > d1) {
        return None;
    }

    let (mut ref_start, mut ref_end) = (ref_start, ref_end);
    let mut months = (0.5 + 12.0 * ref_start.days_between(ref_end) as Real / 365.0) as i32;
    if months == 0 {
        // Short reference periods are replaced by one year from d1.
        ref_start = d1;
        ref_end = d1.advance(1, TimeUnit::Years).ok()?;
        months = 12;
    }
    let period = months as Real / 12.0;

    if d2 <= ref_end {
        if d1 >= ref_start {
            Some(period * d1.days_between(d2) as Real / ref_start.days_between(ref_end) as Real)
        } else {
            // d1 sits before the reference period: measure that stub against
            // the notional period preceding it.
            let previous_ref = ref_start.advance(-months, TimeUnit::Months).ok()?;
            if d2 > ref_start {
                Some(
                    isma_fraction(d1, ref_start, previous_ref, ref_start)?
                        + isma_fraction(ref_start, d2, ref_start, ref_end)?,
                )
            } else {
                isma_fraction(d1, d2, previous_ref, ref_start)
            }
        }
    } else {
        if ref_start > d1 {
            return None;
        }
        // ref_start <= d1 < ref_end < d2
        let mut sum = isma_fraction(d1, ref_end, ref_start, ref_end)?;
        let mut i = 0;
        loop {
            let new_start = ref_end.advance(months * i, TimeUnit::Months).ok()?;
            let new_end = ref_end.advance(months * (i + 1), TimeUnit::Months).ok()?;
            if d2 < new_end {
                sum += isma_fraction(new_start, d2, new_start, new_end)?;
                return Some(sum);
            }
            sum += period;
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn actual_365_fixed() {
        let yf = Actual365Fixed.year_fraction(date(2019, 2, 25), date(2020, 2, 25));
        assert_abs_diff_eq!(yf, 365.0 / 365.0, epsilon = 1e-15);
        let yf = Actual365Fixed.year_fraction(date(2020, 2, 25), date(2021, 2, 25));
        assert_abs_diff_eq!(yf, 366.0 / 365.0, epsilon = 1e-15);
    }

    #[test]
    fn actual_360() {
        let yf = Actual360.year_fraction(date(2019, 1, 1), date(2019, 7, 1));
        assert_abs_diff_eq!(yf, 181.0 / 360.0, epsilon = 1e-15);
    }

    #[test]
    fn thirty_360_bond_basis() {
        let dc = Thirty360;
        assert_eq!(dc.day_count(date(2019, 1, 31), date(2019, 3, 31)), 60);
        assert_eq!(dc.day_count(date(2019, 1, 30), date(2019, 3, 31)), 60);
        assert_eq!(dc.day_count(date(2019, 1, 29), date(2019, 3, 31)), 62);
        assert_eq!(dc.day_count(date(2019, 2, 28), date(2019, 3, 31)), 33);
        assert_abs_diff_eq!(dc.year_fraction(date(2019, 2, 25), date(2029, 2, 25)), 10.0);
    }

    #[test]
    fn actual_actual_isda() {
        let dc = ActualActual::isda();
        // Nov 1 2003 – May 1 2004: 61/365 + 121/366
        let yf = dc.year_fraction(date(2003, 11, 1), date(2004, 5, 1));
        assert_abs_diff_eq!(yf, 61.0 / 365.0 + 121.0 / 366.0, epsilon = 1e-14);
        assert_abs_diff_eq!(dc.year_fraction(date(2004, 5, 1), date(2003, 11, 1)), -yf, epsilon = 1e-14);
    }

    #[test]
    fn actual_actual_bond_regular_period() {
        let dc = ActualActual::bond();
        // A regular semiannual coupon accrues exactly half a year.
        let yf = dc.year_fraction_with_ref(
            date(2003, 11, 1),
            date(2004, 5, 1),
            date(2003, 11, 1),
            date(2004, 5, 1),
        );
        assert_abs_diff_eq!(yf, 0.5, epsilon = 1e-14);

        // Quarterly: any full quarter is 0.25
        let yf = dc.year_fraction_with_ref(
            date(2019, 2, 25),
            date(2019, 5, 27),
            date(2019, 2, 25),
            date(2019, 5, 27),
        );
        assert_abs_diff_eq!(yf, 0.25, epsilon = 1e-14);
    }

    #[test]
    fn actual_actual_bond_short_first_coupon() {
        let dc = ActualActual::bond();
        // Short first period Feb 1 1999 – Jul 1 1999, reference Jan 1 – Jul 1
        let yf = dc.year_fraction_with_ref(
            date(1999, 2, 1),
            date(1999, 7, 1),
            date(1999, 1, 1),
            date(1999, 7, 1),
        );
        assert_abs_diff_eq!(yf, 0.5 * 150.0 / 181.0, epsilon = 1e-14);
    }

    #[test]
    fn actual_actual_bond_long_first_coupon() {
        let dc = ActualActual::bond();
        // Long first period Aug 15 2002 – Jul 15 2003, reference Jan 15 – Jul 15 2003
        let yf = dc.year_fraction_with_ref(
            date(2002, 8, 15),
            date(2003, 7, 15),
            date(2003, 1, 15),
            date(2003, 7, 15),
        );
        let expected = 0.5 * 153.0 / 184.0 + 0.5;
        assert_abs_diff_eq!(yf, expected, epsilon = 1e-14);
    }

    #[test]
    fn actual_actual_bond_without_reference_spans_years() {
        let dc = ActualActual::bond();
        let yf = dc.year_fraction(date(2019, 2, 25), date(2029, 2, 25));
        assert_abs_diff_eq!(yf, 10.0, epsilon = 1e-12);
    }
}
