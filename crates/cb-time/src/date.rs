//! `Date` type.
//!
//! A thin wrapper over [`chrono::NaiveDate`] adding the arithmetic the
//! schedule and day-count code needs (period advancing, end-of-month
//! handling) with errors reported through the workspace [`Error`] type.

use crate::period::Period;
use crate::time_unit::TimeUnit;
use cb_core::errors::{Error, Result};
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use std::fmt;

/// A calendar date.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    /// Latest representable date.
    pub const MAX: Date = Date(NaiveDate::MAX);

    /// Earliest representable date.
    pub const MIN: Date = Date(NaiveDate::MIN);

    /// Create a date from year, month (1–12), and day-of-month (1–31).
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| Error::Date(format!("invalid date {year}-{month:02}-{day:02}")))
    }

    /// Parse an ISO-8601 `YYYY-MM-DD` string.
    pub fn parse_iso(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|e| Error::Date(format!("cannot parse '{s}': {e}")))
    }

    /// The underlying chrono date.
    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// Year.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month (1–12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of the month (1–31).
    pub fn day_of_month(&self) -> u32 {
        self.0.day()
    }

    /// Day of the year (1–366).
    pub fn day_of_year(&self) -> u32 {
        self.0.ordinal()
    }

    /// Weekday.
    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Saturday or Sunday.
    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }

    // ── Arithmetic ────────────────────────────────────────────────────────────

    /// Advance by `n` calendar days.
    pub fn add_days(self, n: i64) -> Result<Self> {
        self.0
            .checked_add_signed(Duration::days(n))
            .map(Date)
            .ok_or_else(|| Error::Date(format!("{self} + {n} days is out of range")))
    }

    /// Advance by `n` units. Month and year steps clamp the day to the end
    /// of the target month (Jan 31 + 1M = Feb 28/29).
    pub fn advance(self, n: i32, unit: TimeUnit) -> Result<Self> {
        match unit {
            TimeUnit::Days => self.add_days(n as i64),
            TimeUnit::Weeks => self.add_days(7 * n as i64),
            TimeUnit::Months => {
                let shifted = if n >= 0 {
                    self.0.checked_add_months(Months::new(n as u32))
                } else {
                    self.0.checked_sub_months(Months::new(n.unsigned_abs()))
                };
                shifted
                    .map(Date)
                    .ok_or_else(|| Error::Date(format!("{self} + {n} months is out of range")))
            }
            TimeUnit::Years => self.advance(12 * n, TimeUnit::Months),
        }
    }

    /// Advance by a [`Period`].
    pub fn advance_by(self, period: Period) -> Result<Self> {
        self.advance(period.length, period.unit)
    }

    /// Calendar days from `self` to `other` (positive if `other` is later).
    pub fn days_between(self, other: Date) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }

    /// Last calendar day of this date's month.
    pub fn end_of_month(self) -> Self {
        let last = days_in_month(self.year(), self.month());
        Date(self.0.with_day(last).unwrap_or(self.0))
    }

    /// Whether this is the last calendar day of its month.
    pub fn is_end_of_month(self) -> bool {
        self == self.end_of_month()
    }
}

impl From<NaiveDate> for Date {
    fn from(d: NaiveDate) -> Self {
        Date(d)
    }
}

impl From<Date> for NaiveDate {
    fn from(d: Date) -> Self {
        d.0
    }
}

impl std::ops::Add<i64> for Date {
    type Output = Date;
    /// Calendar-day addition; panics only outside chrono's representable
    /// range, exactly like `NaiveDate + Duration`.
    fn add(self, days: i64) -> Date {
        Date(self.0 + Duration::days(days))
    }
}

impl std::ops::Sub<i64> for Date {
    type Output = Date;
    fn sub(self, days: i64) -> Date {
        Date(self.0 - Duration::days(days))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Date({self})")
    }
}

/// Gregorian leap-year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn rejects_invalid_dates() {
        assert!(Date::from_ymd(2019, 2, 29).is_err());
        assert!(Date::from_ymd(2020, 2, 29).is_ok());
        assert!(Date::from_ymd(2019, 13, 1).is_err());
    }

    #[test]
    fn month_advance_clamps_to_month_end() {
        assert_eq!(date(2019, 1, 31).advance(1, TimeUnit::Months).unwrap(), date(2019, 2, 28));
        assert_eq!(date(2020, 1, 31).advance(1, TimeUnit::Months).unwrap(), date(2020, 2, 29));
        assert_eq!(date(2019, 5, 31).advance(-3, TimeUnit::Months).unwrap(), date(2019, 2, 28));
        assert_eq!(date(2019, 2, 25).advance(10, TimeUnit::Years).unwrap(), date(2029, 2, 25));
    }

    #[test]
    fn day_arithmetic() {
        let d = date(2019, 2, 25);
        assert_eq!(d + 2, date(2019, 2, 27));
        assert_eq!(d - 25, date(2019, 1, 31));
        assert_eq!(d.days_between(date(2019, 5, 27)), 91);
        assert_eq!(date(2019, 5, 27).days_between(d), -91);
    }

    #[test]
    fn end_of_month() {
        assert_eq!(date(2024, 2, 10).end_of_month(), date(2024, 2, 29));
        assert!(date(2019, 4, 30).is_end_of_month());
        assert!(!date(2019, 4, 29).is_end_of_month());
    }

    #[test]
    fn parse_and_display() {
        let d = Date::parse_iso("2019-02-25").unwrap();
        assert_eq!(d, date(2019, 2, 25));
        assert_eq!(d.to_string(), "2019-02-25");
        assert!(Date::parse_iso("25/02/2019").is_err());
    }
}
