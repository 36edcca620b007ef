//! `Calendar` trait and the two calendars that need no holiday table.
//!
//! A calendar knows which dates are business days and can adjust dates
//! according to a [`BusinessDayConvention`].

use crate::business_day_convention::BusinessDayConvention;
use crate::date::Date;
use crate::period::Period;
use crate::time_unit::TimeUnit;
use cb_core::errors::Result;

/// A financial calendar.
pub trait Calendar: std::fmt::Debug + Send + Sync {
    /// Human-readable name (e.g. `"TARGET"`).
    fn name(&self) -> &str;

    /// Return `true` if `date` is a business day in this calendar.
    fn is_business_day(&self, date: Date) -> bool;

    /// Return `true` if `date` is a holiday (non-business) day.
    fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// Return `true` if `date` is the last business day of its month.
    fn is_end_of_month(&self, date: Date) -> bool {
        date.month() != self.adjust(date + 1, BusinessDayConvention::Following).month()
    }

    /// Return the last business day of the month containing `date`.
    fn end_of_month(&self, date: Date) -> Date {
        self.adjust(date.end_of_month(), BusinessDayConvention::Preceding)
    }

    /// Adjust `date` according to the given business-day convention.
    fn adjust(&self, mut date: Date, convention: BusinessDayConvention) -> Date {
        match convention {
            BusinessDayConvention::Unadjusted => date,
            BusinessDayConvention::Following => {
                while self.is_holiday(date) {
                    date = date + 1;
                }
                date
            }
            BusinessDayConvention::ModifiedFollowing => {
                let adjusted = self.adjust(date, BusinessDayConvention::Following);
                if adjusted.month() != date.month() {
                    self.adjust(date, BusinessDayConvention::Preceding)
                } else {
                    adjusted
                }
            }
            BusinessDayConvention::Preceding => {
                while self.is_holiday(date) {
                    date = date - 1;
                }
                date
            }
            BusinessDayConvention::ModifiedPreceding => {
                let adjusted = self.adjust(date, BusinessDayConvention::Preceding);
                if adjusted.month() != date.month() {
                    self.adjust(date, BusinessDayConvention::Following)
                } else {
                    adjusted
                }
            }
        }
    }

    /// Advance `date` by `n` business days.
    fn advance_business_days(&self, mut date: Date, n: i32) -> Date {
        let step: i64 = if n >= 0 { 1 } else { -1 };
        let mut remaining = n.abs();
        while remaining > 0 {
            date = date + step;
            if self.is_business_day(date) {
                remaining -= 1;
            }
        }
        date
    }

    /// Advance `date` by `period` and adjust the result.
    ///
    /// Day periods count business days. Other units move in calendar time
    /// first; with `end_of_month` set, a start on the last business day of
    /// its month lands on the last business day of the target month.
    fn advance(
        &self,
        date: Date,
        period: Period,
        convention: BusinessDayConvention,
        end_of_month: bool,
    ) -> Result<Date> {
        match period.unit {
            TimeUnit::Days => Ok(self.advance_business_days(date, period.length)),
            TimeUnit::Weeks => Ok(self.adjust(date.advance_by(period)?, convention)),
            TimeUnit::Months | TimeUnit::Years => {
                let shifted = date.advance_by(period)?;
                if end_of_month && self.is_end_of_month(date) {
                    Ok(self.end_of_month(shifted))
                } else {
                    Ok(self.adjust(shifted, convention))
                }
            }
        }
    }

    /// Count the business days between `d1` (exclusive) and `d2`
    /// (inclusive). Negative if `d2 < d1`.
    fn business_days_between(&self, d1: Date, d2: Date) -> i32 {
        if d1 == d2 {
            return 0;
        }
        let sign = if d2 > d1 { 1 } else { -1 };
        let (start, end) = if d2 > d1 { (d1, d2) } else { (d2, d1) };
        let mut count = 0;
        let mut d = start + 1;
        while d <= end {
            if self.is_business_day(d) {
                count += 1;
            }
            d = d + 1;
        }
        sign * count
    }
}

/// Every day is a business day.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCalendar;

impl Calendar for NullCalendar {
    fn name(&self) -> &str {
        "Null"
    }

    fn is_business_day(&self, _date: Date) -> bool {
        true
    }
}

/// Saturdays and Sundays are the only non-business days.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendsOnly;

impl Calendar for WeekendsOnly {
    fn name(&self) -> &str {
        "Weekends Only"
    }

    fn is_business_day(&self, date: Date) -> bool {
        !date.is_weekend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn null_calendar_always_business() {
        let cal = NullCalendar;
        assert!(cal.is_business_day(date(2023, 12, 25)));
        assert!(cal.is_business_day(date(2023, 9, 2)));
    }

    #[test]
    fn adjust_following_and_preceding() {
        let cal = WeekendsOnly;
        // 2023-09-02 is a Saturday
        let sat = date(2023, 9, 2);
        assert_eq!(cal.adjust(sat, BusinessDayConvention::Following), date(2023, 9, 4));
        assert_eq!(cal.adjust(sat, BusinessDayConvention::Preceding), date(2023, 9, 1));
        assert_eq!(cal.adjust(sat, BusinessDayConvention::Unadjusted), sat);
    }

    #[test]
    fn modified_following_stays_in_month() {
        let cal = WeekendsOnly;
        // 2023-09-30 is a Saturday; Following would move into October
        let d = date(2023, 9, 30);
        assert_eq!(cal.adjust(d, BusinessDayConvention::ModifiedFollowing), date(2023, 9, 29));
    }

    #[test]
    fn advance_days_counts_business_days() {
        let cal = WeekendsOnly;
        // Friday + 2 business days = Tuesday
        assert_eq!(cal.advance_business_days(date(2023, 9, 1), 2), date(2023, 9, 5));
        assert_eq!(
            cal.advance(
                date(2023, 9, 1),
                Period::new(2, TimeUnit::Days),
                BusinessDayConvention::Following,
                false
            )
            .unwrap(),
            date(2023, 9, 5)
        );
    }

    #[test]
    fn advance_months_with_end_of_month() {
        let cal = WeekendsOnly;
        let start = date(2023, 6, 30); // Friday, last business day of June
        let p = Period::new(1, TimeUnit::Months);
        assert_eq!(
            cal.advance(start, p, BusinessDayConvention::Following, true).unwrap(),
            date(2023, 7, 31)
        );
        assert_eq!(
            cal.advance(start, p, BusinessDayConvention::Following, false).unwrap(),
            date(2023, 7, 31)
        );
        let start = date(2023, 4, 28); // Friday, last business day of April
        assert_eq!(
            cal.advance(start, p, BusinessDayConvention::Following, true).unwrap(),
            date(2023, 5, 31)
        );
    }

    #[test]
    fn business_days_between() {
        let cal = WeekendsOnly;
        // Tue, Wed, Thu, Fri (d1 exclusive)
        assert_eq!(cal.business_days_between(date(2023, 9, 4), date(2023, 9, 8)), 4);
        assert_eq!(cal.business_days_between(date(2023, 9, 8), date(2023, 9, 4)), -4);
    }
}
