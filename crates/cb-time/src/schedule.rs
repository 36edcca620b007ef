//! `Schedule`: a sequence of coupon dates.
//!
//! A `Schedule` generates the accrual dates for a bond given a start date,
//! end date, tenor, calendar, and business-day conventions. Dates are
//! rolled on the unadjusted grid and adjusted afterwards, so a holiday on
//! one roll date never shifts the following ones.

use crate::business_day_convention::BusinessDayConvention;
use crate::calendar::Calendar;
use crate::date::Date;
use crate::period::Period;
use crate::time_unit::TimeUnit;
use cb_core::errors::{Error, Result};
use std::sync::Arc;

/// Date generation rule for schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateGeneration {
    /// Dates generated backward from the termination date.
    Backward,
    /// Dates generated forward from the effective date.
    Forward,
    /// Only the effective and termination dates.
    Zero,
}

/// An ordered sequence of coupon dates.
#[derive(Debug, Clone)]
pub struct Schedule {
    dates: Vec<Date>,
    is_regular: Vec<bool>,
    calendar: Arc<dyn Calendar>,
    tenor: Option<Period>,
    convention: BusinessDayConvention,
    termination_convention: BusinessDayConvention,
    end_of_month: bool,
}

impl Schedule {
    /// Build a schedule from an explicit, strictly increasing list of
    /// dates. All periods are flagged regular.
    pub fn from_dates(
        dates: Vec<Date>,
        calendar: Arc<dyn Calendar>,
        convention: BusinessDayConvention,
    ) -> Result<Self> {
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidConfiguration(
                "schedule dates must be strictly increasing".into(),
            ));
        }
        Ok(Self {
            is_regular: vec![true; dates.len().saturating_sub(1)],
            dates,
            calendar,
            tenor: None,
            convention,
            termination_convention: convention,
            end_of_month: false,
        })
    }

    /// All dates in the schedule.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Number of dates.
    pub fn size(&self) -> usize {
        self.dates.len()
    }

    /// `true` if the schedule has no dates.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The `i`-th date.
    pub fn date(&self, i: usize) -> Date {
        self.dates[i]
    }

    /// The start (effective) date.
    pub fn start_date(&self) -> Option<Date> {
        self.dates.first().copied()
    }

    /// The end (termination) date.
    pub fn end_date(&self) -> Option<Date> {
        self.dates.last().copied()
    }

    /// Whether the period `[dates[i], dates[i + 1]]` is a full tenor.
    pub fn is_regular(&self, i: usize) -> bool {
        self.is_regular.get(i).copied().unwrap_or(true)
    }

    /// The calendar used for adjustment.
    pub fn calendar(&self) -> &Arc<dyn Calendar> {
        &self.calendar
    }

    /// The generating tenor, `None` for explicit date lists.
    pub fn tenor(&self) -> Option<Period> {
        self.tenor
    }

    /// Convention for intermediate dates.
    pub fn convention(&self) -> BusinessDayConvention {
        self.convention
    }

    /// Convention for the termination date.
    pub fn termination_convention(&self) -> BusinessDayConvention {
        self.termination_convention
    }

    /// Whether end-of-month rolling is active.
    pub fn end_of_month(&self) -> bool {
        self.end_of_month
    }

    /// First date on or after `d`.
    pub fn next_date(&self, d: Date) -> Option<Date> {
        let i = self.dates.partition_point(|x| *x < d);
        self.dates.get(i).copied()
    }

    /// Last date strictly before `d`.
    pub fn previous_date(&self, d: Date) -> Option<Date> {
        let i = self.dates.partition_point(|x| *x < d);
        i.checked_sub(1).map(|k| self.dates[k])
    }
}

/// Builder for [`Schedule`].
#[derive(Debug)]
pub struct ScheduleBuilder {
    effective_date: Date,
    termination_date: Date,
    tenor: Period,
    calendar: Arc<dyn Calendar>,
    convention: BusinessDayConvention,
    termination_convention: BusinessDayConvention,
    rule: DateGeneration,
    end_of_month: bool,
    first_date: Option<Date>,
    next_to_last_date: Option<Date>,
}

impl ScheduleBuilder {
    /// Begin building a schedule.
    pub fn new(
        effective_date: Date,
        termination_date: Date,
        tenor: Period,
        calendar: Arc<dyn Calendar>,
    ) -> Self {
        Self {
            effective_date,
            termination_date,
            tenor,
            calendar,
            convention: BusinessDayConvention::Following,
            termination_convention: BusinessDayConvention::Following,
            rule: DateGeneration::Backward,
            end_of_month: false,
            first_date: None,
            next_to_last_date: None,
        }
    }

    /// Set the business-day convention for intermediate dates.
    pub fn with_convention(mut self, c: BusinessDayConvention) -> Self {
        self.convention = c;
        self
    }

    /// Set the business-day convention for the termination date.
    pub fn with_termination_convention(mut self, c: BusinessDayConvention) -> Self {
        self.termination_convention = c;
        self
    }

    /// Set the date-generation rule.
    pub fn with_rule(mut self, rule: DateGeneration) -> Self {
        self.rule = rule;
        self
    }

    /// Whether to roll month-end dates to month ends.
    pub fn end_of_month(mut self, flag: bool) -> Self {
        self.end_of_month = flag;
        self
    }

    /// Optional first irregular coupon date.
    pub fn with_first_date(mut self, d: Date) -> Self {
        self.first_date = Some(d);
        self
    }

    /// Optional next-to-last irregular coupon date.
    pub fn with_next_to_last_date(mut self, d: Date) -> Self {
        self.next_to_last_date = Some(d);
        self
    }

    /// Unadjusted roll of `seed` by `n` tenors.
    fn roll(&self, seed: Date, n: i32, eom: bool) -> Result<Date> {
        let shifted = seed.advance_by(self.tenor * n)?;
        if eom && seed.is_end_of_month() {
            Ok(shifted.end_of_month())
        } else {
            Ok(shifted)
        }
    }

    /// Build the `Schedule`.
    pub fn build(self) -> Result<Schedule> {
        let start = self.effective_date;
        let end = self.termination_date;
        let cal = Arc::clone(&self.calendar);
        let conv = self.convention;

        if start >= end {
            return Err(Error::InvalidConfiguration(format!(
                "effective date ({start}) must be before termination date ({end})"
            )));
        }
        if self.tenor.length < 0 {
            return Err(Error::InvalidConfiguration(format!(
                "non-positive tenor ({}) not allowed",
                self.tenor
            )));
        }
        for (label, d) in [("first", self.first_date), ("next-to-last", self.next_to_last_date)] {
            if let Some(d) = d {
                if d <= start || d >= end {
                    return Err(Error::InvalidConfiguration(format!(
                        "{label} date ({d}) out of effective-termination date range ({start}, {end}]"
                    )));
                }
            }
        }

        let rule = if self.tenor.length == 0 {
            DateGeneration::Zero
        } else {
            self.rule
        };
        let eom = self.end_of_month && matches!(self.tenor.unit, TimeUnit::Months | TimeUnit::Years);

        let mut dates: Vec<Date> = Vec::new();
        let mut is_regular: Vec<bool> = Vec::new();

        match rule {
            DateGeneration::Zero => {
                dates = vec![start, end];
                is_regular = vec![true];
            }
            DateGeneration::Backward => {
                dates.push(end);
                let mut seed = end;
                if let Some(ntl) = self.next_to_last_date {
                    dates.insert(0, ntl);
                    is_regular.insert(0, self.roll(seed, -1, eom)? == ntl);
                    seed = ntl;
                }
                let exit = self.first_date.unwrap_or(start);
                let mut periods = 1;
                loop {
                    let temp = self.roll(seed, -periods, eom)?;
                    if temp < exit {
                        if let Some(fd) = self.first_date {
                            if cal.adjust(dates[0], conv) != cal.adjust(fd, conv) {
                                dates.insert(0, fd);
                                is_regular.insert(0, false);
                            }
                        }
                        break;
                    }
                    // skip dates that collapse onto their neighbour after adjustment
                    if cal.adjust(dates[0], conv) != cal.adjust(temp, conv) {
                        dates.insert(0, temp);
                        is_regular.insert(0, true);
                    }
                    periods += 1;
                }
                if cal.adjust(dates[0], conv) != cal.adjust(start, conv) {
                    dates.insert(0, start);
                    is_regular.insert(0, false);
                }
            }
            DateGeneration::Forward => {
                dates.push(start);
                let mut seed = start;
                if let Some(fd) = self.first_date {
                    dates.push(fd);
                    is_regular.push(self.roll(seed, 1, eom)? == fd);
                    seed = fd;
                }
                let exit = self.next_to_last_date.unwrap_or(end);
                let mut periods = 1;
                loop {
                    let temp = self.roll(seed, periods, eom)?;
                    if temp > exit {
                        if let Some(ntl) = self.next_to_last_date {
                            let last = dates[dates.len() - 1];
                            if cal.adjust(last, conv) != cal.adjust(ntl, conv) {
                                dates.push(ntl);
                                is_regular.push(false);
                            }
                        }
                        break;
                    }
                    let last = dates[dates.len() - 1];
                    if cal.adjust(last, conv) != cal.adjust(temp, conv) {
                        dates.push(temp);
                        is_regular.push(true);
                    }
                    periods += 1;
                }
                let last = dates[dates.len() - 1];
                let tc = self.termination_convention;
                if cal.adjust(last, tc) != cal.adjust(end, tc) {
                    dates.push(end);
                    is_regular.push(false);
                }
            }
        }

        // Adjustment pass.
        let n = dates.len();
        dates[0] = cal.adjust(dates[0], conv);
        dates[n - 1] = cal.adjust(dates[n - 1], self.termination_convention);
        let eom_seed = match rule {
            DateGeneration::Forward => start,
            _ => end,
        };
        for d in dates.iter_mut().take(n - 1).skip(1) {
            *d = if eom && eom_seed.is_end_of_month() {
                cal.end_of_month(*d)
            } else {
                cal.adjust(*d, conv)
            };
        }

        // Collapse a penultimate date that adjustment pushed onto the end.
        let n = dates.len();
        if n >= 3 && dates[n - 2] >= dates[n - 1] {
            is_regular[n - 3] = dates[n - 2] == dates[n - 1];
            dates.remove(n - 2);
            is_regular.remove(n - 2);
        }
        if dates.len() >= 3 && dates[1] <= dates[0] {
            is_regular[1] = dates[1] == dates[0];
            dates[1] = dates[0];
            dates.remove(0);
            is_regular.remove(0);
        }

        Ok(Schedule {
            dates,
            is_regular,
            calendar: cal,
            tenor: Some(self.tenor),
            convention: conv,
            termination_convention: self.termination_convention,
            end_of_month: eom,
        })
    }
}
