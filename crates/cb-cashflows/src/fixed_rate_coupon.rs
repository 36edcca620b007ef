//! Fixed-rate coupons and leg builders.

use crate::cashflow::{CashFlow, Leg};
use crate::coupon::Coupon;
use cb_core::errors::Result;
use cb_core::{ensure, Compounding, Rate, Real, Time};
use cb_time::{
    Actual365Fixed, BusinessDayConvention, Calendar, Date, DayCounter, Frequency, InterestRate,
    Schedule,
};
use std::sync::Arc;

/// A coupon paying a fixed interest rate.
#[derive(Debug, Clone)]
pub struct FixedRateCoupon {
    nominal: Real,
    payment_date: Date,
    rate: InterestRate,
    accrual_start: Date,
    accrual_end: Date,
    /// Reference period (for irregular first/last coupons).
    ref_start: Date,
    ref_end: Date,
    accrual_period: Time,
    amount: Real,
}

impl FixedRateCoupon {
    /// Create a new fixed-rate coupon.
    ///
    /// The amount is `nominal · (compound factor over the accrual period − 1)`
    /// with the period measured by the rate's day counter against the
    /// reference period.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the accrual period ends before it starts.
    pub fn new(
        payment_date: Date,
        nominal: Real,
        rate: InterestRate,
        accrual_start: Date,
        accrual_end: Date,
        ref_start: Date,
        ref_end: Date,
    ) -> Result<Self> {
        ensure!(
            accrual_end >= accrual_start,
            "accrual end {accrual_end} precedes accrual start {accrual_start}"
        );
        let accrual_period = rate
            .day_counter()
            .year_fraction_with_ref(accrual_start, accrual_end, ref_start, ref_end);
        let amount = nominal * (rate.compound_factor_time(accrual_period)? - 1.0);
        Ok(Self {
            nominal,
            payment_date,
            rate,
            accrual_start,
            accrual_end,
            ref_start,
            ref_end,
            accrual_period,
            amount,
        })
    }

    /// The coupon's `InterestRate`.
    pub fn interest_rate(&self) -> &InterestRate {
        &self.rate
    }
}

impl CashFlow for FixedRateCoupon {
    fn date(&self) -> Date {
        self.payment_date
    }

    fn amount(&self) -> Real {
        self.amount
    }

    fn as_coupon(&self) -> Option<&dyn Coupon> {
        Some(self)
    }
}

impl Coupon for FixedRateCoupon {
    fn nominal(&self) -> Real {
        self.nominal
    }

    fn accrual_start_date(&self) -> Date {
        self.accrual_start
    }

    fn accrual_end_date(&self) -> Date {
        self.accrual_end
    }

    fn reference_period_start(&self) -> Date {
        self.ref_start
    }

    fn reference_period_end(&self) -> Date {
        self.ref_end
    }

    fn accrual_period(&self) -> Time {
        self.accrual_period
    }

    fn day_counter(&self) -> &dyn DayCounter {
        self.rate.day_counter().as_ref()
    }

    fn rate(&self) -> Rate {
        self.rate.rate()
    }

    fn accrued_amount(&self, date: Date) -> Real {
        if date <= self.accrual_start || date > self.payment_date {
            return 0.0;
        }
        let t = self.rate.day_counter().year_fraction_with_ref(
            self.accrual_start,
            date.min(self.accrual_end),
            self.ref_start,
            self.ref_end,
        );
        self.rate
            .compound_factor_time(t)
            .map_or(0.0, |factor| self.nominal * (factor - 1.0))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixed-rate leg builder
// ────────────────────────────────────────────────────────────────────────────

/// Build a fixed-rate leg from a schedule and rate.
///
/// Payment dates are the period ends adjusted on the schedule's calendar.
/// Irregular first and last periods get a notional reference period of one
/// tenor ending (first) or starting (last) at the regular schedule date.
pub struct FixedRateLegBuilder<'a> {
    schedule: &'a Schedule,
    notionals: Vec<Real>,
    coupon_rates: Vec<Rate>,
    compounding: Compounding,
    frequency: Frequency,
    day_counter: Arc<dyn DayCounter>,
    payment_convention: BusinessDayConvention,
}

impl<'a> FixedRateLegBuilder<'a> {
    /// Create a new builder from a schedule.
    pub fn new(schedule: &'a Schedule) -> Self {
        Self {
            schedule,
            notionals: vec![100.0],
            coupon_rates: Vec::new(),
            compounding: Compounding::Simple,
            frequency: Frequency::Annual,
            day_counter: Arc::new(Actual365Fixed),
            payment_convention: BusinessDayConvention::Following,
        }
    }

    /// Set the notional(s). The last value is extended for all remaining periods.
    pub fn with_notionals(mut self, notionals: Vec<Real>) -> Self {
        self.notionals = notionals;
        self
    }

    /// Set a single coupon rate for all periods.
    pub fn with_coupon_rate(mut self, rate: Rate) -> Self {
        self.coupon_rates = vec![rate];
        self
    }

    /// Set coupon rates per period. The last value is extended for all
    /// remaining periods.
    pub fn with_coupon_rates(mut self, rates: Vec<Rate>) -> Self {
        self.coupon_rates = rates;
        self
    }

    /// Set the compounding convention of the coupon rates.
    pub fn with_compounding(mut self, compounding: Compounding) -> Self {
        self.compounding = compounding;
        self
    }

    /// Set the compounding frequency of the coupon rates.
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set the accrual day counter.
    pub fn with_day_counter(mut self, dc: Arc<dyn DayCounter>) -> Self {
        self.day_counter = dc;
        self
    }

    /// Set the payment business day convention.
    pub fn with_payment_convention(mut self, convention: BusinessDayConvention) -> Self {
        self.payment_convention = convention;
        self
    }

    /// Build the leg.
    ///
    /// # Errors
    /// `InvalidConfiguration` for a schedule with fewer than two dates or
    /// missing notionals or rates.
    pub fn build(self) -> Result<Leg> {
        let schedule = self.schedule;
        ensure!(
            schedule.size() >= 2,
            "a coupon schedule needs at least two dates, got {}",
            schedule.size()
        );
        ensure!(!self.notionals.is_empty(), "no notional given");
        ensure!(!self.coupon_rates.is_empty(), "no coupon rate given");

        let calendar = schedule.calendar();
        let n = schedule.size() - 1;
        let mut leg: Leg = Vec::with_capacity(n);

        for i in 0..n {
            let start = schedule.date(i);
            let end = schedule.date(i + 1);
            let payment = calendar.adjust(end, self.payment_convention);

            let (mut ref_start, mut ref_end) = (start, end);
            if let (false, Some(tenor)) = (schedule.is_regular(i), schedule.tenor()) {
                if i + 1 == n && n > 1 {
                    ref_end = calendar.adjust(start.advance_by(tenor)?, schedule.convention());
                } else {
                    ref_start = calendar.adjust(end.advance_by(-tenor)?, schedule.convention());
                }
            }

            let notional = self.notionals[i.min(self.notionals.len() - 1)];
            let coupon_rate = self.coupon_rates[i.min(self.coupon_rates.len() - 1)];
            let rate = InterestRate::new(
                coupon_rate,
                Arc::clone(&self.day_counter),
                self.compounding,
                self.frequency,
            )?;

            leg.push(Box::new(FixedRateCoupon::new(
                payment, notional, rate, start, end, ref_start, ref_end,
            )?));
        }

        Ok(leg)
    }
}
