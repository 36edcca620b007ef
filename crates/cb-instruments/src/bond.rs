//! Fixed-rate bond.
//!
//! A bond holds its cash flows (coupons followed by the redemption) and the
//! conventions needed to quote it: settlement lag, calendar, face amount.
//! Prices are quoted per 100 of face; amounts are in currency.

use crate::instrument::Instrument;
use cb_cashflows::{CashFlow, FixedRateLegBuilder, Leg, Redemption};
use cb_core::errors::Result;
use cb_core::{ensure, Compounding, Price, Rate, Real};
use cb_time::{BusinessDayConvention, Calendar, Date, DayCounter, Frequency, InterestRate, Schedule};
use std::sync::Arc;

/// Accuracy of yields backed out from prices.
const YIELD_ACCURACY: Real = 1e-10;

/// A bond paying fixed-rate coupons and a single redemption.
#[derive(Debug)]
pub struct FixedRateBond {
    settlement_days: u32,
    calendar: Arc<dyn Calendar>,
    face_amount: Real,
    issue_date: Date,
    maturity_date: Date,
    day_counter: Arc<dyn DayCounter>,
    frequency: Frequency,
    cashflows: Leg,
}

impl FixedRateBond {
    /// Create a fixed-rate bond.
    ///
    /// * `coupon_rates`: simple annual rates per period; the last one is
    ///   extended to the remaining periods
    /// * `redemption`: repaid at maturity, per 100 of face
    /// * `issue_date`: defaults to the first schedule date
    ///
    /// # Errors
    /// `InvalidConfiguration` for a non-positive face amount or redemption,
    /// a schedule with fewer than two dates, no coupon rate, or an issue
    /// date on or after maturity.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settlement_days: u32,
        face_amount: Real,
        schedule: &Schedule,
        coupon_rates: Vec<Rate>,
        day_counter: Arc<dyn DayCounter>,
        payment_convention: BusinessDayConvention,
        redemption: Real,
        issue_date: Option<Date>,
    ) -> Result<Self> {
        ensure!(
            face_amount.is_finite() && face_amount > 0.0,
            "face amount must be positive, got {face_amount}"
        );
        ensure!(
            redemption.is_finite() && redemption > 0.0,
            "redemption must be positive, got {redemption}"
        );
        ensure!(!coupon_rates.is_empty(), "at least one coupon rate is required");
        ensure!(
            schedule.size() >= 2,
            "the coupon schedule needs at least two dates, got {}",
            schedule.size()
        );

        let start = schedule.date(0);
        let maturity_date = schedule.date(schedule.size() - 1);
        let issue_date = issue_date.unwrap_or(start);
        ensure!(
            issue_date < maturity_date,
            "issue date {issue_date} must precede maturity {maturity_date}"
        );

        let mut cashflows = FixedRateLegBuilder::new(schedule)
            .with_notionals(vec![face_amount])
            .with_coupon_rates(coupon_rates)
            .with_compounding(Compounding::Simple)
            .with_frequency(Frequency::Annual)
            .with_day_counter(Arc::clone(&day_counter))
            .with_payment_convention(payment_convention)
            .build()?;
        let redemption_date = schedule.calendar().adjust(maturity_date, payment_convention);
        cashflows.push(Box::new(Redemption::new(
            face_amount * redemption / 100.0,
            redemption_date,
        )));

        Ok(Self {
            settlement_days,
            calendar: Arc::clone(schedule.calendar()),
            face_amount,
            issue_date,
            maturity_date,
            day_counter,
            frequency: schedule
                .tenor()
                .and_then(|p| p.months())
                .and_then(|m| u32::try_from(m).ok())
                .map_or(Frequency::NoFrequency, frequency_of_months),
            cashflows,
        })
    }

    /// Business days between trade and settlement.
    pub fn settlement_days(&self) -> u32 {
        self.settlement_days
    }

    /// The settlement calendar.
    pub fn calendar(&self) -> &Arc<dyn Calendar> {
        &self.calendar
    }

    /// Notional (face) amount.
    pub fn face_amount(&self) -> Real {
        self.face_amount
    }

    /// Issue date.
    pub fn issue_date(&self) -> Date {
        self.issue_date
    }

    /// The coupon accrual day counter.
    pub fn day_counter(&self) -> &Arc<dyn DayCounter> {
        &self.day_counter
    }

    /// Coupon frequency, when the schedule was generated from a tenor.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// All cash flows: coupons in payment order, then the redemption.
    pub fn cashflows(&self) -> &Leg {
        &self.cashflows
    }

    /// The redemption flow.
    pub fn redemption(&self) -> &dyn CashFlow {
        // `new` always pushes the redemption last.
        self.cashflows[self.cashflows.len() - 1].as_ref()
    }

    /// Settlement date for a trade on `trade_date`: the settlement lag in
    /// business days, never before issue.
    pub fn settlement_date(&self, trade_date: Date) -> Date {
        self.calendar
            .advance_business_days(trade_date, self.settlement_days as i32)
            .max(self.issue_date)
    }

    /// Interest accrued at `settlement`, in currency.
    pub fn accrued_amount(&self, settlement: Date) -> Real {
        cb_cashflows::accrued_amount(&self.cashflows, settlement)
    }

    /// Clean price from a dirty price.
    pub fn clean_price_from_dirty(&self, dirty_price: Price, settlement: Date) -> Price {
        dirty_price - self.accrued_amount(settlement) / self.face_amount * 100.0
    }

    /// Dirty price from a clean price.
    pub fn dirty_price_from_clean(&self, clean_price: Price, settlement: Date) -> Price {
        clean_price + self.accrued_amount(settlement) / self.face_amount * 100.0
    }

    /// Dirty price at a flat yield.
    pub fn dirty_price_at_yield(&self, y: &InterestRate, settlement: Date) -> Result<Price> {
        let npv = cb_cashflows::npv_at_yield(&self.cashflows, y, settlement)?;
        Ok(npv / self.face_amount * 100.0)
    }

    /// Clean price at a flat yield.
    pub fn clean_price_at_yield(&self, y: &InterestRate, settlement: Date) -> Result<Price> {
        let dirty = self.dirty_price_at_yield(y, settlement)?;
        Ok(self.clean_price_from_dirty(dirty, settlement))
    }

    /// Yield to maturity implied by a clean price.
    ///
    /// # Errors
    /// `Runtime` if no yield reproduces the price.
    pub fn yield_to_maturity(
        &self,
        clean_price: Price,
        dc: Arc<dyn DayCounter>,
        compounding: Compounding,
        frequency: Frequency,
        settlement: Date,
    ) -> Result<Rate> {
        let dirty_price = self.dirty_price_from_clean(clean_price, settlement);
        let target_npv = dirty_price / 100.0 * self.face_amount;
        cb_cashflows::yield_rate(
            &self.cashflows,
            target_npv,
            dc,
            compounding,
            frequency,
            settlement,
            YIELD_ACCURACY,
            0.05,
        )
    }
}

fn frequency_of_months(months: u32) -> Frequency {
    match months {
        12 => Frequency::Annual,
        6 => Frequency::Semiannual,
        4 => Frequency::EveryFourthMonth,
        3 => Frequency::Quarterly,
        2 => Frequency::Bimonthly,
        1 => Frequency::Monthly,
        _ => Frequency::NoFrequency,
    }
}

impl Instrument for FixedRateBond {
    fn is_expired(&self, ref_date: Date) -> bool {
        self.cashflows.iter().all(|cf| cf.has_occurred(ref_date, true))
    }

    fn maturity_date(&self) -> Date {
        self.maturity_date
    }
}
