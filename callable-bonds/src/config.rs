//! Serde configuration for callable-bond valuations.
//!
//! Each section validates itself and builds the corresponding library
//! object. A [`ScenarioConfig`] bundles all sections and loads from TOML.

use cb_core::errors::{Error, Result};
use cb_core::{ensure, Rate, Real, Spread, Volatility};
use cb_instruments::{Callability, CallableFixedRateBond, FixedRateBond, PriceType};
use cb_termstructures::{FlatForward, YieldTermStructure};
use cb_time::{
    Actual360, Actual365Fixed, ActualActual, BusinessDayConvention, Calendar, Date, DateGeneration,
    DayCounter, NullCalendar, Period, ScheduleBuilder, Target, Thirty360, TimeUnit, WeekendsOnly,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Business-day calendar by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarKind {
    /// TARGET (euro settlement).
    Target,
    /// Saturdays and Sundays only.
    WeekendsOnly,
    /// Every day is a business day.
    Null,
}

impl CalendarKind {
    fn build(self) -> Arc<dyn Calendar> {
        match self {
            CalendarKind::Target => Arc::new(Target),
            CalendarKind::WeekendsOnly => Arc::new(WeekendsOnly),
            CalendarKind::Null => Arc::new(NullCalendar),
        }
    }
}

/// Day-count convention by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCounterKind {
    /// Actual/Actual (Bond).
    ActualActualBond,
    /// Actual/Actual (ISDA).
    ActualActualIsda,
    /// 30/360 bond basis.
    Thirty360,
    /// Actual/365 (Fixed).
    Actual365Fixed,
    /// Actual/360.
    Actual360,
}

impl DayCounterKind {
    fn build(self) -> Arc<dyn DayCounter> {
        match self {
            DayCounterKind::ActualActualBond => Arc::new(ActualActual::bond()),
            DayCounterKind::ActualActualIsda => Arc::new(ActualActual::isda()),
            DayCounterKind::Thirty360 => Arc::new(Thirty360),
            DayCounterKind::Actual365Fixed => Arc::new(Actual365Fixed),
            DayCounterKind::Actual360 => Arc::new(Actual360),
        }
    }
}

/// Business-day convention by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConventionKind {
    /// Next business day.
    Following,
    /// Next business day unless it falls in the next month.
    ModifiedFollowing,
    /// Previous business day.
    Preceding,
    /// No adjustment.
    Unadjusted,
}

impl From<ConventionKind> for BusinessDayConvention {
    fn from(kind: ConventionKind) -> Self {
        match kind {
            ConventionKind::Following => BusinessDayConvention::Following,
            ConventionKind::ModifiedFollowing => BusinessDayConvention::ModifiedFollowing,
            ConventionKind::Preceding => BusinessDayConvention::Preceding,
            ConventionKind::Unadjusted => BusinessDayConvention::Unadjusted,
        }
    }
}

/// Quoting convention of an exercise price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTypeConfig {
    /// Accrued interest is added on exercise.
    Clean,
    /// Price includes accrued interest.
    Dirty,
}

impl From<PriceTypeConfig> for PriceType {
    fn from(p: PriceTypeConfig) -> Self {
        match p {
            PriceTypeConfig::Clean => PriceType::Clean,
            PriceTypeConfig::Dirty => PriceType::Dirty,
        }
    }
}

/// Who may exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    /// Issuer call.
    #[default]
    Call,
    /// Holder put.
    Put,
}

/// One exercise right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallabilityConfig {
    /// Exercise date.
    pub date: NaiveDate,
    /// Exercise price per 100 of face.
    pub price: Real,
    /// Clean or dirty.
    pub price_type: PriceTypeConfig,
    /// Call (default) or put.
    #[serde(default)]
    pub kind: ExerciseKind,
}

impl CallabilityConfig {
    fn build(&self) -> Callability {
        let date = Date::from(self.date);
        match self.kind {
            ExerciseKind::Call => Callability::call(self.price, self.price_type.into(), date),
            ExerciseKind::Put => Callability::put(self.price, self.price_type.into(), date),
        }
    }
}

/// Evenly spaced exercise rights at a single price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicCallabilityConfig {
    /// First exercise date.
    pub first_date: NaiveDate,
    /// Number of exercise dates.
    pub count: usize,
    /// Months between exercise dates.
    pub tenor_months: i32,
    /// Exercise price per 100 of face.
    pub price: Real,
    /// Clean or dirty.
    pub price_type: PriceTypeConfig,
    /// Call (default) or put.
    #[serde(default)]
    pub kind: ExerciseKind,
}

impl PeriodicCallabilityConfig {
    /// The individual rights, each date advanced from the previous one
    /// without business-day adjustment.
    pub fn expand(&self) -> Result<Vec<CallabilityConfig>> {
        ensure!(self.tenor_months > 0, "call tenor must be positive, got {} months", self.tenor_months);
        let mut date = Date::from(self.first_date);
        let mut rights = Vec::with_capacity(self.count);
        for _ in 0..self.count {
            rights.push(CallabilityConfig {
                date: date.naive(),
                price: self.price,
                price_type: self.price_type,
                kind: self.kind,
            });
            date = date.advance(self.tenor_months, TimeUnit::Months)?;
        }
        Ok(rights)
    }
}

/// Terms of a callable fixed-rate bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallableBondConfig {
    /// Issue date; also the start of the coupon schedule.
    pub issue_date: NaiveDate,
    /// Unadjusted maturity date.
    pub maturity_date: NaiveDate,
    /// Business days between trade and settlement.
    #[serde(default = "default_settlement_days")]
    pub settlement_days: u32,
    /// Notional.
    #[serde(default = "default_hundred")]
    pub face_amount: Real,
    /// Redemption per 100 of face.
    #[serde(default = "default_hundred")]
    pub redemption: Real,
    /// Annual coupon rates; the last one extends to the remaining periods.
    pub coupon_rates: Vec<Rate>,
    /// Months between coupon dates.
    #[serde(default = "default_coupon_months")]
    pub coupon_tenor_months: i32,
    /// Schedule and settlement calendar.
    #[serde(default = "default_calendar")]
    pub calendar: CalendarKind,
    /// Coupon accrual day counter.
    #[serde(default = "default_day_counter")]
    pub day_counter: DayCounterKind,
    /// Adjustment of coupon accrual dates.
    #[serde(default = "default_convention")]
    pub accrual_convention: ConventionKind,
    /// Adjustment of payment dates.
    #[serde(default = "default_convention")]
    pub payment_convention: ConventionKind,
    /// Explicit exercise rights.
    #[serde(default)]
    pub callability: Vec<CallabilityConfig>,
    /// Evenly spaced exercise rights, merged with the explicit ones.
    #[serde(default)]
    pub periodic_callability: Option<PeriodicCallabilityConfig>,
}

fn default_settlement_days() -> u32 {
    2
}

fn default_hundred() -> Real {
    100.0
}

fn default_coupon_months() -> i32 {
    3
}

fn default_calendar() -> CalendarKind {
    CalendarKind::Target
}

fn default_day_counter() -> DayCounterKind {
    DayCounterKind::ActualActualBond
}

fn default_convention() -> ConventionKind {
    ConventionKind::Following
}

impl CallableBondConfig {
    /// Check the bond terms.
    ///
    /// # Errors
    /// `InvalidConfiguration` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.issue_date < self.maturity_date,
            "issue date {} must precede maturity {}",
            self.issue_date,
            self.maturity_date
        );
        ensure!(
            self.face_amount.is_finite() && self.face_amount > 0.0,
            "face amount must be positive, got {}",
            self.face_amount
        );
        ensure!(
            self.redemption.is_finite() && self.redemption > 0.0,
            "redemption must be positive, got {}",
            self.redemption
        );
        ensure!(!self.coupon_rates.is_empty(), "at least one coupon rate is required");
        ensure!(
            self.coupon_rates.iter().all(|r| r.is_finite()),
            "coupon rates must be finite"
        );
        ensure!(
            self.coupon_tenor_months > 0,
            "coupon tenor must be positive, got {} months",
            self.coupon_tenor_months
        );
        Ok(())
    }

    /// All exercise rights, ordered by date.
    pub fn callability_schedule(&self) -> Result<Vec<Callability>> {
        let mut rights = self.callability.clone();
        if let Some(periodic) = &self.periodic_callability {
            rights.extend(periodic.expand()?);
        }
        rights.sort_by_key(|c| c.date);
        Ok(rights.iter().map(CallabilityConfig::build).collect())
    }

    /// Build the bond.
    ///
    /// # Errors
    /// `InvalidConfiguration` from validation, the schedule, or the
    /// callability schedule.
    pub fn build(&self) -> Result<CallableFixedRateBond> {
        self.validate()?;
        let issue = Date::from(self.issue_date);
        let schedule = ScheduleBuilder::new(
            issue,
            Date::from(self.maturity_date),
            Period::new(self.coupon_tenor_months, TimeUnit::Months),
            self.calendar.build(),
        )
        .with_convention(self.accrual_convention.into())
        .with_termination_convention(self.accrual_convention.into())
        .with_rule(DateGeneration::Backward)
        .end_of_month(false)
        .build()?;

        let bond = FixedRateBond::new(
            self.settlement_days,
            self.face_amount,
            &schedule,
            self.coupon_rates.clone(),
            self.day_counter.build(),
            self.payment_convention.into(),
            self.redemption,
            Some(issue),
        )?;
        CallableFixedRateBond::new(bond, self.callability_schedule()?)
    }
}

/// Hull-White parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Mean-reversion speed `a`.
    pub reversion_speed: Real,
    /// Short-rate volatility `sigma`.
    pub volatility: Volatility,
}

impl ModelConfig {
    /// Check that both parameters are finite and positive.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.reversion_speed.is_finite() && self.reversion_speed > 0.0,
            "reversion speed must be positive, got {}",
            self.reversion_speed
        );
        ensure!(
            self.volatility.is_finite() && self.volatility > 0.0,
            "volatility must be positive, got {}",
            self.volatility
        );
        Ok(())
    }
}

/// Lattice settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum number of lattice steps.
    pub time_steps: usize,
    /// Spread over the fitted short rate.
    #[serde(default)]
    pub spread: Spread,
}

impl EngineConfig {
    /// Check that there is at least one step and the spread is finite.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.time_steps > 0, "time steps must be positive");
        ensure!(self.spread.is_finite(), "spread must be finite, got {}", self.spread);
        Ok(())
    }
}

/// A flat continuously-compounded curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    /// Valuation date.
    pub reference_date: NaiveDate,
    /// Continuously-compounded zero rate.
    pub rate: Rate,
    /// Curve day counter.
    #[serde(default = "default_day_counter")]
    pub day_counter: DayCounterKind,
}

impl CurveConfig {
    /// Build the curve.
    pub fn build(&self) -> Result<Arc<dyn YieldTermStructure>> {
        ensure!(self.rate.is_finite(), "curve rate must be finite, got {}", self.rate);
        Ok(Arc::new(FlatForward::continuous(
            Date::from(self.reference_date),
            self.rate,
            self.day_counter.build(),
        )))
    }
}

/// Everything needed for one valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Bond terms.
    pub bond: CallableBondConfig,
    /// Model parameters.
    pub model: ModelConfig,
    /// Lattice settings.
    pub engine: EngineConfig,
    /// Discount curve.
    pub curve: CurveConfig,
}

impl ScenarioConfig {
    /// Parse a scenario from TOML.
    ///
    /// # Errors
    /// `InvalidConfiguration` for malformed TOML or a failed validation.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let scenario: Self =
            toml::from_str(s).map_err(|e| Error::InvalidConfiguration(format!("invalid scenario: {e}")))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load a scenario from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfiguration(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.bond.validate()?;
        self.model.validate()?;
        self.engine.validate()
    }

    /// The callable-bond example: ten-year quarterly 5% bond issued
    /// 2019-02-25, callable quarterly at 102 clean, on a flat 2.75% curve.
    pub fn callable_bond_example() -> Result<Self> {
        let issue = Date::from_ymd(2019, 2, 25)?.naive();
        let maturity = Date::from_ymd(2029, 2, 25)?.naive();
        let first_call = Date::from_ymd(2019, 5, 27)?.naive();
        Ok(Self {
            bond: CallableBondConfig {
                issue_date: issue,
                maturity_date: maturity,
                settlement_days: 2,
                face_amount: 100.0,
                redemption: 100.0,
                coupon_rates: vec![0.05],
                coupon_tenor_months: 3,
                calendar: CalendarKind::Target,
                day_counter: DayCounterKind::ActualActualBond,
                accrual_convention: ConventionKind::Following,
                payment_convention: ConventionKind::Following,
                callability: Vec::new(),
                periodic_callability: Some(PeriodicCallabilityConfig {
                    first_date: first_call,
                    count: 38,
                    tenor_months: 3,
                    price: 102.0,
                    price_type: PriceTypeConfig::Clean,
                    kind: ExerciseKind::Call,
                }),
            },
            model: ModelConfig {
                reversion_speed: 0.03,
                volatility: 0.1,
            },
            engine: EngineConfig {
                time_steps: 100,
                spread: 0.0,
            },
            curve: CurveConfig {
                reference_date: issue,
                rate: 0.0275,
                day_counter: DayCounterKind::ActualActualBond,
            },
        })
    }
}
