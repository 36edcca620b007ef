//! A callable fixed-rate bond as seen by a short-rate lattice.
//!
//! Dates are turned into curve times once, at construction. Attaching the
//! asset to a grid binds every coupon and exercise right to its grid index;
//! rollback then only looks events up by step.

use cb_cashflows::CashFlow;
use cb_core::errors::Result;
use cb_core::{Real, Time};
use cb_instruments::{CallabilityType, CallableFixedRateBond};
use cb_methods::{DiscretizedAsset, TimeGrid};
use cb_termstructures::{TermStructure, YieldTermStructure};
use cb_time::Date;

/// Something that changes the holder's value at a grid time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BondEvent {
    /// Issuer call: the holder's value is capped at `strike`.
    Call {
        /// Exercise amount in currency.
        strike: Real,
    },
    /// Holder put: the holder's value is floored at `strike`.
    Put {
        /// Exercise amount in currency.
        strike: Real,
    },
    /// Coupon paid to the holder.
    Coupon {
        /// Coupon amount in currency.
        amount: Real,
    },
}

impl BondEvent {
    fn is_exercise(&self) -> bool {
        !matches!(self, BondEvent::Coupon { .. })
    }

    /// Exercise rights act on the continuation value; the coupon of the
    /// same date is paid on top.
    fn apply(&self, values: &mut [Real]) {
        match *self {
            BondEvent::Call { strike } => values.iter_mut().for_each(|v| *v = v.min(strike)),
            BondEvent::Put { strike } => values.iter_mut().for_each(|v| *v = v.max(strike)),
            BondEvent::Coupon { amount } => values.iter_mut().for_each(|v| *v += amount),
        }
    }
}

/// Callable fixed-rate bond on a lattice.
#[derive(Debug, Clone)]
pub struct DiscretizedCallableFixedRateBond {
    redemption_time: Time,
    redemption_amount: Real,
    /// Unbound events, exercises before coupons at equal times.
    events: Vec<(Time, BondEvent)>,
    /// Events per grid index, filled by `attach`.
    bound: Vec<Vec<BondEvent>>,
    terminal_step: Option<usize>,
}

impl DiscretizedCallableFixedRateBond {
    /// Discretize the flows of `bond` still to be paid after `settlement`,
    /// measuring times on `curve`.
    pub fn new(bond: &CallableFixedRateBond, curve: &dyn YieldTermStructure, settlement: Date) -> Self {
        let straight = bond.bond();
        let redemption = straight.redemption();

        let mut events: Vec<(Time, BondEvent)> = bond
            .callability()
            .iter()
            .filter(|c| c.date() > settlement)
            .map(|c| {
                let strike = bond.exercise_amount(c);
                let event = match c.kind() {
                    CallabilityType::Call => BondEvent::Call { strike },
                    CallabilityType::Put => BondEvent::Put { strike },
                };
                (curve.time_from_reference(c.date()), event)
            })
            .collect();

        events.extend(
            straight
                .cashflows()
                .iter()
                .filter(|cf| cf.as_coupon().is_some() && !cf.has_occurred(settlement, false))
                .map(|cf| {
                    (
                        curve.time_from_reference(cf.date()),
                        BondEvent::Coupon { amount: cf.amount() },
                    )
                }),
        );
        events.retain(|(t, _)| *t >= 0.0);
        // Stable: keeps exercise rights ahead of the coupon on the same date.
        events.sort_by(|a, b| a.0.total_cmp(&b.0).then(b.1.is_exercise().cmp(&a.1.is_exercise())));

        Self {
            redemption_time: curve.time_from_reference(redemption.date()),
            redemption_amount: redemption.amount(),
            events,
            bound: Vec::new(),
            terminal_step: None,
        }
    }

    /// The same bond without its exercise rights.
    pub fn without_options(&self) -> Self {
        Self {
            redemption_time: self.redemption_time,
            redemption_amount: self.redemption_amount,
            events: self.events.iter().filter(|(_, e)| !e.is_exercise()).copied().collect(),
            bound: Vec::new(),
            terminal_step: None,
        }
    }

    /// Time of the redemption payment.
    pub fn redemption_time(&self) -> Time {
        self.redemption_time
    }

    /// Events with their times, in the order they are applied.
    pub fn events(&self) -> &[(Time, BondEvent)] {
        &self.events
    }
}

impl DiscretizedAsset for DiscretizedCallableFixedRateBond {
    fn mandatory_times(&self) -> Vec<Time> {
        let mut times: Vec<Time> = self.events.iter().map(|(t, _)| *t).collect();
        times.push(self.redemption_time);
        times
    }

    fn attach(&mut self, grid: &TimeGrid) -> Result<()> {
        let mut bound = vec![Vec::new(); grid.size()];
        for (t, event) in &self.events {
            bound[grid.index(*t)?].push(*event);
        }
        self.terminal_step = Some(grid.index(self.redemption_time)?);
        self.bound = bound;
        Ok(())
    }

    fn terminal_step(&self) -> Option<usize> {
        self.terminal_step
    }

    fn initialize(&self, values: &mut [Real]) {
        values.fill(self.redemption_amount);
    }

    fn adjust_values(&self, step: usize, values: &mut [Real]) {
        if let Some(events) = self.bound.get(step) {
            for event in events {
                event.apply(values);
            }
        }
    }
}
