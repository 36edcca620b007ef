//! Lattice methods for short-rate pricing.
//!
//! # Overview
//!
//! * [`TimeGrid`]: valuation times merged from an asset's mandatory times
//! * [`TrinomialTree`]: recombining trinomial branching of a 1-D process
//! * [`ShortRateTree`]: a trinomial tree shifted to fit a discount curve,
//!   with backward induction
//! * [`DiscretizedAsset`]: what an asset exposes to the rollback

pub mod discretized_asset;
pub mod short_rate_tree;
pub mod trinomial_tree;

pub use discretized_asset::{DiscretizedAsset, DiscretizedDiscountBond};
pub use short_rate_tree::ShortRateTree;
pub use trinomial_tree::TrinomialTree;

use cb_core::errors::{Error, Result};
use cb_core::{ensure, Time};

/// Two times closer than this are the same grid point.
pub const TIME_TOLERANCE: Time = 1e-10;

// ─── TimeGrid ─────────────────────────────────────────────────────────────────

/// A strictly increasing grid of times starting at 0.
///
/// Every mandatory time is kept bit-for-bit; the intervals between
/// consecutive mandatory times are split evenly so that no step exceeds
/// `end / steps`.
#[derive(Debug, Clone)]
pub struct TimeGrid {
    times: Vec<Time>,
    dts: Vec<Time>,
    mandatory: Vec<Time>,
}

impl TimeGrid {
    /// Create a uniform time grid from 0 to `end` with `steps` intervals.
    pub fn uniform(end: Time, steps: usize) -> Result<Self> {
        Self::new(&[end], steps)
    }

    /// Build a grid containing `mandatory` with at least `steps` intervals.
    ///
    /// # Errors
    /// `InvalidConfiguration` for an empty list, a negative or non-finite
    /// time, `steps == 0`, or a last time that is not positive.
    pub fn new(mandatory: &[Time], steps: usize) -> Result<Self> {
        ensure!(steps > 0, "time steps must be positive");
        ensure!(!mandatory.is_empty(), "at least one mandatory time is required");
        if let Some(&t) = mandatory.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "mandatory times must be finite and non-negative, got {t}"
            )));
        }

        let mut points = Vec::with_capacity(mandatory.len() + 1);
        points.push(0.0);
        points.extend_from_slice(mandatory);
        points.sort_by(Time::total_cmp);
        points.dedup_by(|later, earlier| *later - *earlier < TIME_TOLERANCE);

        let end = points[points.len() - 1];
        ensure!(end > 0.0, "time grid horizon must be positive, got {end}");

        let dt_max = end / steps as Time;
        let mut times = Vec::with_capacity(steps + points.len());
        times.push(points[0]);
        for pair in points.windows(2) {
            let (start, stop) = (pair[0], pair[1]);
            let length = stop - start;
            let n = ((length / dt_max - 1e-9).ceil() as usize).max(1);
            let dt = length / n as Time;
            times.extend((1..n).map(|k| start + k as Time * dt));
            times.push(stop);
        }

        let dts = times.windows(2).map(|w| w[1] - w[0]).collect();
        // The dedup keeps the earliest of a cluster; drop the synthetic 0
        // unless it was asked for.
        let mandatory = points
            .into_iter()
            .filter(|&t| t > 0.0 || mandatory.iter().any(|&m| m < TIME_TOLERANCE))
            .collect();
        Ok(Self {
            times,
            dts,
            mandatory,
        })
    }

    /// Number of time points (= steps + 1).
    pub fn size(&self) -> usize {
        self.times.len()
    }

    /// Number of steps (= time points − 1).
    pub fn steps(&self) -> usize {
        self.times.len() - 1
    }

    /// Time at index `i`.
    pub fn time(&self, i: usize) -> Time {
        self.times[i]
    }

    /// Time step between index `i` and `i+1`.
    pub fn dt(&self, i: usize) -> Time {
        self.dts[i]
    }

    /// Final time.
    pub fn end(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// All time points.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The de-duplicated mandatory times the grid was built from.
    pub fn mandatory_times(&self) -> &[Time] {
        &self.mandatory
    }

    /// Largest step size.
    pub fn max_dt(&self) -> Time {
        self.dts.iter().copied().fold(0.0, Time::max)
    }

    /// Index of the grid point at `t`.
    ///
    /// # Errors
    /// `Runtime` if no grid point lies within [`TIME_TOLERANCE`] of `t`.
    pub fn index(&self, t: Time) -> Result<usize> {
        let i = self.times.partition_point(|&x| x < t);
        let candidates = [i.checked_sub(1), Some(i)];
        candidates
            .into_iter()
            .flatten()
            .filter(|&j| j < self.times.len())
            .find(|&j| (self.times[j] - t).abs() < TIME_TOLERANCE)
            .ok_or_else(|| {
                Error::Runtime(format!(
                    "time {t} is not on the grid [{}, {}]",
                    self.times[0],
                    self.end()
                ))
            })
    }
}

impl std::ops::Index<usize> for TimeGrid {
    type Output = Time;

    fn index(&self, i: usize) -> &Time {
        &self.times[i]
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn time_grid_uniform() {
        let g = TimeGrid::uniform(1.0, 4).unwrap();
        assert_eq!(g.size(), 5);
        assert_eq!(g.steps(), 4);
        assert_eq!(g.time(0), 0.0);
        assert_eq!(g.end(), 1.0);
        assert_abs_diff_eq!(g.dt(0), 0.25, epsilon = 1e-15);
    }

    #[test]
    fn time_grid_keeps_mandatory_times_exactly() {
        let mandatory = [0.3, 1.0, 0.75, 0.3];
        let g = TimeGrid::new(&mandatory, 10).unwrap();
        assert!(g.steps() >= 10);
        for t in [0.3, 0.75, 1.0] {
            assert_eq!(g.times().iter().filter(|&&x| x == t).count(), 1);
            assert_eq!(g.time(g.index(t).unwrap()), t);
        }
        assert_eq!(g.mandatory_times(), &[0.3, 0.75, 1.0]);
        assert!(g.max_dt() <= 0.1 + 1e-12);
    }

    #[test]
    fn time_grid_splits_each_interval() {
        // [0, 0.25] needs 3 steps of at most 0.1, [0.25, 1.0] needs 8
        let g = TimeGrid::new(&[0.25, 1.0], 10).unwrap();
        assert_eq!(g.steps(), 11);
        assert_abs_diff_eq!(g.dt(0), 0.25 / 3.0, epsilon = 1e-15);
        assert_abs_diff_eq!(g.dt(10), 0.75 / 8.0, epsilon = 1e-15);
    }

    #[test]
    fn time_grid_merges_close_times() {
        let g = TimeGrid::new(&[0.5, 0.5 + 1e-12, 1.0], 2).unwrap();
        assert_eq!(g.times(), &[0.0, 0.5, 1.0]);
        assert_eq!(g.index(0.5 + 1e-12).unwrap(), 1);
    }

    #[test]
    fn time_grid_rejects_bad_input() {
        assert!(matches!(
            TimeGrid::new(&[1.0], 0),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            TimeGrid::new(&[], 10),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            TimeGrid::new(&[-0.5, 1.0], 10),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            TimeGrid::new(&[0.0], 10),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(TimeGrid::new(&[f64::NAN], 10).is_err());
    }

    #[test]
    fn index_of_missing_time_is_an_error() {
        let g = TimeGrid::uniform(1.0, 4).unwrap();
        assert_eq!(g.index(0.0).unwrap(), 0);
        assert_eq!(g.index(1.0).unwrap(), 4);
        assert!(g.index(0.3).is_err());
        assert!(g.index(2.0).is_err());
    }
}
