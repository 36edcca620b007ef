//! Recombining trinomial tree for additive-noise processes.
//!
//! The variance of the process over a step must not depend on the state, as
//! for the Ornstein-Uhlenbeck state variable of the Hull-White model. Nodes
//! at step `i` sit at `x0 + j·dx[i]` for a contiguous range of integers `j`.

use cb_core::errors::{Error, Result};
use cb_core::Real;
use cb_processes::StochasticProcess1D;

use super::TimeGrid;

/// Branch probabilities may overshoot `[0, 1]` by this much before the tree
/// is rejected.
const PROBABILITY_TOLERANCE: Real = 1e-12;

/// Branching data for a single time step of the trinomial tree.
#[derive(Debug, Clone)]
struct Branching {
    /// Centre successor of each node, as an absolute level at the next step.
    k: Vec<i64>,
    /// Probabilities for each branch (0=down, 1=mid, 2=up) for each node.
    probs: [Vec<Real>; 3],
    /// Lowest and highest level reachable at the next step.
    j_min: i64,
    j_max: i64,
}

impl Branching {
    fn with_capacity(nodes: usize) -> Self {
        Self {
            k: Vec::with_capacity(nodes),
            probs: [
                Vec::with_capacity(nodes),
                Vec::with_capacity(nodes),
                Vec::with_capacity(nodes),
            ],
            j_min: i64::MAX,
            j_max: i64::MIN,
        }
    }

    fn add(&mut self, k: i64, p_down: Real, p_mid: Real, p_up: Real) {
        self.k.push(k);
        self.probs[0].push(p_down);
        self.probs[1].push(p_mid);
        self.probs[2].push(p_up);
        self.j_min = self.j_min.min(k - 1);
        self.j_max = self.j_max.max(k + 1);
    }

    /// Number of nodes at the next time step.
    fn size(&self) -> usize {
        (self.j_max - self.j_min + 1) as usize
    }

    fn descendant(&self, index: usize, branch: usize) -> usize {
        (self.k[index] - self.j_min - 1 + branch as i64) as usize
    }

    fn probability(&self, index: usize, branch: usize) -> Real {
        self.probs[branch][index]
    }
}

/// A recombining trinomial tree approximating a 1-D process on a time grid.
///
/// The spacing at step `i+1` is `dx = √(3·Var_i)`, so the middle branch of
/// a node lands within half a spacing of the conditional mean.
#[derive(Debug, Clone)]
pub struct TrinomialTree {
    x0: Real,
    /// dx at each step; `dx[0] = 0` for the root.
    dx: Vec<Real>,
    branchings: Vec<Branching>,
    time_grid: TimeGrid,
}

impl TrinomialTree {
    /// Build the tree of `process` on `grid`.
    ///
    /// # Errors
    /// `LatticeInstability` when a step variance is not finite and positive
    /// or a branch probability falls outside `[0, 1]`.
    pub fn new(process: &dyn StochasticProcess1D, grid: &TimeGrid) -> Result<Self> {
        let x0 = process.x0();
        let n = grid.steps();
        let sqrt3 = 3.0_f64.sqrt();

        let mut dx: Vec<Real> = Vec::with_capacity(n + 1);
        dx.push(0.0);
        let mut branchings: Vec<Branching> = Vec::with_capacity(n);
        let (mut j_min, mut j_max) = (0_i64, 0_i64);

        for i in 0..n {
            let t = grid.time(i);
            let dt = grid.dt(i);

            // Additive noise: the variance is the same at every node.
            let v2 = process.variance(t, x0, dt);
            if !v2.is_finite() || v2 <= 0.0 {
                return Err(Error::LatticeInstability {
                    step: i,
                    node: 0,
                    reason: format!("step variance {v2} is not positive"),
                });
            }
            let v = v2.sqrt();
            let dx_next = v * sqrt3;
            dx.push(dx_next);

            let mut branching = Branching::with_capacity((j_max - j_min + 1) as usize);
            for (node, j) in (j_min..=j_max).enumerate() {
                let x = x0 + j as Real * dx[i];
                let m = process.expectation(t, x, dt);
                let k = ((m - x0) / dx_next + 0.5).floor() as i64;
                let e = m - (x0 + k as Real * dx_next);
                let e2 = e * e;
                let e3 = e * sqrt3;

                let p_down = (1.0 + e2 / v2 - e3 / v) / 6.0;
                let p_mid = (2.0 - e2 / v2) / 3.0;
                let p_up = (1.0 + e2 / v2 + e3 / v) / 6.0;
                check_probabilities(i, node, [p_down, p_mid, p_up])?;

                branching.add(k, p_down, p_mid, p_up);
            }

            j_min = branching.j_min;
            j_max = branching.j_max;
            branchings.push(branching);
        }

        tracing::debug!(
            steps = n,
            max_width = branchings.iter().map(Branching::size).max().unwrap_or(1),
            "trinomial tree built"
        );

        Ok(Self {
            x0,
            dx,
            branchings,
            time_grid: grid.clone(),
        })
    }

    /// Number of time steps.
    pub fn steps(&self) -> usize {
        self.time_grid.steps()
    }

    /// The grid the tree was built on.
    pub fn time_grid(&self) -> &TimeGrid {
        &self.time_grid
    }

    /// Node spacing at time step `i`.
    pub fn dx(&self, i: usize) -> Real {
        self.dx[i]
    }

    /// Number of nodes at time step `i`.
    pub fn size(&self, i: usize) -> usize {
        if i == 0 {
            1
        } else {
            self.branchings[i - 1].size()
        }
    }

    /// State value at node `(i, index)`.
    pub fn underlying(&self, i: usize, index: usize) -> Real {
        if i == 0 {
            self.x0
        } else {
            let j_min = self.branchings[i - 1].j_min;
            self.x0 + (j_min + index as i64) as Real * self.dx[i]
        }
    }

    /// Index at step `i+1` reached from node `(i, index)` along `branch`
    /// (0=down, 1=mid, 2=up).
    pub fn descendant(&self, i: usize, index: usize, branch: usize) -> usize {
        self.branchings[i].descendant(index, branch)
    }

    /// Transition probability from node `(i, index)` along `branch`.
    pub fn probability(&self, i: usize, index: usize, branch: usize) -> Real {
        self.branchings[i].probability(index, branch)
    }
}

fn check_probabilities(step: usize, node: usize, probs: [Real; 3]) -> Result<()> {
    const NAMES: [&str; 3] = ["p_down", "p_mid", "p_up"];
    for (name, p) in NAMES.iter().zip(probs) {
        if !p.is_finite() || !(-PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE).contains(&p) {
            return Err(Error::LatticeInstability {
                step,
                node,
                reason: format!("{name} = {p} is outside [0, 1]"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cb_processes::OrnsteinUhlenbeckProcess;

    fn hull_white_state(a: Real, sigma: Real) -> OrnsteinUhlenbeckProcess {
        OrnsteinUhlenbeckProcess::new(a, sigma, 0.0, 0.0).unwrap()
    }

    #[test]
    fn width_grows_then_saturates() {
        let process = hull_white_state(0.5, 0.01);
        let grid = TimeGrid::uniform(30.0, 300).unwrap();
        let tree = TrinomialTree::new(&process, &grid).unwrap();
        assert_eq!(tree.size(0), 1);
        for i in 0..tree.steps() {
            assert!(tree.size(i + 1) <= tree.size(i) + 2);
        }
        let last = tree.size(tree.steps());
        assert!(last < 2 * tree.steps() + 1, "no saturation: width {last}");
        assert_eq!(tree.size(tree.steps() - 1), last);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let process = hull_white_state(0.03, 0.1);
        let grid = TimeGrid::uniform(10.0, 100).unwrap();
        let tree = TrinomialTree::new(&process, &grid).unwrap();
        for i in 0..tree.steps() {
            for j in 0..tree.size(i) {
                let sum: Real = (0..3).map(|b| tree.probability(i, j, b)).sum();
                assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn tree_matches_step_mean_and_variance() {
        let process = hull_white_state(0.1, 0.01);
        let grid = TimeGrid::uniform(5.0, 50).unwrap();
        let tree = TrinomialTree::new(&process, &grid).unwrap();
        for i in [0, 10, 49] {
            let (t, dt) = (grid.time(i), grid.dt(i));
            for j in 0..tree.size(i) {
                let x = tree.underlying(i, j);
                let (mut mean, mut second) = (0.0, 0.0);
                for b in 0..3 {
                    let y = tree.underlying(i + 1, tree.descendant(i, j, b));
                    let p = tree.probability(i, j, b);
                    mean += p * y;
                    second += p * y * y;
                }
                let m = process.expectation(t, x, dt);
                assert_abs_diff_eq!(mean, m, epsilon = 1e-12);
                assert_abs_diff_eq!(second - mean * mean, process.variance(t, x, dt), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn root_is_the_initial_state() {
        let process = OrnsteinUhlenbeckProcess::new(0.1, 0.01, 0.02, 0.02).unwrap();
        let grid = TimeGrid::uniform(1.0, 4).unwrap();
        let tree = TrinomialTree::new(&process, &grid).unwrap();
        assert_eq!(tree.underlying(0, 0), 0.02);
        assert_eq!(tree.size(1), 3);
        assert_abs_diff_eq!(tree.underlying(1, 1), 0.02, epsilon = 1e-15);
        assert_abs_diff_eq!(tree.dx(1), (3.0 * process.variance(0.0, 0.02, 0.25)).sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn zero_volatility_is_rejected() {
        #[derive(Debug)]
        struct Frozen;
        impl StochasticProcess1D for Frozen {
            fn x0(&self) -> Real {
                0.0
            }
            fn drift(&self, _t: Real, _x: Real) -> Real {
                0.0
            }
            fn diffusion(&self, _t: Real, _x: Real) -> Real {
                0.0
            }
        }
        let grid = TimeGrid::uniform(1.0, 4).unwrap();
        assert!(matches!(
            TrinomialTree::new(&Frozen, &grid),
            Err(Error::LatticeInstability { step: 0, .. })
        ));
    }

    #[test]
    fn non_finite_expectation_is_rejected() {
        #[derive(Debug)]
        struct Exploding;
        impl StochasticProcess1D for Exploding {
            fn x0(&self) -> Real {
                0.0
            }
            fn drift(&self, t: Real, _x: Real) -> Real {
                if t > 0.5 {
                    Real::INFINITY
                } else {
                    0.0
                }
            }
            fn diffusion(&self, _t: Real, _x: Real) -> Real {
                0.01
            }
        }
        let grid = TimeGrid::uniform(1.0, 4).unwrap();
        assert!(matches!(
            TrinomialTree::new(&Exploding, &grid),
            Err(Error::LatticeInstability { step: 3, node: 0, .. })
        ));
    }
}
