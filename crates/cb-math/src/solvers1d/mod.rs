//! 1D root-finding solvers.
//!
//! Objectives are fallible: pricing a bond at a trial spread can itself fail,
//! and such failures abort the search instead of being treated as a value.

use cb_core::{
    errors::{Error, Result},
    fail, Real,
};

const MAX_ITERATIONS: u32 = 100;
const DEFAULT_ACCURACY: Real = 1.0e-11;
const GROWTH_FACTOR: Real = 1.6;

/// Optional hard limits on the search domain.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    /// Lowest admissible abscissa.
    pub lower: Option<Real>,
    /// Highest admissible abscissa.
    pub upper: Option<Real>,
}

impl Bounds {
    /// Both limits set.
    pub fn new(lower: Real, upper: Real) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    fn enforce(&self, x: Real) -> Real {
        let x = self.lower.map_or(x, |l| x.max(l));
        self.upper.map_or(x, |u| x.min(u))
    }
}

// ── Brent ─────────────────────────────────────────────────────────────────────

/// Brent's method for finding a root of `f(x)` in `[x_min, x_max]`.
///
/// Combines bisection, secant, and inverse quadratic interpolation.
pub fn brent<F>(mut f: F, x_min: Real, x_max: Real, accuracy: Real) -> Result<Real>
where
    F: FnMut(Real) -> Result<Real>,
{
    let fa = f(x_min)?;
    let fb = f(x_max)?;
    brent_bracketed(&mut f, x_min, fa, x_max, fb, accuracy)
}

fn brent_bracketed<F>(
    f: &mut F,
    x_min: Real,
    f_min: Real,
    x_max: Real,
    f_max: Real,
    accuracy: Real,
) -> Result<Real>
where
    F: FnMut(Real) -> Result<Real>,
{
    let acc = if accuracy > 0.0 {
        accuracy
    } else {
        DEFAULT_ACCURACY
    };
    let (mut a, mut b) = (x_min, x_max);
    let (mut fa, mut fb) = (f_min, f_max);

    if fa * fb > 0.0 {
        fail!("Brent: root not bracketed: f[{a}, {b}] -> [{fa:e}, {fb:e}]");
    }
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..MAX_ITERATIONS {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * acc;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }
        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (p, q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                let p = s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0));
                (p, (q - 1.0) * (r - 1.0) * (s - 1.0))
            };
            let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };
            if 2.0 * p < (3.0 * xm * q - (tol * q).abs()) && 2.0 * p < (e * q).abs() {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        b += if d.abs() > tol {
            d
        } else if xm > 0.0 {
            tol
        } else {
            -tol
        };
        fb = f(b)?;
    }
    Err(Error::Runtime(format!(
        "Brent: maximum number of iterations ({MAX_ITERATIONS}) exceeded"
    )))
}

/// Brent's method started from a guess.
///
/// The bracket is grown geometrically from `[guess, guess ± step]` until the
/// objective changes sign, staying inside `bounds`.
pub fn solve<F>(mut f: F, accuracy: Real, guess: Real, step: Real, bounds: Bounds) -> Result<Real>
where
    F: FnMut(Real) -> Result<Real>,
{
    let root = bounds.enforce(guess);
    let f_root = f(root)?;
    if f_root == 0.0 {
        return Ok(root);
    }
    let (mut x_min, mut f_min, mut x_max, mut f_max) = if f_root > 0.0 {
        let x = bounds.enforce(root - step);
        (x, f(x)?, root, f_root)
    } else {
        let x = bounds.enforce(root + step);
        (root, f_root, x, f(x)?)
    };

    for _ in 0..MAX_ITERATIONS {
        if f_min * f_max <= 0.0 {
            return brent_bracketed(&mut f, x_min, f_min, x_max, f_max, accuracy);
        }
        if f_min.abs() < f_max.abs() {
            x_min = bounds.enforce(x_min + GROWTH_FACTOR * (x_min - x_max));
            f_min = f(x_min)?;
        } else {
            x_max = bounds.enforce(x_max + GROWTH_FACTOR * (x_max - x_min));
            f_max = f(x_max)?;
        }
    }
    Err(Error::Runtime(format!(
        "unable to bracket root starting from {guess} with step {step}: \
         f[{x_min}, {x_max}] -> [{f_min:e}, {f_max:e}]"
    )))
}
