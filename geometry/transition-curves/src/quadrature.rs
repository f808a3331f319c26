//! Adaptive Romberg quadrature.
//!
//! Trapezoidal refinements with doubling subdivision are extrapolated with
//! Richardson's scheme until the diagonal stabilizes. When the tolerance is
//! never met the best estimate is returned with `converged == false`. This
//! loses precision but is not treated as a failure.
//!
//! [`integrate_fresnel`] runs the same recursion on `cos τ(t)` and
//! `sin τ(t)` jointly, sharing every sample of `τ`.

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::QuadratureParams;

/// Result of a scalar quadrature.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quadrature {
    /// Best available estimate of the integral.
    pub value: f64,
    /// Difference between the last two diagonal extrapolations.
    pub error: f64,
    /// Refinement levels performed.
    pub levels: usize,
    /// Whether a tolerance was met before the depth cap.
    pub converged: bool,
}

/// Result of the joint cosine/sine quadrature of a heading function.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FresnelQuadrature {
    /// `∫ cos τ(t) dt`, the x displacement.
    pub int_c: f64,
    /// `∫ sin τ(t) dt`, the y displacement.
    pub int_s: f64,
    /// Largest component difference between the last two extrapolations.
    pub error: f64,
    /// Refinement levels performed.
    pub levels: usize,
    /// Whether a tolerance was met before the depth cap.
    pub converged: bool,
}

/// Integrate `f` over `[a, b]` with adaptive Romberg quadrature.
///
/// # Example
///
/// ```
/// use transition_curves::{integrate, QuadratureParams};
///
/// let q = integrate(|x| x * x, 0.0, 3.0, &QuadratureParams::default());
/// assert!(q.converged);
/// assert!((q.value - 9.0).abs() < 1e-10);
/// ```
pub fn integrate<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, params: &QuadratureParams) -> Quadrature {
    let run = romberg(|t| [f(t)], a, b, params);
    Quadrature {
        value: run.value[0],
        error: run.error,
        levels: run.levels,
        converged: run.converged,
    }
}

/// Integrate `(cos τ(t), sin τ(t))` over `[a, b]`.
///
/// For a curve whose heading along arc length is `τ`, the result is the
/// Cartesian displacement between stations `a` and `b`.
pub fn integrate_fresnel<F: Fn(f64) -> f64>(
    tau: F,
    a: f64,
    b: f64,
    params: &QuadratureParams,
) -> FresnelQuadrature {
    let run = romberg(
        |t| {
            let (s, c) = tau(t).sin_cos();
            [c, s]
        },
        a,
        b,
        params,
    );
    FresnelQuadrature {
        int_c: run.value[0],
        int_s: run.value[1],
        error: run.error,
        levels: run.levels,
        converged: run.converged,
    }
}

struct RombergRun<const N: usize> {
    value: [f64; N],
    error: f64,
    levels: usize,
    converged: bool,
}

fn romberg<const N: usize, F: Fn(f64) -> [f64; N]>(
    f: F,
    a: f64,
    b: f64,
    params: &QuadratureParams,
) -> RombergRun<N> {
    if a == b {
        return RombergRun {
            value: [0.0; N],
            error: 0.0,
            levels: 0,
            converged: true,
        };
    }

    let mut h = b - a;
    let (fa, fb) = (f(a), f(b));
    let mut prev: Vec<[f64; N]> = vec![std::array::from_fn(|i| 0.5 * h * (fa[i] + fb[i]))];
    let mut error = f64::INFINITY;
    let max_levels = params.max_levels.max(1);

    for level in 1..=max_levels {
        h *= 0.5;

        let mut sum = [0.0; N];
        for k in 1..=(1usize << (level - 1)) {
            let y = f(a + (2 * k - 1) as f64 * h);
            for i in 0..N {
                sum[i] += y[i];
            }
        }

        let mut row: Vec<[f64; N]> = Vec::with_capacity(level + 1);
        row.push(std::array::from_fn(|i| 0.5 * prev[0][i] + h * sum[i]));
        let mut factor = 1.0;
        for m in 1..=level {
            factor *= 4.0;
            let (lo, hi) = (&prev[m - 1], &row[m - 1]);
            let next = std::array::from_fn(|i| hi[i] + (hi[i] - lo[i]) / (factor - 1.0));
            row.push(next);
        }

        let best = row[level];
        let last = prev[level - 1];
        error = (0..N).map(|i| (best[i] - last[i]).abs()).fold(0.0, f64::max);
        let scale = best.iter().map(|v| v * v).sum::<f64>().sqrt();

        if level >= params.min_levels {
            let abs_ok = error < params.abs_tolerance;
            let rel_ok = scale > 0.0 && 100.0 * error / scale < params.rel_tolerance;
            if abs_ok || rel_ok {
                return RombergRun {
                    value: best,
                    error,
                    levels: level,
                    converged: true,
                };
            }
        }
        prev = row;
    }

    debug!(
        a,
        b,
        error,
        levels = max_levels,
        "romberg quadrature reached maximum depth without converging"
    );
    RombergRun {
        value: prev[max_levels],
        error,
        levels: max_levels,
        converged: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_polynomial_is_exact() {
        let q = integrate(|x| 3.0 * x * x + 1.0, 0.0, 2.0, &QuadratureParams::default());
        assert!(q.converged);
        assert_relative_eq!(q.value, 10.0, epsilon = 1e-10);
    }

    #[test]
    fn test_trig_integral() {
        let q = integrate(f64::sin, 0.0, PI, &QuadratureParams::default());
        assert!(q.converged);
        assert_relative_eq!(q.value, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_periodic_integrand_is_not_fooled_by_endpoints() {
        // Endpoint and first midpoint samples of sin²(2πx) are all zero.
        let f = |x: f64| (2.0 * PI * x).sin().powi(2);
        let q = integrate(f, 0.0, 1.0, &QuadratureParams::default());
        assert_relative_eq!(q.value, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_reversed_and_empty_intervals() {
        let params = QuadratureParams::default();
        let q = integrate(|x| x, 2.0, 0.0, &params);
        assert_relative_eq!(q.value, -2.0, epsilon = 1e-12);

        let q = integrate(|x| x, 1.0, 1.0, &params);
        assert_eq!(q.value, 0.0);
        assert!(q.converged);
        assert_eq!(q.levels, 0);
    }

    #[test]
    fn test_non_convergence_returns_best_estimate() {
        // sqrt has an unbounded derivative at 0; two levels are not enough.
        let params = QuadratureParams::default()
            .with_max_levels(2)
            .with_min_levels(1);
        let q = integrate(f64::sqrt, 0.0, 1.0, &params);
        assert!(!q.converged);
        assert_eq!(q.levels, 2);
        assert!((q.value - 2.0 / 3.0).abs() < 0.05);
        assert!(q.error > 0.0);
    }

    #[test]
    fn test_fresnel_straight_line() {
        let q = integrate_fresnel(|_| 0.0, 0.0, 10.0, &QuadratureParams::default());
        assert!(q.converged);
        assert_relative_eq!(q.int_c, 10.0, epsilon = 1e-12);
        assert_relative_eq!(q.int_s, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fresnel_circle() {
        // Constant curvature 1/r traced for a quarter turn.
        let r = 50.0;
        let len = PI / 2.0 * r;
        let q = integrate_fresnel(|t| t / r, 0.0, len, &QuadratureParams::default());
        assert_relative_eq!(q.int_c, r, epsilon = 1e-8);
        assert_relative_eq!(q.int_s, r, epsilon = 1e-8);
    }

    #[test]
    fn test_fresnel_clothoid_matches_series() {
        // C(x) = ∫₀ˣ cos(t²) dt ≈ x - x⁵/10 + x⁹/216 for small x
        let x: f64 = 0.5;
        let q = integrate_fresnel(|t| t * t, 0.0, x, &QuadratureParams::precise());
        let c = x - x.powi(5) / 10.0 + x.powi(9) / 216.0;
        let s = x.powi(3) / 3.0 - x.powi(7) / 42.0 + x.powi(11) / 1320.0;
        assert_relative_eq!(q.int_c, c, epsilon = 1e-7);
        assert_relative_eq!(q.int_s, s, epsilon = 1e-7);
    }
}
