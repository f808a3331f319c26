//! Length partitions and curvature anchors of composite transitions.
//!
//! A transition runs three normalized shapes back to back: half-wave-in,
//! core and half-wave-out. The [`Partition`] says how much of the length each
//! one gets; the [`Anchors`] say how much of the curvature change each one
//! carries. Given the slope of each shape at its joins, the two can be chosen
//! so the composite curvature is C¹ at both internal joins.
//!
//! # Capacity weighting
//!
//! Segment `i` with length share `nᵢ` and join slope `sᵢ` has capacity
//! `mᵢ = nᵢ / |sᵢ|`. The anchors are
//!
//! ```text
//! a1 = m1 / (m1 + mc + m2)
//! a2 = 1 - m2 / (m1 + mc + m2)
//! ```
//!
//! which matches slopes exactly across each join whenever the core has the
//! same slope at both ends. For other cores it is a heuristic.

use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::family::{CurvatureFamily, CurvatureShape};
use crate::params::CompileParams;

/// Normalized length shares `[l1, lc, l2]`, non-negative and summing to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Partition {
    lengths: [f64; 3],
}

impl Partition {
    /// Renormalize `lengths` to sum 1.
    ///
    /// Negative and non-finite shares count as zero. If nothing is left the
    /// whole length goes to the core.
    #[must_use]
    pub fn new(lengths: [f64; 3]) -> Self {
        let clean = lengths.map(|l| if l.is_finite() && l > 0.0 { l } else { 0.0 });
        let total: f64 = clean.iter().sum();
        if total <= 0.0 {
            return Self::core_only();
        }
        Self {
            lengths: clean.map(|l| l / total),
        }
    }

    /// All length in the core: `[0, 1, 0]`.
    #[must_use]
    pub const fn core_only() -> Self {
        Self {
            lengths: [0.0, 1.0, 0.0],
        }
    }

    /// The three shares.
    #[must_use]
    pub const fn lengths(&self) -> [f64; 3] {
        self.lengths
    }

    /// Share of segment `i` (0 = in, 1 = core, 2 = out).
    #[must_use]
    pub(crate) fn share(&self, i: usize) -> f64 {
        self.lengths[i]
    }

    /// Segment starts `[0, w1, w2]` with `w1 = l1` and `w2 = l1 + lc`.
    #[must_use]
    pub fn starts(&self) -> [f64; 3] {
        let [l1, lc, _] = self.lengths;
        [0.0, l1, l1 + lc]
    }

    /// Whether the shares are non-negative and sum to 1.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lengths.iter().all(|l| *l >= 0.0)
            && (self.lengths.iter().sum::<f64>() - 1.0).abs() <= 1e-9
    }
}

/// Curvature anchors `[a0, a1, a2, a3]` with `0 = a0 ≤ a1 ≤ a2 ≤ a3 = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Anchors {
    values: [f64; 4],
}

impl Anchors {
    /// Anchors from the two internal values; they are clamped to `[0, 1]`
    /// and swapped if out of order.
    #[must_use]
    pub fn new(a1: f64, a2: f64) -> Self {
        let (a1, a2) = (a1.clamp(0.0, 1.0), a2.clamp(0.0, 1.0));
        let (a1, a2) = if a1 > a2 { (a2, a1) } else { (a1, a2) };
        Self {
            values: [0.0, a1, a2, 1.0],
        }
    }

    /// All four anchors.
    #[must_use]
    pub const fn values(&self) -> [f64; 4] {
        self.values
    }

    /// Curvature interval `[aᵢ, aᵢ₊₁]` of segment `i`.
    #[must_use]
    pub(crate) fn interval(&self, i: usize) -> (f64, f64) {
        (self.values[i], self.values[i + 1])
    }

    /// Whether the anchors are ordered and pinned at 0 and 1.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.values[0] == 0.0
            && self.values[3] == 1.0
            && self.values.windows(2).all(|w| w[0] <= w[1])
    }
}

/// Slopes `dκ/du` of the three shapes at their internal joins.
///
/// `None` marks a degenerate shape that carries no curvature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinSlopes {
    /// Half-wave-in at `u = 1`.
    pub hw_in: Option<f64>,
    /// Core, averaged over its two ends.
    pub core: Option<f64>,
    /// Half-wave-out (already reversed) at `u = 0`.
    pub hw_out: Option<f64>,
}

impl JoinSlopes {
    /// Read the join slopes off three compiled families.
    #[must_use]
    pub fn of(hw_in: &CurvatureFamily, core: &CurvatureFamily, hw_out: &CurvatureFamily) -> Self {
        let slope = |f: &CurvatureFamily, value: f64| (!f.is_degenerate()).then_some(value);
        Self {
            hw_in: slope(hw_in, hw_in.kappa_prime(1.0)),
            core: slope(core, 0.5 * (core.kappa_prime(0.0) + core.kappa_prime(1.0))),
            hw_out: slope(hw_out, hw_out.kappa_prime(0.0)),
        }
    }

    fn as_array(&self) -> [Option<f64>; 3] {
        [self.hw_in, self.core, self.hw_out]
    }
}

fn effective_slope(slope: f64, params: &CompileParams) -> f64 {
    let s = slope.abs();
    if s < params.slope_epsilon || !s.is_finite() { 1.0 } else { s }
}

/// Anchors for a partition, weighted by each segment's curvature capacity.
///
/// A segment with zero length or a degenerate shape has zero capacity. If the
/// total capacity collapses the anchors fall back to the length shares.
#[must_use]
pub fn compute_anchors_from_total(
    partition: &Partition,
    slopes: &JoinSlopes,
    params: &CompileParams,
) -> Anchors {
    let lengths = partition.lengths();
    let slopes = slopes.as_array();
    let capacity: [f64; 3] = std::array::from_fn(|i| match slopes[i] {
        Some(s) if lengths[i] > 0.0 => lengths[i] / effective_slope(s, params),
        _ => 0.0,
    });
    let total: f64 = capacity.iter().sum();

    if total < params.capacity_epsilon {
        warn!(
            ?lengths,
            "degenerate curvature capacity, falling back to length-proportional anchors"
        );
        let [_, w1, w2] = partition.starts();
        return Anchors::new(w1, w2);
    }

    Anchors::new(capacity[0] / total, 1.0 - capacity[2] / total)
}

/// Length shares that realize `curvature_split` with C¹ joins.
///
/// Inverts the capacity weighting: `lᵢ ∝ splitᵢ · |sᵢ|`. A degenerate shape
/// gets no length. If every share vanishes the split itself is used.
#[must_use]
pub fn solve_partition_c1(
    curvature_split: [f64; 3],
    slopes: &JoinSlopes,
    params: &CompileParams,
) -> Partition {
    let split = Partition::new(curvature_split).lengths();
    let slopes = slopes.as_array();
    let raw: [f64; 3] = std::array::from_fn(|i| match slopes[i] {
        Some(s) => split[i] * effective_slope(s, params),
        None => 0.0,
    });
    if raw.iter().sum::<f64>() <= 0.0 {
        return Partition::new(split);
    }
    Partition::new(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn slopes(a: f64, c: f64, b: f64) -> JoinSlopes {
        JoinSlopes {
            hw_in: Some(a),
            core: Some(c),
            hw_out: Some(b),
        }
    }

    #[test]
    fn test_partition_normalizes() {
        let p = Partition::new([1.0, 2.0, 1.0]);
        assert_relative_eq!(p.share(0), 0.25);
        assert_relative_eq!(p.share(1), 0.5);
        assert!(p.is_valid());
        assert_eq!(p.starts(), [0.0, 0.25, 0.75]);

        let p = Partition::new([-1.0, f64::NAN, 0.0]);
        assert_eq!(p, Partition::core_only());
    }

    #[test]
    fn test_anchor_intervals_tile_unit_range() {
        let a = Anchors::new(0.7, 0.2);
        assert_eq!(a.interval(0), (0.0, 0.2));
        assert_eq!(a.interval(1), (0.2, 0.7));
        assert_eq!(a.interval(2), (0.7, 1.0));
        assert_eq!(a.values(), [0.0, 0.2, 0.7, 1.0]);
    }

    #[test]
    fn test_unit_slopes_give_length_anchors() {
        let p = Partition::new([0.2, 0.5, 0.3]);
        let a = compute_anchors_from_total(&p, &slopes(1.0, 1.0, 1.0), &CompileParams::default());
        assert_relative_eq!(a.values()[1], 0.2, epsilon = 1e-12);
        assert_relative_eq!(a.values()[2], 0.7, epsilon = 1e-12);
        assert!(a.is_valid());
    }

    #[test]
    fn test_steep_half_waves_get_less_curvature() {
        let p = Partition::new([0.25, 0.5, 0.25]);
        let a = compute_anchors_from_total(&p, &slopes(2.0, 1.0, 2.0), &CompileParams::default());
        // m = [0.125, 0.5, 0.125]
        assert_relative_eq!(a.values()[1], 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(a.values()[2], 5.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_length_core() {
        let p = Partition::new([0.5, 0.0, 0.5]);
        let s = slopes(FRAC_PI_2, 1.0, FRAC_PI_2);
        let a = compute_anchors_from_total(&p, &s, &CompileParams::default());
        assert_relative_eq!(a.values()[1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(a.values()[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_slope_counts_as_unit() {
        let p = Partition::new([0.25, 0.5, 0.25]);
        let a = compute_anchors_from_total(&p, &slopes(0.0, 1.0, 0.0), &CompileParams::default());
        assert_relative_eq!(a.values()[1], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_capacity_falls_back() {
        let p = Partition::new([0.2, 0.5, 0.3]);
        let none = JoinSlopes {
            hw_in: None,
            core: None,
            hw_out: None,
        };
        let a = compute_anchors_from_total(&p, &none, &CompileParams::default());
        assert_relative_eq!(a.values()[1], 0.2, epsilon = 1e-12);
        assert_relative_eq!(a.values()[2], 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_solver_inverts_anchor_weighting() {
        let s = slopes(FRAC_PI_2, 1.0, 3.0);
        let params = CompileParams::default();
        let split = [0.25, 0.5, 0.25];
        let p = solve_partition_c1(split, &s, &params);
        assert!(p.is_valid());

        let a = compute_anchors_from_total(&p, &s, &params);
        let [a0, a1, a2, a3] = a.values();
        assert_relative_eq!(a1 - a0, split[0], epsilon = 1e-12);
        assert_relative_eq!(a2 - a1, split[1], epsilon = 1e-12);
        assert_relative_eq!(a3 - a2, split[2], epsilon = 1e-12);
    }

    #[test]
    fn test_solver_skips_degenerate_segments() {
        let s = JoinSlopes {
            hw_in: None,
            core: Some(1.0),
            hw_out: None,
        };
        let p = solve_partition_c1([0.3, 0.4, 0.3], &s, &CompileParams::default());
        assert_eq!(p, Partition::core_only());
    }

    #[test]
    fn test_anchor_swap() {
        let a = Anchors::new(0.8, 0.3);
        assert_eq!(a.values(), [0.0, 0.3, 0.8, 1.0]);
    }
}
