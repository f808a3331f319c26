//! Planar rigid poses.
//!
//! A [`Pose`] is a position plus a heading. The heading is stored as an
//! unwrapped angle so that headings accumulated along an alignment do not
//! jump at ±π, and the unit tangent is derived from it on demand.

use nalgebra::{Point2, Rotation2, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Below this magnitude a curvature is treated as a straight line.
pub const CURVATURE_EPSILON: f64 = 1e-12;

/// A position and heading in the plane.
///
/// Poses are value types: every operation returns a new pose.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Position in meters.
    pub position: Point2<f64>,
    /// Heading in radians, counter-clockwise from +X.
    pub heading: f64,
}

/// A pose change expressed in the frame of the pose it is applied to.
///
/// `dx` runs along the tangent, `dy` along the left normal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalDelta {
    /// Displacement along the tangent.
    pub dx: f64,
    /// Displacement along the left normal.
    pub dy: f64,
    /// Heading change.
    pub dtheta: f64,
}

impl LocalDelta {
    /// The identity delta.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a local delta.
    #[must_use]
    pub const fn new(dx: f64, dy: f64, dtheta: f64) -> Self {
        Self { dx, dy, dtheta }
    }

    /// End-of-arc delta for constant curvature `kappa` over length `ds`.
    ///
    /// `{sin(κL)/κ, (1 - cos(κL))/κ, κL}`, with the limit `{L, 0, 0}` as
    /// `κ → 0`.
    #[must_use]
    pub fn arc(ds: f64, kappa: f64) -> Self {
        if kappa.abs() < CURVATURE_EPSILON {
            return Self::new(ds, 0.0, 0.0);
        }
        let dpsi = kappa * ds;
        let (s, c) = dpsi.sin_cos();
        Self::new(s / kappa, (1.0 - c) / kappa, dpsi)
    }

    /// This delta followed by `next`, where `next` is expressed in the frame
    /// reached after `self`.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        let rotated = Rotation2::new(self.dtheta) * Vector2::new(next.dx, next.dy);
        Self::new(self.dx + rotated.x, self.dy + rotated.y, self.dtheta + next.dtheta)
    }
}

impl Pose {
    /// Create a pose from coordinates and heading.
    #[must_use]
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            position: Point2::new(x, y),
            heading,
        }
    }

    /// Create a pose from a position and a tangent direction.
    ///
    /// The tangent does not need to be normalized.
    #[must_use]
    pub fn from_tangent(position: Point2<f64>, tangent: Vector2<f64>) -> Self {
        Self {
            position,
            heading: tangent.y.atan2(tangent.x),
        }
    }

    /// Pose at the origin heading along +X.
    #[must_use]
    pub fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// X coordinate.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Y coordinate.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Unit tangent.
    #[must_use]
    pub fn tangent(&self) -> Vector2<f64> {
        let (s, c) = self.heading.sin_cos();
        Vector2::new(c, s)
    }

    /// Unit left normal (tangent rotated +90°).
    #[must_use]
    pub fn normal(&self) -> Vector2<f64> {
        let t = self.tangent();
        Vector2::new(-t.y, t.x)
    }

    /// Rotate the heading by `dtheta` in place of position.
    #[must_use]
    pub fn rotated(&self, dtheta: f64) -> Self {
        Self {
            position: self.position,
            heading: self.heading + dtheta,
        }
    }

    /// Advance along a constant-curvature arc.
    ///
    /// Exact closed form: the tangent rotates by `dψ = κ·ds` and the position
    /// moves by `(sin dψ / κ)·t + ((1 - cos dψ) / κ)·n`. A curvature below
    /// [`CURVATURE_EPSILON`] is a straight translation.
    ///
    /// # Example
    ///
    /// ```
    /// use transition_curves::Pose;
    /// use std::f64::consts::FRAC_PI_2;
    ///
    /// // Quarter circle of radius 10 turning left
    /// let end = Pose::origin().advance(10.0 * FRAC_PI_2, 0.1);
    /// assert!((end.x() - 10.0).abs() < 1e-9);
    /// assert!((end.y() - 10.0).abs() < 1e-9);
    /// assert!((end.heading - FRAC_PI_2).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn advance(&self, ds: f64, kappa: f64) -> Self {
        self.apply_local_delta(&LocalDelta::arc(ds, kappa))
    }

    /// Compose with a delta expressed in this pose's local frame.
    ///
    /// The displacement is rotated by the current heading, then translated,
    /// then the headings add.
    #[must_use]
    pub fn apply_local_delta(&self, delta: &LocalDelta) -> Self {
        let rotation = Rotation2::new(self.heading);
        Self {
            position: self.position + rotation * Vector2::new(delta.dx, delta.dy),
            heading: self.heading + delta.dtheta,
        }
    }

    /// Delta that takes `self` to `other`, in `self`'s local frame.
    #[must_use]
    pub fn local_delta_to(&self, other: &Self) -> LocalDelta {
        let rotation = Rotation2::new(-self.heading);
        let d = rotation * (other.position - self.position);
        LocalDelta::new(d.x, d.y, other.heading - self.heading)
    }

    /// Distance between positions.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (other.position - self.position).norm()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::origin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_straight_advance() {
        let p = Pose::new(1.0, 2.0, FRAC_PI_2).advance(5.0, 0.0);
        assert_relative_eq!(p.x(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y(), 7.0, epsilon = 1e-12);
        assert_relative_eq!(p.heading, FRAC_PI_2);
    }

    #[test]
    fn test_arc_advance_right_turn() {
        // Half circle of radius 20 turning right (negative curvature)
        let r = 20.0;
        let p = Pose::origin().advance(PI * r, -1.0 / r);
        assert_relative_eq!(p.x(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(p.y(), -2.0 * r, epsilon = 1e-9);
        assert_relative_eq!(p.heading, -PI, epsilon = 1e-12);
    }

    #[test]
    fn test_advance_composes() {
        let start = Pose::new(3.0, -1.0, 0.3);
        let k = 1.0 / 150.0;
        let once = start.advance(80.0, k);
        let twice = start.advance(30.0, k).advance(50.0, k);
        assert_relative_eq!(once.position.coords, twice.position.coords, epsilon = 1e-9);
        assert_relative_eq!(once.heading, twice.heading, epsilon = 1e-12);
    }

    #[test]
    fn test_tiny_curvature_matches_straight() {
        let a = Pose::origin().advance(100.0, 1e-14);
        let b = Pose::origin().advance(100.0, 0.0);
        assert_relative_eq!(a.position.coords, b.position.coords, epsilon = 1e-9);
    }

    #[test]
    fn test_local_delta_round_trip() {
        let a = Pose::new(10.0, 5.0, 1.1);
        let b = Pose::new(-3.0, 8.0, -0.4);
        let delta = a.local_delta_to(&b);
        let back = a.apply_local_delta(&delta);
        assert_relative_eq!(back.position.coords, b.position.coords, epsilon = 1e-12);
        assert_relative_eq!(back.heading, b.heading, epsilon = 1e-12);
    }

    #[test]
    fn test_tangent_and_normal() {
        let p = Pose::new(0.0, 0.0, PI / 6.0);
        assert_relative_eq!(p.tangent().norm(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(p.tangent().dot(&p.normal()), 0.0, epsilon = 1e-15);
        // Left normal: tangent × normal points +Z
        let t = p.tangent();
        let n = p.normal();
        assert!(t.x * n.y - t.y * n.x > 0.0);

        let q = Pose::from_tangent(Point2::new(1.0, 1.0), Vector2::new(0.0, -3.0));
        assert_relative_eq!(q.heading, -FRAC_PI_2);
    }

    #[test]
    fn test_delta_chaining_matches_pose_chaining() {
        let a = LocalDelta::arc(40.0, 1.0 / 90.0);
        let b = LocalDelta::new(3.0, -2.0, 0.7);
        let start = Pose::new(5.0, 6.0, -0.2);

        let chained = start.apply_local_delta(&a.then(&b));
        let stepped = start.apply_local_delta(&a).apply_local_delta(&b);
        assert_relative_eq!(chained.position.coords, stepped.position.coords, epsilon = 1e-12);
        assert_relative_eq!(chained.heading, stepped.heading, epsilon = 1e-12);
        assert_eq!(LocalDelta::ZERO.then(&b), b);
    }

    #[test]
    fn test_arc_delta_limit() {
        let d = LocalDelta::arc(12.0, 0.0);
        assert_eq!(d, LocalDelta::new(12.0, 0.0, 0.0));

        let d = LocalDelta::arc(12.0, 1e-6);
        assert_relative_eq!(d.dx, 12.0, epsilon = 1e-6);
        assert_relative_eq!(d.dy, 0.5 * 1e-6 * 144.0, epsilon = 1e-9);
    }
}
