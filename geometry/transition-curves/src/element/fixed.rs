//! Constant-curvature elements.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::pose::{LocalDelta, Pose};
use crate::traits::{Element, clamp_station};

/// A circular arc, or a straight line when the curvature is zero.
///
/// Evaluated in closed form with [`Pose::advance`].
///
/// # Example
///
/// ```
/// use transition_curves::{Element, FixedElement, Pose};
/// use std::f64::consts::PI;
///
/// // Half circle of radius 50 turning left
/// let arc = FixedElement::new(50.0 * PI, 1.0 / 50.0);
/// let end = arc.end_pose(&Pose::origin());
/// assert!(end.x().abs() < 1e-9);
/// assert!((end.y() - 100.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FixedElement {
    length: f64,
    curvature: f64,
}

impl FixedElement {
    /// Create an arc of the given length and curvature.
    ///
    /// A negative, NaN or infinite length becomes zero.
    #[must_use]
    pub fn new(length: f64, curvature: f64) -> Self {
        let length = if length.is_finite() { length.max(0.0) } else { 0.0 };
        Self { length, curvature }
    }

    /// Straight line.
    #[must_use]
    pub fn straight(length: f64) -> Self {
        Self::new(length, 0.0)
    }

    /// Arc of the given signed radius (positive turns left).
    #[must_use]
    pub fn from_radius(length: f64, radius: f64) -> Self {
        Self::new(length, 1.0 / radius)
    }

    /// The constant curvature.
    #[must_use]
    pub fn curvature(&self) -> f64 {
        self.curvature
    }

    /// Radius, infinite for a straight line.
    #[must_use]
    pub fn radius(&self) -> f64 {
        1.0 / self.curvature
    }
}

impl Element for FixedElement {
    fn arc_length(&self) -> f64 {
        self.length
    }

    fn curvature_at(&self, _s: f64) -> f64 {
        self.curvature
    }

    fn heading_delta_at(&self, s: f64) -> f64 {
        self.curvature * clamp_station(s, self.length)
    }

    fn pose_at(&self, s: f64, start: &Pose) -> Pose {
        start.advance(clamp_station(s, self.length), self.curvature)
    }

    fn local_delta(&self) -> LocalDelta {
        LocalDelta::arc(self.length, self.curvature)
    }
}

/// A zero-length curvature anchor.
///
/// Passes the pose through unchanged and only pins a curvature value between
/// neighbouring quasi elements.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZeroLengthFixed {
    curvature: f64,
}

impl ZeroLengthFixed {
    /// Anchor at `curvature`.
    #[must_use]
    pub fn new(curvature: f64) -> Self {
        Self { curvature }
    }

    /// The pinned curvature.
    #[must_use]
    pub fn curvature(&self) -> f64 {
        self.curvature
    }

    /// Rebind the pinned curvature.
    ///
    /// Only the bundle that owns the anchor does this, while it is built.
    pub fn set_curvature(&mut self, curvature: f64) {
        self.curvature = curvature;
    }
}

impl Element for ZeroLengthFixed {
    fn arc_length(&self) -> f64 {
        0.0
    }

    fn curvature_at(&self, _s: f64) -> f64 {
        self.curvature
    }

    fn heading_delta_at(&self, _s: f64) -> f64 {
        0.0
    }

    fn pose_at(&self, _s: f64, start: &Pose) -> Pose {
        *start
    }

    fn local_delta(&self) -> LocalDelta {
        LocalDelta::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_straight() {
        let line = FixedElement::straight(80.0);
        let start = Pose::new(1.0, 1.0, 0.0);
        let p = line.pose_at(30.0, &start);
        assert_relative_eq!(p.x(), 31.0, epsilon = 1e-12);
        assert_relative_eq!(p.y(), 1.0, epsilon = 1e-12);
        assert_eq!(line.curvature_at(10.0), 0.0);
        assert!(line.radius().is_infinite());
    }

    #[test]
    fn test_quarter_arc() {
        let r = 300.0;
        let arc = FixedElement::from_radius(r * FRAC_PI_2, r);
        let end = arc.end_pose(&Pose::origin());
        assert_relative_eq!(end.x(), r, epsilon = 1e-9);
        assert_relative_eq!(end.y(), r, epsilon = 1e-9);
        assert_relative_eq!(end.heading, FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(arc.heading_delta_at(arc.arc_length()), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_end_pose_matches_pose_at_length() {
        let arc = FixedElement::new(120.0, -1.0 / 300.0);
        let start = Pose::new(10.0, -4.0, 0.9);
        let a = arc.end_pose(&start);
        let b = arc.pose_at(arc.arc_length(), &start);
        assert_relative_eq!(a.position.coords, b.position.coords, epsilon = 1e-9);
        assert_relative_eq!(a.heading, b.heading, epsilon = 1e-12);
    }

    #[test]
    fn test_stations_are_clamped() {
        let arc = FixedElement::new(10.0, 0.1);
        let start = Pose::origin();
        assert_eq!(arc.pose_at(-5.0, &start), start);
        let end = arc.pose_at(50.0, &start);
        assert_relative_eq!(end.heading, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_length_becomes_zero() {
        assert_eq!(FixedElement::new(-5.0, 0.0).arc_length(), 0.0);
        assert_eq!(FixedElement::new(f64::NAN, 0.01).arc_length(), 0.0);
        assert_eq!(FixedElement::straight(f64::INFINITY).arc_length(), 0.0);
        let start = Pose::new(1.0, 2.0, 0.3);
        assert_eq!(FixedElement::new(-5.0, 0.1).end_pose(&start), start);
    }

    #[test]
    fn test_zero_length_anchor() {
        let mut anchor = ZeroLengthFixed::new(0.002);
        let start = Pose::new(3.0, 4.0, 0.5);
        assert_eq!(anchor.pose_at(0.0, &start), start);
        assert_eq!(anchor.end_pose(&start), start);
        assert_eq!(anchor.arc_length(), 0.0);
        anchor.set_curvature(0.004);
        assert_eq!(anchor.curvature_at(0.0), 0.004);
    }
}
