//! Zero-length structural elements.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::pose::{LocalDelta, Pose};
use crate::traits::Element;

/// Zero-length filler with an identity pose transform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImmediateElement;

impl Element for ImmediateElement {
    fn arc_length(&self) -> f64 {
        0.0
    }

    fn curvature_at(&self, _s: f64) -> f64 {
        0.0
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

/// A true geometric kink: the heading jumps by `delta_dir` in place.
///
/// Queries on the kink report the pose after the jump.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KinkElement {
    delta_dir: f64,
}

impl KinkElement {
    /// Kink turning by `delta_dir` radians (positive turns left).
    #[must_use]
    pub fn new(delta_dir: f64) -> Self {
        Self { delta_dir }
    }

    /// Heading jump.
    #[must_use]
    pub fn delta_dir(&self) -> f64 {
        self.delta_dir
    }
}

impl Element for KinkElement {
    fn arc_length(&self) -> f64 {
        0.0
    }

    fn curvature_at(&self, _s: f64) -> f64 {
        0.0
    }

    fn heading_delta_at(&self, _s: f64) -> f64 {
        self.delta_dir
    }

    fn pose_at(&self, _s: f64, start: &Pose) -> Pose {
        start.rotated(self.delta_dir)
    }

    fn local_delta(&self) -> LocalDelta {
        LocalDelta::new(0.0, 0.0, self.delta_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_immediate_is_identity() {
        let start = Pose::new(2.0, 3.0, 0.4);
        assert_eq!(ImmediateElement.end_pose(&start), start);
        assert_eq!(ImmediateElement.pose_at(7.0, &start), start);
    }

    #[test]
    fn test_kink_rotates_in_place() {
        let kink = KinkElement::new(FRAC_PI_4);
        let start = Pose::new(2.0, 3.0, 0.0);
        let end = kink.end_pose(&start);
        assert_eq!(end.position, start.position);
        assert_relative_eq!(end.heading, FRAC_PI_4);
        assert_eq!(kink.pose_at(0.0, &start), end);
        let t = kink.tangent_at(0.0, &start);
        assert_relative_eq!(t.x, t.y, epsilon = 1e-15);
    }
}
