//! Alignment elements.
//!
//! Concrete element types live in submodules; [`AlignmentElement`] is the
//! closed set an [`Alignment`](crate::Alignment) is made of.

pub mod fixed;
pub mod marker;
pub mod quasi;
pub mod transition;

use nalgebra::{Point2, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::pose::{LocalDelta, Pose};
use crate::traits::Element;

use self::fixed::{FixedElement, ZeroLengthFixed};
use self::marker::{ImmediateElement, KinkElement};
use self::quasi::QuasiElement;
use self::transition::TransitionElement;

/// Coarse element classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ElementKind {
    /// Constant curvature, including zero-length markers.
    Fixed,
    /// Varying curvature.
    Transition,
}

/// Any element that can appear in an alignment.
#[derive(Debug, Clone)]
pub enum AlignmentElement {
    /// Arc or straight.
    Fixed(FixedElement),
    /// Zero-length curvature anchor.
    ZeroLengthFixed(ZeroLengthFixed),
    /// Shape-driven curvature.
    Quasi(QuasiElement),
    /// Bundle of quasi parts and anchors.
    Transition(TransitionElement),
    /// Identity filler.
    Immediate(ImmediateElement),
    /// Heading jump.
    Kink(KinkElement),
}

impl AlignmentElement {
    /// Coarse kind of this element.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Quasi(_) | Self::Transition(_) => ElementKind::Transition,
            Self::Fixed(_) | Self::ZeroLengthFixed(_) | Self::Immediate(_) | Self::Kink(_) => {
                ElementKind::Fixed
            }
        }
    }

    /// Expand transition bundles into their parts, recursively.
    ///
    /// Every other element is returned as-is.
    #[must_use]
    pub fn flatten(&self) -> Vec<AlignmentElement> {
        match self {
            Self::Transition(t) => t.parts().iter().flat_map(Self::flatten).collect(),
            Self::Fixed(_)
            | Self::ZeroLengthFixed(_)
            | Self::Quasi(_)
            | Self::Immediate(_)
            | Self::Kink(_) => vec![self.clone()],
        }
    }

    fn as_element(&self) -> &dyn Element {
        match self {
            Self::Fixed(e) => e,
            Self::ZeroLengthFixed(e) => e,
            Self::Quasi(e) => e,
            Self::Transition(e) => e,
            Self::Immediate(e) => e,
            Self::Kink(e) => e,
        }
    }
}

impl Element for AlignmentElement {
    fn arc_length(&self) -> f64 {
        self.as_element().arc_length()
    }

    fn curvature_at(&self, s: f64) -> f64 {
        self.as_element().curvature_at(s)
    }

    fn heading_delta_at(&self, s: f64) -> f64 {
        self.as_element().heading_delta_at(s)
    }

    fn pose_at(&self, s: f64, start: &Pose) -> Pose {
        self.as_element().pose_at(s, start)
    }

    fn local_delta(&self) -> LocalDelta {
        self.as_element().local_delta()
    }

    fn coord_at(&self, s: f64, start: &Pose) -> Point2<f64> {
        self.as_element().coord_at(s, start)
    }

    fn tangent_at(&self, s: f64, start: &Pose) -> Vector2<f64> {
        self.as_element().tangent_at(s, start)
    }

    fn end_pose(&self, start: &Pose) -> Pose {
        self.as_element().end_pose(start)
    }
}

impl From<FixedElement> for AlignmentElement {
    fn from(e: FixedElement) -> Self {
        Self::Fixed(e)
    }
}

impl From<ZeroLengthFixed> for AlignmentElement {
    fn from(e: ZeroLengthFixed) -> Self {
        Self::ZeroLengthFixed(e)
    }
}

impl From<QuasiElement> for AlignmentElement {
    fn from(e: QuasiElement) -> Self {
        Self::Quasi(e)
    }
}

impl From<TransitionElement> for AlignmentElement {
    fn from(e: TransitionElement) -> Self {
        Self::Transition(e)
    }
}

impl From<ImmediateElement> for AlignmentElement {
    fn from(e: ImmediateElement) -> Self {
        Self::Immediate(e)
    }
}

impl From<KinkElement> for AlignmentElement {
    fn from(e: KinkElement) -> Self {
        Self::Kink(e)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::registry::FamilyRegistry;

    #[test]
    fn test_kinds() {
        assert_eq!(AlignmentElement::from(FixedElement::straight(1.0)).kind(), ElementKind::Fixed);
        assert_eq!(AlignmentElement::from(KinkElement::new(0.1)).kind(), ElementKind::Fixed);
        let reg = FamilyRegistry::standard().unwrap();
        let t = TransitionElement::from_package(&reg.package("clothoid").unwrap(), 10.0, 0.0, 0.01);
        assert_eq!(AlignmentElement::from(t).kind(), ElementKind::Transition);
    }

    #[test]
    fn test_flatten_expands_bundles() {
        let reg = FamilyRegistry::standard().unwrap();
        let package = reg.package("smooth-quadratic").unwrap();
        let t = TransitionElement::from_package(&package, 40.0, 0.0, 0.01);
        let flat = AlignmentElement::from(t).flatten();
        assert_eq!(flat.len(), 5);
        assert!(matches!(flat[0], AlignmentElement::Quasi(_)));
        assert!(matches!(flat[1], AlignmentElement::ZeroLengthFixed(_)));
        assert!(matches!(flat[4], AlignmentElement::Quasi(_)));

        let fixed = AlignmentElement::from(FixedElement::new(3.0, 0.1)).flatten();
        assert_eq!(fixed.len(), 1);
    }

    #[test]
    fn test_dispatch_matches_concrete() {
        let arc = FixedElement::new(25.0, 0.02);
        let wrapped = AlignmentElement::from(arc);
        let start = Pose::new(1.0, 2.0, 0.3);
        assert_eq!(wrapped.end_pose(&start), arc.end_pose(&start));
        assert_eq!(wrapped.coord_at(5.0, &start), arc.coord_at(5.0, &start));
        assert_eq!(wrapped.arc_length(), 25.0);
    }
}
