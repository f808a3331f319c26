//! Transition curves for horizontal alignments.
//!
//! This crate compiles declarative curvature-shape tables into exact,
//! range-normalized curvature families and uses them to build alignments of
//! straights, arcs and transitions:
//!
//! - [`FamilyTable`] / [`FamilyRegistry`] - Declarative shapes, validated and compiled once
//! - [`CurvatureFamily`] / [`TransitionPackage`] - Exact `κ`, `κ'`, `κ''` and `∫κ`
//! - [`Pose`] - Planar pose with the closed-form constant-curvature advance
//! - [`AlignmentElement`] - Fixed, zero-length, quasi, transition, immediate and kink elements
//! - [`Alignment`] - Station lookup, pose propagation and sampling
//! - [`integrate`] / [`integrate_fresnel`] - Adaptive Romberg quadrature
//!
//! # Core Traits
//!
//! - [`CurvatureShape`]: a normalized curvature shape over `u ∈ [0, 1]`
//! - [`Element`]: curvature, heading and pose at a local station
//!
//! # Example
//!
//! ```
//! use transition_curves::{Alignment, ElementSpec, FamilyRegistry, Pose};
//!
//! let registry = FamilyRegistry::standard().unwrap();
//! let alignment = Alignment::from_specs(
//!     Pose::origin(),
//!     &[
//!         ElementSpec::fixed(80.0, 0.0),
//!         ElementSpec::transition(60.0, "clothoid", 0.0, 1.0 / 300.0),
//!         ElementSpec::fixed(120.0, 1.0 / 300.0),
//!     ],
//!     &registry,
//! )
//! .unwrap();
//!
//! let at = alignment.eval_at(140.001);
//! assert!((at.curvature - 1.0 / 300.0).abs() < 1e-9);
//!
//! for point in alignment.sample(10.0) {
//!     assert!(point.s >= 0.0 && point.s <= alignment.total_length());
//! }
//! ```
//!
//! # Coordinate System
//!
//! Right-handed plane coordinates. Headings are counter-clockwise from +X and
//! positive curvature turns left.
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It is synchronous
//! and does no I/O. A compiled [`FamilyRegistry`] is immutable through `&self`
//! and can be shared across threads.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for tables, specs, poses,
//!   parameters and evaluation results

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::too_many_lines,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::suboptimal_flops,
    clippy::missing_const_for_fn,
    clippy::cast_lossless,
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::option_if_let_else,
    clippy::items_after_statements,
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::needless_range_loop,
    clippy::float_cmp
)]

mod alignment;
mod anchors;
mod element;
mod error;
mod family;
mod package;
mod params;
mod pose;
mod quadrature;
mod registry;
mod table;
mod traits;
mod validate;

pub use alignment::{Alignment, ElementSpec, MAX_SAMPLES, SamplePoint, StationEval};
pub use anchors::{
    Anchors, JoinSlopes, Partition, compute_anchors_from_total, solve_partition_c1,
};
pub use element::fixed::{FixedElement, ZeroLengthFixed};
pub use element::marker::{ImmediateElement, KinkElement};
pub use element::quasi::QuasiElement;
pub use element::transition::TransitionElement;
pub use element::{AlignmentElement, ElementKind};
pub use error::TransitionError;
pub use family::{CurvatureFamily, CurvatureShape};
pub use package::TransitionPackage;
pub use params::{CompileParams, QuadratureParams};
pub use pose::{CURVATURE_EPSILON, LocalDelta, Pose};
pub use quadrature::{FresnelQuadrature, Quadrature, integrate, integrate_fresnel};
pub use registry::{FamilyRegistry, compile_half_wave, compile_package, compile_proto};
pub use table::{CLOTHO_CORE, FamilyTable, HalfWaveDef, PartitionMode, TransitionDef};
pub use traits::{Element, clamp_station};
pub use validate::validate_table;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

/// Result type for family compilation and alignment construction.
pub type Result<T> = std::result::Result<T, TransitionError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod integration_tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Every element type honors the `Element` contract at its ends.
    #[test]
    fn test_element_trait_consistency() {
        let registry = FamilyRegistry::standard().unwrap();
        let package = registry.package("smooth-quadratic").unwrap();
        let elements: Vec<AlignmentElement> = vec![
            FixedElement::new(40.0, 0.01).into(),
            FixedElement::straight(25.0).into(),
            ZeroLengthFixed::new(0.003).into(),
            QuasiElement::new(30.0, 0.0, 0.01, package.clone()).into(),
            TransitionElement::from_package(&package, 50.0, 0.01, -0.005).into(),
            ImmediateElement.into(),
            KinkElement::new(0.3).into(),
        ];
        let start = Pose::new(3.0, -2.0, 0.7);
        for element in &elements {
            verify_element_basics(element, &start);
        }
    }

    fn verify_element_basics<E: Element>(element: &E, start: &Pose) {
        let len = element.arc_length();
        assert!(len >= 0.0);

        let end = element.end_pose(start);
        let last = element.pose_at(len, start);
        assert_relative_eq!(end.position.coords, last.position.coords, epsilon = 1e-8);
        assert_relative_eq!(end.heading, last.heading, epsilon = 1e-10);
        assert_relative_eq!(
            end.heading - start.heading,
            element.heading_delta_at(len),
            epsilon = 1e-10
        );

        // Chord never exceeds arc length.
        let mid = element.coord_at(0.5 * len, start);
        assert!((mid - start.position).norm() <= 0.5 * len + 1e-9);

        let t = element.tangent_at(0.25 * len, start);
        assert_relative_eq!(t.norm(), 1.0, epsilon = 1e-12);
    }
}
