//! Core element trait.
//!
//! Every alignment element, concrete or the [`AlignmentElement`] enum,
//! answers queries at a local station `s ∈ [0, arc_length]` relative to the
//! pose at which the element starts.
//!
//! [`AlignmentElement`]: crate::AlignmentElement

use nalgebra::{Point2, Vector2};

use crate::pose::{LocalDelta, Pose};

/// A piece of an alignment parameterized by arc length.
///
/// # Implementors
///
/// - [`FixedElement`](crate::FixedElement) - Constant curvature (arc or line)
/// - [`ZeroLengthFixed`](crate::ZeroLengthFixed) - Curvature anchor of zero length
/// - [`QuasiElement`](crate::QuasiElement) - Curvature following a normalized shape
/// - [`TransitionElement`](crate::TransitionElement) - Bundle of the above
/// - [`ImmediateElement`](crate::ImmediateElement) - Identity filler
/// - [`KinkElement`](crate::KinkElement) - Instant heading jump
///
/// Stations outside `[0, arc_length]` are clamped.
pub trait Element {
    /// Length along the curve.
    fn arc_length(&self) -> f64;

    /// Signed curvature at local station `s`.
    fn curvature_at(&self, s: f64) -> f64;

    /// Heading change from the element start to local station `s`.
    fn heading_delta_at(&self, s: f64) -> f64;

    /// Pose at local station `s` when the element starts at `start`.
    fn pose_at(&self, s: f64, start: &Pose) -> Pose;

    /// Pose change over the whole element, in the start pose's frame.
    fn local_delta(&self) -> LocalDelta;

    /// Position at local station `s`.
    fn coord_at(&self, s: f64, start: &Pose) -> Point2<f64> {
        self.pose_at(s, start).position
    }

    /// Unit tangent at local station `s`.
    fn tangent_at(&self, s: f64, start: &Pose) -> Vector2<f64> {
        start.rotated(self.heading_delta_at(s)).tangent()
    }

    /// Pose at the element end.
    fn end_pose(&self, start: &Pose) -> Pose {
        start.apply_local_delta(&self.local_delta())
    }
}

/// Clamp a station into `[0, length]`; NaN maps to 0.
#[must_use]
pub fn clamp_station(s: f64, length: f64) -> f64 {
    if s.is_nan() { 0.0 } else { s.clamp(0.0, length.max(0.0)) }
}

/// Find the piece owning station `s` given cumulative end stations.
///
/// Returns the index and the station local to that piece. A station on a
/// boundary belongs to the following piece, so zero-length pieces are only
/// returned at the very end. `None` if `ends` is empty.
#[must_use]
pub(crate) fn locate_station(ends: &[f64], s: f64) -> Option<(usize, f64)> {
    let last = ends.len().checked_sub(1)?;
    let total = ends[last];
    let s = clamp_station(s, total);
    let index = ends.partition_point(|&end| end <= s).min(last);
    let start = if index == 0 { 0.0 } else { ends[index - 1] };
    let length = ends[index] - start;
    Some((index, (s - start).clamp(0.0, length.max(0.0))))
}
