//! Transition bundles.

use std::sync::Arc;

use crate::element::AlignmentElement;
use crate::element::fixed::ZeroLengthFixed;
use crate::element::quasi::QuasiElement;
use crate::family::CurvatureShape;
use crate::package::TransitionPackage;
use crate::params::QuadratureParams;
use crate::pose::{LocalDelta, Pose};
use crate::traits::{Element, locate_station};

/// A transition from curvature `ka` to `ke` built from a compiled package.
///
/// The bundle always holds five parts:
///
/// ```text
/// [Quasi(hw_in), ZeroLen(K1), Quasi(core), ZeroLen(K2), Quasi(hw_out)]
/// ```
///
/// with `Kᵢ = ka + (ke - ka)·aᵢ` taken from the package anchors. The bundle
/// owns its two anchors; `ka` and `ke` are copied into the quasi parts when
/// the bundle is built.
#[derive(Debug, Clone)]
pub struct TransitionElement {
    type_id: String,
    length: f64,
    ka: f64,
    ke: f64,
    parts: Vec<AlignmentElement>,
    /// Cumulative end station of each part.
    ends: Vec<f64>,
    /// Delta from the bundle start to the start of each part.
    part_starts: Vec<LocalDelta>,
    end_delta: LocalDelta,
}

impl TransitionElement {
    /// Build a bundle of total `length` from `package`.
    #[must_use]
    pub fn from_package(package: &TransitionPackage, length: f64, ka: f64, ke: f64) -> Self {
        Self::with_quadrature(package, length, ka, ke, QuadratureParams::default())
    }

    /// Like [`TransitionElement::from_package`] with explicit quadrature
    /// parameters for the quasi parts.
    #[must_use]
    pub fn with_quadrature(
        package: &TransitionPackage,
        length: f64,
        ka: f64,
        ke: f64,
        quadrature: QuadratureParams,
    ) -> Self {
        let length = length.max(0.0);
        let [_, a1, a2, _] = package.anchors().values();
        let k1 = ka + (ke - ka) * a1;
        let k2 = ka + (ke - ka) * a2;
        let [l1, lc, l2] = package.partition().lengths().map(|share| share * length);
        let [hw_in, core, hw_out] = package.families();

        let quasi = |len: f64, from: f64, to: f64, shape: Arc<dyn CurvatureShape>| {
            AlignmentElement::Quasi(QuasiElement::with_quadrature(len, from, to, shape, quadrature))
        };
        let parts = vec![
            quasi(l1, ka, k1, Arc::new(hw_in.clone())),
            AlignmentElement::ZeroLengthFixed(ZeroLengthFixed::new(k1)),
            quasi(lc, k1, k2, Arc::new(core.clone())),
            AlignmentElement::ZeroLengthFixed(ZeroLengthFixed::new(k2)),
            quasi(l2, k2, ke, Arc::new(hw_out.clone())),
        ];
        Self::from_parts(package.id(), ka, ke, parts)
    }

    /// Bundle arbitrary parts.
    ///
    /// `ka` and `ke` are recorded as given; they are not checked against the
    /// parts.
    #[must_use]
    pub fn from_parts(
        type_id: impl Into<String>,
        ka: f64,
        ke: f64,
        parts: Vec<AlignmentElement>,
    ) -> Self {
        let mut ends = Vec::with_capacity(parts.len());
        let mut part_starts = Vec::with_capacity(parts.len());
        let mut station = 0.0;
        let mut delta = LocalDelta::ZERO;
        for part in &parts {
            part_starts.push(delta);
            station += part.arc_length();
            ends.push(station);
            delta = delta.then(&part.local_delta());
        }
        Self {
            type_id: type_id.into(),
            length: station,
            ka,
            ke,
            parts,
            ends,
            part_starts,
            end_delta: delta,
        }
    }

    /// Transition type id.
    #[must_use]
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// Curvature at the start.
    #[must_use]
    pub fn ka(&self) -> f64 {
        self.ka
    }

    /// Curvature at the end.
    #[must_use]
    pub fn ke(&self) -> f64 {
        self.ke
    }

    /// The parts in order.
    #[must_use]
    pub fn parts(&self) -> &[AlignmentElement] {
        &self.parts
    }

    /// Part owning local station `s`, the station within it and the pose
    /// delta to its start.
    fn locate(&self, s: f64) -> Option<(&AlignmentElement, f64, &LocalDelta)> {
        let (i, local) = locate_station(&self.ends, s)?;
        Some((&self.parts[i], local, &self.part_starts[i]))
    }
}

impl Element for TransitionElement {
    fn arc_length(&self) -> f64 {
        self.length
    }

    fn curvature_at(&self, s: f64) -> f64 {
        self.locate(s).map_or(self.ka, |(part, local, _)| part.curvature_at(local))
    }

    fn heading_delta_at(&self, s: f64) -> f64 {
        self.locate(s)
            .map_or(0.0, |(part, local, before)| before.dtheta + part.heading_delta_at(local))
    }

    fn pose_at(&self, s: f64, start: &Pose) -> Pose {
        match self.locate(s) {
            Some((part, local, before)) => part.pose_at(local, &start.apply_local_delta(before)),
            None => *start,
        }
    }

    fn local_delta(&self) -> LocalDelta {
        self.end_delta
    }
}
