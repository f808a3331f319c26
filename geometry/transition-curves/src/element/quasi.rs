//! Elements with continuously varying curvature.

use std::fmt;
use std::sync::Arc;

use crate::family::CurvatureShape;
use crate::params::QuadratureParams;
use crate::pose::{CURVATURE_EPSILON, LocalDelta, Pose};
use crate::quadrature::integrate_fresnel;
use crate::traits::{Element, clamp_station};

/// An element whose curvature runs from `ka` to `ke` along a normalized shape.
///
/// ```text
/// κ(s) = ka + (ke - ka)·shape.κ(s/L)
/// θ(s) = ka·s + (ke - ka)·L·shape.∫κ(s/L)
/// ```
///
/// The heading is exact. Positions come from the joint Fresnel quadrature of
/// the heading. The end-of-element delta is computed once on construction.
#[derive(Clone)]
pub struct QuasiElement {
    length: f64,
    ka: f64,
    ke: f64,
    shape: Arc<dyn CurvatureShape>,
    quadrature: QuadratureParams,
    end_delta: LocalDelta,
}

impl QuasiElement {
    /// Create with default quadrature parameters.
    #[must_use]
    pub fn new(length: f64, ka: f64, ke: f64, shape: Arc<dyn CurvatureShape>) -> Self {
        Self::with_quadrature(length, ka, ke, shape, QuadratureParams::default())
    }

    /// Create with explicit quadrature parameters.
    #[must_use]
    pub fn with_quadrature(
        length: f64,
        ka: f64,
        ke: f64,
        shape: Arc<dyn CurvatureShape>,
        quadrature: QuadratureParams,
    ) -> Self {
        let mut element = Self {
            length: length.max(0.0),
            ka,
            ke,
            shape,
            quadrature,
            end_delta: LocalDelta::ZERO,
        };
        element.end_delta = element.local_delta_at(element.length);
        element
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

    /// The normalized shape.
    #[must_use]
    pub fn shape(&self) -> &Arc<dyn CurvatureShape> {
        &self.shape
    }

    /// Rate of curvature change `dκ/ds` at local station `s`.
    #[must_use]
    pub fn curvature_rate_at(&self, s: f64) -> f64 {
        if self.length <= 0.0 {
            return 0.0;
        }
        let u = clamp_station(s, self.length) / self.length;
        (self.ke - self.ka) / self.length * self.shape.kappa_prime(u)
    }

    fn is_constant(&self) -> bool {
        (self.ke - self.ka).abs() < CURVATURE_EPSILON
    }

    /// Pose change from the element start to local station `s`.
    #[must_use]
    pub fn local_delta_at(&self, s: f64) -> LocalDelta {
        let s = clamp_station(s, self.length);
        if s <= 0.0 {
            return LocalDelta::ZERO;
        }
        if self.is_constant() {
            return LocalDelta::arc(s, self.ka);
        }
        let q = integrate_fresnel(|t| self.heading_delta_at(t), 0.0, s, &self.quadrature);
        LocalDelta::new(q.int_c, q.int_s, self.heading_delta_at(s))
    }
}

impl Element for QuasiElement {
    fn arc_length(&self) -> f64 {
        self.length
    }

    fn curvature_at(&self, s: f64) -> f64 {
        if self.length <= 0.0 {
            return self.ka;
        }
        let u = clamp_station(s, self.length) / self.length;
        self.ka + (self.ke - self.ka) * self.shape.kappa(u)
    }

    fn heading_delta_at(&self, s: f64) -> f64 {
        if self.length <= 0.0 {
            return 0.0;
        }
        let s = clamp_station(s, self.length);
        self.ka * s + (self.ke - self.ka) * self.length * self.shape.kappa_int(s / self.length)
    }

    fn pose_at(&self, s: f64, start: &Pose) -> Pose {
        start.apply_local_delta(&self.local_delta_at(s))
    }

    fn local_delta(&self) -> LocalDelta {
        self.end_delta
    }
}

impl fmt::Debug for QuasiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuasiElement")
            .field("length", &self.length)
            .field("ka", &self.ka)
            .field("ke", &self.ke)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}
