//! Compiled transition packages.

use crate::anchors::{Anchors, Partition};
use crate::family::{CurvatureFamily, CurvatureShape};

/// A compiled transition type: three normalized families laid end to end.
///
/// On `u ∈ [0, 1]` the package is piecewise: segment `i` covers
/// `[wᵢ, wᵢ + lᵢ]` of the domain and maps its family's output into the
/// curvature interval `[aᵢ, aᵢ₊₁]`. The result is itself a normalized shape
/// running from `κ(0) = 0` to `κ(1) = 1`.
#[derive(Debug, Clone)]
pub struct TransitionPackage {
    id: String,
    partition: Partition,
    anchors: Anchors,
    families: [CurvatureFamily; 3],
    /// `∫₀^{wᵢ} κ`, the integral accumulated before each segment.
    prior_integral: [f64; 3],
}

impl TransitionPackage {
    /// Assemble a package.
    ///
    /// `hw_out` must already be the reversed (ease-out) family.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        partition: Partition,
        anchors: Anchors,
        hw_in: CurvatureFamily,
        core: CurvatureFamily,
        hw_out: CurvatureFamily,
    ) -> Self {
        let families = [hw_in, core, hw_out];
        let lengths = partition.lengths();
        let mut prior_integral = [0.0; 3];
        let mut acc = 0.0;
        for i in 0..3 {
            prior_integral[i] = acc;
            let (lo, hi) = anchors.interval(i);
            acc += lengths[i] * (lo + (hi - lo) * families[i].kappa_int(1.0));
        }
        Self {
            id: id.into(),
            partition,
            anchors,
            families,
            prior_integral,
        }
    }

    /// Transition type id as compiled (lowercase).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Normalized length partition.
    #[must_use]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Curvature anchors.
    #[must_use]
    pub fn anchors(&self) -> &Anchors {
        &self.anchors
    }

    /// Half-wave-in, core and (reversed) half-wave-out families.
    #[must_use]
    pub fn families(&self) -> &[CurvatureFamily; 3] {
        &self.families
    }

    /// Segment owning `u`, with the segment-local station in `[0, 1]`.
    ///
    /// Zero-length segments are never selected; a station on a join belongs
    /// to the later segment.
    fn locate(&self, u: f64) -> (usize, f64) {
        let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
        let lengths = self.partition.lengths();
        let starts = self.partition.starts();
        let mut owner = (0..3).find(|&i| lengths[i] > 0.0).unwrap_or(1);
        for i in 0..3 {
            if lengths[i] > 0.0 && starts[i] <= u {
                owner = i;
            }
        }
        let len = lengths[owner];
        let t = if len > 0.0 {
            ((u - starts[owner]) / len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (owner, t)
    }
}

impl CurvatureShape for TransitionPackage {
    fn kappa(&self, u: f64) -> f64 {
        let (i, t) = self.locate(u);
        let (lo, hi) = self.anchors.interval(i);
        lo + (hi - lo) * self.families[i].kappa(t)
    }

    fn kappa_prime(&self, u: f64) -> f64 {
        let (i, t) = self.locate(u);
        let (lo, hi) = self.anchors.interval(i);
        (hi - lo) / self.partition.share(i) * self.families[i].kappa_prime(t)
    }

    fn kappa2(&self, u: f64) -> f64 {
        let (i, t) = self.locate(u);
        let (lo, hi) = self.anchors.interval(i);
        let len = self.partition.share(i);
        (hi - lo) / (len * len) * self.families[i].kappa2(t)
    }

    fn kappa_int(&self, u: f64) -> f64 {
        let (i, t) = self.locate(u);
        let (lo, hi) = self.anchors.interval(i);
        let len = self.partition.share(i);
        self.prior_integral[i] + len * (lo * t + (hi - lo) * self.families[i].kappa_int(t))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::anchors::{JoinSlopes, compute_anchors_from_total};
    use crate::params::CompileParams;
    use crate::quadrature::integrate;
    use crate::QuadratureParams;
    use approx::assert_relative_eq;
    use shape_expr::Expr;

    fn family(coeffs: &[f64]) -> CurvatureFamily {
        let raw = Expr::Poly(coeffs.to_vec());
        CurvatureFamily::from_raw("test", &raw, &CompileParams::default()).unwrap()
    }

    fn smooth_quadratic() -> TransitionPackage {
        let params = CompileParams::default();
        let hw_in = family(&[0.0, 0.0, 1.0]);
        let core = family(&[0.0, 1.0]);
        let hw_out = family(&[0.0, 0.0, 1.0]).reversed();
        let partition = Partition::new([0.25, 0.5, 0.25]);
        let slopes = JoinSlopes::of(&hw_in, &core, &hw_out);
        let anchors = compute_anchors_from_total(&partition, &slopes, &params);
        TransitionPackage::new("smooth-quadratic", partition, anchors, hw_in, core, hw_out)
    }

    #[test]
    fn test_endpoints() {
        let pkg = smooth_quadratic();
        assert_relative_eq!(pkg.kappa(0.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(pkg.kappa(1.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pkg.kappa_int(0.0), 0.0, epsilon = 1e-12);
        // Point symmetric about (0.5, 0.5)
        assert_relative_eq!(pkg.kappa_int(1.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_c1_at_joins() {
        let pkg = smooth_quadratic();
        let h = 1e-9;
        for w in [0.25, 0.75] {
            assert_relative_eq!(pkg.kappa(w - h), pkg.kappa(w + h), epsilon = 1e-7);
            assert_relative_eq!(pkg.kappa_prime(w - h), pkg.kappa_prime(w + h), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_integral_matches_quadrature() {
        let pkg = smooth_quadratic();
        for u in [0.1, 0.25, 0.4, 0.75, 0.9, 1.0] {
            let q = integrate(|t| pkg.kappa(t), 0.0, u, &QuadratureParams::default());
            assert_relative_eq!(pkg.kappa_int(u), q.value, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_slope_matches_finite_difference() {
        let pkg = smooth_quadratic();
        let h = 1e-6;
        for u in [0.1, 0.3, 0.6, 0.9] {
            let fd = (pkg.kappa(u + h) - pkg.kappa(u - h)) / (2.0 * h);
            assert_relative_eq!(pkg.kappa_prime(u), fd, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_core_only_package_is_linear() {
        let params = CompileParams::default();
        let partition = Partition::core_only();
        let zero = CurvatureFamily::zero();
        let core = family(&[0.0, 1.0]);
        let slopes = JoinSlopes::of(&zero, &core, &zero);
        let anchors = compute_anchors_from_total(&partition, &slopes, &params);
        let pkg = TransitionPackage::new("clothoid", partition, anchors, zero.clone(), core, zero);
        for u in [0.0, 0.2, 0.5, 1.0] {
            assert_relative_eq!(pkg.kappa(u), u, epsilon = 1e-12);
            assert_relative_eq!(pkg.kappa_int(u), 0.5 * u * u, epsilon = 1e-12);
            assert_relative_eq!(pkg.kappa_prime(u), 1.0, epsilon = 1e-12);
        }
    }
}
