//! Range-normalized curvature families.
//!
//! A family bundles four closed-form evaluators over `u ∈ [0, 1]`: the
//! normalized curvature `κ(u)`, its first and second derivatives, and its
//! integral from zero. All four are derived symbolically from one raw shape,
//! so they are exact with respect to each other.

use std::fmt;

use shape_expr::{Affine, CompiledFn, Expr, diff, diff_n, simplify};

use crate::error::TransitionError;
use crate::params::CompileParams;
use crate::Result;

/// A normalized curvature shape sampled by stations in `[0, 1]`.
///
/// Implemented by single families and by whole transition packages so that
/// quasi elements can be driven by either.
pub trait CurvatureShape: fmt::Debug + Send + Sync {
    /// Normalized curvature `κ(u)`.
    fn kappa(&self, u: f64) -> f64;

    /// First derivative `dκ/du`.
    fn kappa_prime(&self, u: f64) -> f64;

    /// Second derivative `d²κ/du²`.
    fn kappa2(&self, u: f64) -> f64;

    /// Integral `∫₀ᵘ κ(t) dt`.
    fn kappa_int(&self, u: f64) -> f64;
}

/// Four exact evaluators of one normalized curvature shape.
///
/// After normalization `κ(0) = 0` and `κ(1) = 1`, except for the degenerate
/// all-zero family produced from a constant raw shape.
#[derive(Debug, Clone)]
pub struct CurvatureFamily {
    kappa: CompiledFn,
    kappa1: CompiledFn,
    kappa2: CompiledFn,
    kappa_int: CompiledFn,
    degenerate: bool,
}

impl CurvatureFamily {
    /// Build a family from already-normalized expressions.
    ///
    /// The expressions are taken as given; no consistency check is made.
    #[must_use]
    pub fn from_exprs(kappa: &Expr, kappa1: &Expr, kappa2: &Expr, kappa_int: &Expr) -> Self {
        Self {
            kappa: CompiledFn::new(kappa),
            kappa1: CompiledFn::new(kappa1),
            kappa2: CompiledFn::new(kappa2),
            kappa_int: CompiledFn::new(kappa_int),
            degenerate: false,
        }
    }

    /// The degenerate family `κ ≡ 0`.
    #[must_use]
    pub fn zero() -> Self {
        let zero = Expr::Const(0.0);
        Self {
            degenerate: true,
            ..Self::from_exprs(&zero, &zero, &zero, &zero)
        }
    }

    /// Range-normalize a raw shape `k(u)` into `(k(u) - k(0)) / (k(1) - k(0))`.
    ///
    /// A constant raw shape yields [`CurvatureFamily::zero`].
    ///
    /// # Errors
    ///
    /// - [`TransitionError::DegenerateRange`] if `k(1) ≈ k(0)` but the shape is
    ///   not constant.
    /// - [`TransitionError::Expression`] if the shape cannot be integrated.
    pub fn from_raw(name: &str, raw: &Expr, params: &CompileParams) -> Result<Self> {
        let raw = simplify(raw);
        let k0 = raw.eval(0.0);
        let k1 = raw.eval(1.0);
        let range = k1 - k0;

        if range.abs() < params.range_epsilon {
            if is_constant(&raw, k0, params) {
                return Ok(Self::zero());
            }
            return Err(TransitionError::DegenerateRange {
                half_wave: name.to_string(),
                k0,
                k1,
            });
        }

        let scale = 1.0 / range;
        let integral =
            shape_expr::integrate(&raw).map_err(|e| TransitionError::expression(name, e))?;

        let kappa = Expr::scale(scale, Expr::add(raw.clone(), Expr::Const(-k0)));
        let kappa1 = Expr::scale(scale, diff(&raw));
        let kappa2 = Expr::scale(scale, diff_n(&raw, 2));
        let kappa_int = Expr::scale(scale, Expr::add(integral, Expr::Poly(vec![0.0, -k0])));

        Ok(Self::from_exprs(
            &simplify(&kappa),
            &simplify(&kappa1),
            &simplify(&kappa2),
            &simplify(&kappa_int),
        ))
    }

    /// The point-reflected family `u ↦ 1 - κ(1 - u)`.
    ///
    /// Turns an ease-in shape into the matching ease-out shape:
    /// `κ'` becomes `κ'(1 - u)`, `κ''` becomes `-κ''(1 - u)` and the integral
    /// becomes `u - I(1) + I(1 - u)`.
    #[must_use]
    pub fn reversed(&self) -> Self {
        if self.degenerate {
            return self.clone();
        }
        let reflect = |f: &CompiledFn| Expr::compose(f.expr().clone(), Affine::REFLECT);
        let total = self.kappa_int.call(1.0);

        let kappa = Expr::sub(Expr::Const(1.0), reflect(&self.kappa));
        let kappa1 = reflect(&self.kappa1);
        let kappa2 = Expr::scale(-1.0, reflect(&self.kappa2));
        let kappa_int = Expr::add(Expr::Poly(vec![-total, 1.0]), reflect(&self.kappa_int));

        Self::from_exprs(
            &simplify(&kappa),
            &simplify(&kappa1),
            &simplify(&kappa2),
            &simplify(&kappa_int),
        )
    }

    /// Whether this is the all-zero family.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Expression behind `κ`.
    #[must_use]
    pub fn kappa_expr(&self) -> &Expr {
        self.kappa.expr()
    }

    /// Expression behind `κ'`.
    #[must_use]
    pub fn kappa1_expr(&self) -> &Expr {
        self.kappa1.expr()
    }

    /// Expression behind `∫κ`.
    #[must_use]
    pub fn kappa_int_expr(&self) -> &Expr {
        self.kappa_int.expr()
    }
}

impl CurvatureShape for CurvatureFamily {
    fn kappa(&self, u: f64) -> f64 {
        self.kappa.call(u)
    }

    fn kappa_prime(&self, u: f64) -> f64 {
        self.kappa1.call(u)
    }

    fn kappa2(&self, u: f64) -> f64 {
        self.kappa2.call(u)
    }

    fn kappa_int(&self, u: f64) -> f64 {
        self.kappa_int.call(u)
    }
}

/// Decide whether `raw` is constant on `[0, 1]`.
fn is_constant(raw: &Expr, k0: f64, params: &CompileParams) -> bool {
    if diff(raw).as_const() == Some(0.0) {
        return true;
    }
    let n = params.constancy_samples.max(2);
    (0..=n).all(|i| {
        let u = i as f64 / n as f64;
        (raw.eval(u) - k0).abs() < params.range_epsilon
    })
}
