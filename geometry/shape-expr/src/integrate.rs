//! Restricted symbolic integration.
//!
//! Computes `∫₀ᵘ f(t) dt` for polynomials, sums, constant multiples,
//! `sin`/`cos` of affine arguments and affine compositions of those. This is
//! not a general computer algebra system: anything else is rejected with
//! [`ExprError::UnsupportedNode`].

use std::f64::consts::TAU;

use crate::ast::Expr;
use crate::error::ExprError;
use crate::simplify::{poly, simplify};
use crate::Result;

/// Below this magnitude an affine slope is treated as zero.
const SLOPE_EPSILON: f64 = 1e-12;

/// Indefinite integral of `expr` anchored at zero, simplified.
///
/// The result `F` satisfies `F(0) = 0` and `F' = expr`.
///
/// # Errors
///
/// Returns [`ExprError::UnsupportedNode`] for products of two non-constant
/// factors and for trigonometric functions of non-affine arguments.
pub fn integrate(expr: &Expr) -> Result<Expr> {
    integrate_raw(&simplify(expr)).map(|e| simplify(&e))
}

fn integrate_raw(expr: &Expr) -> Result<Expr> {
    match expr {
        Expr::Const(c) => Ok(poly(vec![0.0, *c])),
        Expr::Var => Ok(poly(vec![0.0, 0.0, 0.5])),
        Expr::Poly(coeffs) => Ok(poly(
            std::iter::once(0.0)
                .chain(
                    coeffs
                        .iter()
                        .enumerate()
                        .map(|(k, c)| c / (k + 1) as f64),
                )
                .collect(),
        )),
        Expr::Add(a, b) => Ok(Expr::add(integrate_raw(a)?, integrate_raw(b)?)),
        Expr::Mul(a, b) => match (a.as_const(), b.as_const()) {
            (Some(c), _) => Ok(Expr::scale(c, integrate_raw(b)?)),
            (_, Some(c)) => Ok(Expr::scale(c, integrate_raw(a)?)),
            _ => Err(ExprError::unsupported(expr.to_string(), "integrate")),
        },
        Expr::Sin0 => Ok(Expr::add(
            Expr::Const(1.0 / TAU),
            Expr::scale(-1.0 / TAU, Expr::Cos0),
        )),
        Expr::Cos0 => Ok(Expr::scale(1.0 / TAU, Expr::Sin0)),
        Expr::Sin(arg) => {
            let (m, n) = affine_arg(expr, arg)?;
            if m.abs() < SLOPE_EPSILON {
                return Ok(poly(vec![0.0, n.sin()]));
            }
            // ∫₀ᵘ sin(mt + n) dt = (cos n - cos(mu + n)) / m
            Ok(Expr::add(
                Expr::Const(n.cos() / m),
                Expr::scale(-1.0 / m, Expr::Cos(arg.clone())),
            ))
        }
        Expr::Cos(arg) => {
            let (m, n) = affine_arg(expr, arg)?;
            if m.abs() < SLOPE_EPSILON {
                return Ok(poly(vec![0.0, n.cos()]));
            }
            // ∫₀ᵘ cos(mt + n) dt = (sin(mu + n) - sin n) / m
            Ok(Expr::add(
                Expr::Const(-n.sin() / m),
                Expr::scale(1.0 / m, Expr::Sin(arg.clone())),
            ))
        }
        Expr::Compose(inner, map) => {
            if map.alpha.abs() < SLOPE_EPSILON {
                return Ok(poly(vec![0.0, inner.eval(map.beta)]));
            }
            // ∫₀ᵘ f(αt + β) dt = (F(αu + β) - F(β)) / α
            let outer = integrate_raw(inner)?;
            let offset = outer.eval(map.beta);
            Ok(Expr::add(
                Expr::scale(1.0 / map.alpha, Expr::compose(outer, *map)),
                Expr::Const(-offset / map.alpha),
            ))
        }
    }
}

fn affine_arg(node: &Expr, arg: &Expr) -> Result<(f64, f64)> {
    arg.as_affine()
        .ok_or_else(|| ExprError::unsupported(node.to_string(), "integrate"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ast::Affine;
    use crate::diff::diff;
    use approx::assert_relative_eq;

    fn check_round_trip(f: &Expr) {
        let big_f = integrate(f).unwrap();
        assert_relative_eq!(big_f.eval(0.0), 0.0, epsilon = 1e-12);
        let back = diff(&big_f);
        for i in 0..=20 {
            let u = f64::from(i) / 20.0;
            assert_relative_eq!(back.eval(u), f.eval(u), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_polynomial_integral() {
        let f = Expr::Poly(vec![1.0, 2.0, 3.0]);
        assert_eq!(integrate(&f).unwrap(), Expr::Poly(vec![0.0, 1.0, 1.0, 1.0]));
        assert_eq!(integrate(&Expr::Const(2.0)).unwrap(), Expr::Poly(vec![0.0, 2.0]));
    }

    #[test]
    fn test_trig_integrals() {
        let f = Expr::Sin0;
        let big_f = integrate(&f).unwrap();
        // ∫₀^½ sin(2πt) dt = 1/π
        assert_relative_eq!(big_f.eval(0.5), 1.0 / std::f64::consts::PI, epsilon = 1e-12);
        check_round_trip(&f);
        check_round_trip(&Expr::Cos0);
    }

    #[test]
    fn test_affine_argument() {
        let arg = Expr::Poly(vec![0.3, 2.0]);
        check_round_trip(&Expr::sin(arg.clone()));
        check_round_trip(&Expr::cos(arg));
    }

    #[test]
    fn test_degenerate_slope() {
        let f = Expr::sin(Expr::Const(0.5));
        // sin of a constant folds away during simplification.
        let big_f = integrate(&f).unwrap();
        assert_relative_eq!(big_f.eval(2.0), 2.0 * 0.5_f64.sin(), epsilon = 1e-12);

        let f = Expr::cos(Expr::add(Expr::scale(0.0, Expr::Var), Expr::Const(0.25)));
        let big_f = integrate(&f).unwrap();
        assert_relative_eq!(big_f.eval(3.0), 3.0 * 0.25_f64.cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_compose() {
        check_round_trip(&Expr::compose(Expr::Cos0, Affine::onto(0.0, 0.25)));
        check_round_trip(&Expr::compose(Expr::Sin0, Affine::REFLECT));
        check_round_trip(&Expr::compose(
            Expr::add(Expr::Sin0, Expr::Poly(vec![0.0, 0.0, 1.0])),
            Affine::new(0.5, 0.1),
        ));
    }

    #[test]
    fn test_scaled_sum() {
        let f = Expr::add(
            Expr::scale(-1.0, Expr::compose(Expr::Cos0, Affine::onto(0.0, 0.5))),
            Expr::Const(1.0),
        );
        check_round_trip(&f);
    }

    #[test]
    fn test_general_product_is_unsupported() {
        let f = Expr::mul(Expr::Var, Expr::Sin0);
        let err = integrate(&f).unwrap_err();
        assert!(err.is_unsupported());

        let f = Expr::sin(Expr::Poly(vec![0.0, 0.0, 1.0]));
        assert!(integrate(&f).unwrap_err().is_unsupported());
    }
}
