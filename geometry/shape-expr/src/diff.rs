//! Exact structural differentiation with respect to `u`.

use std::f64::consts::TAU;

use crate::ast::Expr;
use crate::simplify::{poly, simplify};

/// Derivative of `expr` with respect to `u`, simplified.
///
/// Every node kind is supported, so differentiation never fails.
#[must_use]
pub fn diff(expr: &Expr) -> Expr {
    simplify(&diff_raw(expr))
}

/// `n`-th derivative of `expr`.
#[must_use]
pub fn diff_n(expr: &Expr, n: usize) -> Expr {
    (0..n).fold(simplify(expr), |acc, _| diff(&acc))
}

fn diff_raw(expr: &Expr) -> Expr {
    match expr {
        Expr::Const(_) => Expr::Const(0.0),
        Expr::Var => Expr::Const(1.0),
        Expr::Add(a, b) => Expr::add(diff_raw(a), diff_raw(b)),
        Expr::Mul(a, b) => Expr::add(
            Expr::mul(diff_raw(a), (**b).clone()),
            Expr::mul((**a).clone(), diff_raw(b)),
        ),
        Expr::Poly(coeffs) => poly(
            coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(k, c)| c * k as f64)
                .collect(),
        ),
        Expr::Sin0 => Expr::scale(TAU, Expr::Cos0),
        Expr::Cos0 => Expr::scale(-TAU, Expr::Sin0),
        Expr::Sin(arg) => Expr::mul(diff_raw(arg), Expr::Cos(arg.clone())),
        Expr::Cos(arg) => Expr::scale(-1.0, Expr::mul(diff_raw(arg), Expr::Sin(arg.clone()))),
        Expr::Compose(inner, map) => {
            Expr::scale(map.alpha, Expr::compose(diff_raw(inner), *map))
        }
    }
}
