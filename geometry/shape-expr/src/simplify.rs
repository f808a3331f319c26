//! Local constant folding and identity elimination.
//!
//! Applied after every differentiation or integration pass so that trees stay
//! small. Rewrites are purely local and never change the value of the
//! expression for finite inputs.

use crate::ast::{Affine, Expr};

/// Simplify an expression bottom-up.
#[must_use]
pub fn simplify(expr: &Expr) -> Expr {
    match expr {
        Expr::Const(_) | Expr::Var | Expr::Sin0 | Expr::Cos0 => expr.clone(),
        Expr::Poly(coeffs) => poly(coeffs.clone()),
        Expr::Add(a, b) => simplify_add(simplify(a), simplify(b)),
        Expr::Mul(a, b) => simplify_mul(simplify(a), simplify(b)),
        Expr::Sin(arg) => match simplify(arg) {
            Expr::Const(c) => Expr::Const(c.sin()),
            arg => Expr::sin(arg),
        },
        Expr::Cos(arg) => match simplify(arg) {
            Expr::Const(c) => Expr::Const(c.cos()),
            arg => Expr::cos(arg),
        },
        Expr::Compose(inner, map) => simplify_compose(simplify(inner), *map),
    }
}

/// Build a polynomial node in canonical form.
///
/// Trailing zero coefficients are dropped, and degree 0 and `[0, 1]`
/// collapse to `Const` and `Var`.
#[must_use]
pub fn poly(mut coeffs: Vec<f64>) -> Expr {
    while coeffs.last() == Some(&0.0) {
        coeffs.pop();
    }
    match coeffs.as_slice() {
        [] => Expr::Const(0.0),
        [c] => Expr::Const(*c),
        [c0, c1] if *c0 == 0.0 && *c1 == 1.0 => Expr::Var,
        _ => Expr::Poly(coeffs),
    }
}

/// Coefficients of a polynomial-like node.
fn as_poly(expr: &Expr) -> Option<Vec<f64>> {
    match expr {
        Expr::Const(c) => Some(vec![*c]),
        Expr::Var => Some(vec![0.0, 1.0]),
        Expr::Poly(coeffs) => Some(coeffs.clone()),
        _ => None,
    }
}

fn simplify_add(a: Expr, b: Expr) -> Expr {
    match (&a, &b) {
        (Expr::Const(x), Expr::Const(y)) => return Expr::Const(x + y),
        (Expr::Const(z), _) if *z == 0.0 => return b,
        (_, Expr::Const(z)) if *z == 0.0 => return a,
        _ => {}
    }
    if let (Some(pa), Some(pb)) = (as_poly(&a), as_poly(&b)) {
        let len = pa.len().max(pb.len());
        let sum = (0..len)
            .map(|i| pa.get(i).copied().unwrap_or(0.0) + pb.get(i).copied().unwrap_or(0.0))
            .collect();
        return poly(sum);
    }
    Expr::add(a, b)
}

fn simplify_mul(a: Expr, b: Expr) -> Expr {
    // Canonical order: constant factor on the left.
    let (a, b) = if !a.is_const() && b.is_const() {
        (b, a)
    } else {
        (a, b)
    };

    let Some(c) = a.as_const() else {
        return Expr::mul(a, b);
    };

    if c == 0.0 {
        return Expr::Const(0.0);
    }
    if c == 1.0 {
        return b;
    }
    match b {
        Expr::Const(d) => Expr::Const(c * d),
        Expr::Var | Expr::Poly(_) => {
            let coeffs = as_poly(&b).unwrap_or_default();
            poly(coeffs.into_iter().map(|k| k * c).collect())
        }
        Expr::Mul(inner_a, inner_b) => match inner_a.as_const() {
            Some(d) => simplify_mul(Expr::Const(c * d), *inner_b),
            None => Expr::mul(Expr::Const(c), Expr::Mul(inner_a, inner_b)),
        },
        other => Expr::mul(Expr::Const(c), other),
    }
}

fn simplify_compose(inner: Expr, map: Affine) -> Expr {
    if map.is_identity() {
        return inner;
    }
    match inner {
        Expr::Const(c) => Expr::Const(c),
        Expr::Var | Expr::Poly(_) => {
            let coeffs = as_poly(&inner).unwrap_or_default();
            poly(compose_poly(&coeffs, map))
        }
        Expr::Compose(f, inner_map) => simplify_compose(*f, inner_map.after(&map)),
        other => Expr::compose(other, map),
    }
}

/// Coefficients of `p(alpha·u + beta)`.
fn compose_poly(coeffs: &[f64], map: Affine) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(coeffs.len());
    for &c in coeffs.iter().rev() {
        // out = out * (alpha·u + beta) + c
        let mut next = vec![0.0; out.len() + 1];
        for (i, &k) in out.iter().enumerate() {
            next[i] += k * map.beta;
            next[i + 1] += k * map.alpha;
        }
        next[0] += c;
        out = next;
    }
    out
}
