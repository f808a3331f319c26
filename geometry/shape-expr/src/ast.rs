//! Canonical expression tree in one free variable `u`.

use std::f64::consts::TAU;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Affine map `u ↦ alpha·u + beta` applied by [`Expr::Compose`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Affine {
    /// Scale.
    pub alpha: f64,
    /// Offset.
    pub beta: f64,
}

impl Affine {
    /// The identity map.
    pub const IDENTITY: Self = Self {
        alpha: 1.0,
        beta: 0.0,
    };

    /// The reflection `u ↦ 1 - u`.
    pub const REFLECT: Self = Self {
        alpha: -1.0,
        beta: 1.0,
    };

    /// Create an affine map.
    #[must_use]
    pub const fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Map that sends `[0, 1]` onto `[a, b]`.
    #[must_use]
    pub fn onto(a: f64, b: f64) -> Self {
        Self::new(b - a, a)
    }

    /// Apply the map.
    #[must_use]
    pub fn apply(&self, u: f64) -> f64 {
        self.alpha.mul_add(u, self.beta)
    }

    /// `self ∘ inner`, i.e. `u ↦ self(inner(u))`.
    #[must_use]
    pub fn after(&self, inner: &Self) -> Self {
        Self::new(
            self.alpha * inner.alpha,
            self.alpha.mul_add(inner.beta, self.beta),
        )
    }

    /// Check for the identity map.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.alpha == 1.0 && self.beta == 0.0
    }
}

/// A node of the canonical shape expression tree.
///
/// All nodes are pure functions of the free variable `u`. Evaluation is total:
/// pathological inputs may yield non-finite values but never fail.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// Constant value.
    Const(f64),
    /// The free variable `u`.
    Var,
    /// Sum of two expressions.
    Add(Box<Expr>, Box<Expr>),
    /// Product of two expressions.
    Mul(Box<Expr>, Box<Expr>),
    /// Polynomial in `u`, coefficients ordered low to high degree.
    Poly(Vec<f64>),
    /// `sin(2π·u)`.
    Sin0,
    /// `cos(2π·u)`.
    Cos0,
    /// `sin(arg)`.
    Sin(Box<Expr>),
    /// `cos(arg)`.
    Cos(Box<Expr>),
    /// `expr(alpha·u + beta)`.
    Compose(Box<Expr>, Affine),
}

impl Expr {
    /// Constant node.
    #[must_use]
    pub const fn constant(value: f64) -> Self {
        Self::Const(value)
    }

    /// `a + b`.
    #[must_use]
    pub fn add(a: Self, b: Self) -> Self {
        Self::Add(Box::new(a), Box::new(b))
    }

    /// `a · b`.
    #[must_use]
    pub fn mul(a: Self, b: Self) -> Self {
        Self::Mul(Box::new(a), Box::new(b))
    }

    /// `c · a`.
    #[must_use]
    pub fn scale(c: f64, a: Self) -> Self {
        Self::mul(Self::Const(c), a)
    }

    /// `a - b`.
    #[must_use]
    pub fn sub(a: Self, b: Self) -> Self {
        Self::add(a, Self::scale(-1.0, b))
    }

    /// `sin(arg)`.
    #[must_use]
    pub fn sin(arg: Self) -> Self {
        Self::Sin(Box::new(arg))
    }

    /// `cos(arg)`.
    #[must_use]
    pub fn cos(arg: Self) -> Self {
        Self::Cos(Box::new(arg))
    }

    /// `inner(alpha·u + beta)`.
    #[must_use]
    pub fn compose(inner: Self, map: Affine) -> Self {
        Self::Compose(Box::new(inner), map)
    }

    /// Return the value if this node is a constant.
    #[must_use]
    pub fn as_const(&self) -> Option<f64> {
        match self {
            Self::Const(c) => Some(*c),
            _ => None,
        }
    }

    /// Check for a constant node.
    #[must_use]
    pub fn is_const(&self) -> bool {
        matches!(self, Self::Const(_))
    }

    /// Interpret the node as `m·u + n`, if it is affine in `u`.
    ///
    /// Recognizes constants, the variable, degree ≤ 1 polynomials, sums,
    /// constant multiples and compositions of those.
    #[must_use]
    pub fn as_affine(&self) -> Option<(f64, f64)> {
        match self {
            Self::Const(c) => Some((0.0, *c)),
            Self::Var => Some((1.0, 0.0)),
            Self::Poly(coeffs) => {
                if coeffs.iter().skip(2).any(|c| *c != 0.0) {
                    return None;
                }
                let n = coeffs.first().copied().unwrap_or(0.0);
                let m = coeffs.get(1).copied().unwrap_or(0.0);
                Some((m, n))
            }
            Self::Add(a, b) => {
                let (ma, na) = a.as_affine()?;
                let (mb, nb) = b.as_affine()?;
                Some((ma + mb, na + nb))
            }
            Self::Mul(a, b) => match (a.as_const(), b.as_const()) {
                (Some(c), _) => b.as_affine().map(|(m, n)| (c * m, c * n)),
                (_, Some(c)) => a.as_affine().map(|(m, n)| (c * m, c * n)),
                _ => None,
            },
            Self::Compose(inner, map) => {
                let (m, n) = inner.as_affine()?;
                Some((m * map.alpha, m.mul_add(map.beta, n)))
            }
            Self::Sin0 | Self::Cos0 | Self::Sin(_) | Self::Cos(_) => None,
        }
    }

    /// Evaluate the expression at `u` by structural recursion.
    #[must_use]
    pub fn eval(&self, u: f64) -> f64 {
        match self {
            Self::Const(c) => *c,
            Self::Var => u,
            Self::Add(a, b) => a.eval(u) + b.eval(u),
            Self::Mul(a, b) => a.eval(u) * b.eval(u),
            Self::Poly(coeffs) => horner(coeffs, u),
            Self::Sin0 => (TAU * u).sin(),
            Self::Cos0 => (TAU * u).cos(),
            Self::Sin(arg) => arg.eval(u).sin(),
            Self::Cos(arg) => arg.eval(u).cos(),
            Self::Compose(inner, map) => inner.eval(map.apply(u)),
        }
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Const(_) | Self::Var | Self::Poly(_) | Self::Sin0 | Self::Cos0 => 1,
            Self::Add(a, b) | Self::Mul(a, b) => 1 + a.node_count() + b.node_count(),
            Self::Sin(a) | Self::Cos(a) | Self::Compose(a, _) => 1 + a.node_count(),
        }
    }
}

/// Evaluate a low-to-high coefficient polynomial with Horner's scheme.
pub(crate) fn horner(coeffs: &[f64], u: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc.mul_add(u, *c))
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(c) => write!(f, "{c}"),
            Self::Var => write!(f, "u"),
            Self::Add(a, b) => write!(f, "({a} + {b})"),
            Self::Mul(a, b) => write!(f, "({a} * {b})"),
            Self::Poly(coeffs) => write!(f, "poly{coeffs:?}"),
            Self::Sin0 => write!(f, "sin(2πu)"),
            Self::Cos0 => write!(f, "cos(2πu)"),
            Self::Sin(a) => write!(f, "sin({a})"),
            Self::Cos(a) => write!(f, "cos({a})"),
            Self::Compose(a, map) => write!(f, "{a}∘({}u + {})", map.alpha, map.beta),
        }
    }
}
