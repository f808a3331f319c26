//! Building canonical expressions from declarative proto trees.
//!
//! A proto tree is the authoring format for curvature shapes. Leaves are
//! numbers, the symbolic constants `PI`/`TAU`, or references to named simple
//! functions (optionally cropped to a sub-domain). Interior nodes apply one of
//! the operators `+`/`add`, `-`/`sub`, `*`/`mul` and `/`/`div`.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{PI, TAU};
use std::hash::BuildHasher;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ast::{Affine, Expr};
use crate::error::ExprError;
use crate::simplify::simplify;
use crate::Result;

/// A named building block referenced from proto trees.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum SimpleFcn {
    /// Polynomial with coefficients ordered low to high degree.
    Poly {
        /// Coefficients.
        coeff: Vec<f64>,
    },
    /// `sin(2π·u)`.
    Sin,
    /// `cos(2π·u)`.
    Cos,
}

impl SimpleFcn {
    /// Polynomial simple function.
    #[must_use]
    pub fn poly(coeff: impl Into<Vec<f64>>) -> Self {
        Self::Poly {
            coeff: coeff.into(),
        }
    }

    /// The canonical expression for this function on `u ∈ [0, 1]`.
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        match self {
            Self::Poly { coeff } => simplify(&Expr::Poly(coeff.clone())),
            Self::Sin => Expr::Sin0,
            Self::Cos => Expr::Cos0,
        }
    }
}

/// Node of a declarative proto tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ProtoNode {
    /// Numeric literal.
    Number(f64),
    /// Symbolic constant, `PI` or `TAU`.
    Symbol(String),
    /// Reference to a simple function, optionally evaluated over `crop`.
    Ref {
        /// Simple-function name.
        #[cfg_attr(feature = "serde", serde(rename = "ref"))]
        name: String,
        /// Sub-domain `[a, b]` mapped onto `[0, 1]`.
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        crop: Option<[f64; 2]>,
    },
    /// Operator application.
    Op {
        /// Operator name.
        op: String,
        /// Operands.
        args: Vec<ProtoNode>,
    },
}

impl ProtoNode {
    /// Reference to a simple function over its full domain.
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref {
            name: name.into(),
            crop: None,
        }
    }

    /// Reference to a simple function cropped to `[a, b]`.
    #[must_use]
    pub fn cropped(name: impl Into<String>, a: f64, b: f64) -> Self {
        Self::Ref {
            name: name.into(),
            crop: Some([a, b]),
        }
    }

    /// Operator node.
    #[must_use]
    pub fn op(op: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Op {
            op: op.into(),
            args,
        }
    }

    /// Names of every simple function referenced in the tree.
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Ref { name, .. } => out.push(name),
            Self::Op { args, .. } => args.iter().for_each(|a| a.collect_refs(out)),
            Self::Number(_) | Self::Symbol(_) => {}
        }
    }
}

/// Lookup of simple functions by name.
pub trait SimpleFcnTable {
    /// Find the simple function registered under `name`.
    fn simple_fcn(&self, name: &str) -> Option<&SimpleFcn>;
}

impl SimpleFcnTable for BTreeMap<String, SimpleFcn> {
    fn simple_fcn(&self, name: &str) -> Option<&SimpleFcn> {
        self.get(name)
    }
}

impl<S: BuildHasher> SimpleFcnTable for HashMap<String, SimpleFcn, S> {
    fn simple_fcn(&self, name: &str) -> Option<&SimpleFcn> {
        self.get(name)
    }
}

/// Operators accepted in proto trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtoOp {
    /// `+` / `add`.
    Add,
    /// `-` / `sub`.
    Sub,
    /// `*` / `mul`.
    Mul,
    /// `/` / `div`.
    Div,
}

impl ProtoOp {
    /// Parse an operator name.
    #[must_use]
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "+" | "add" => Some(Self::Add),
            "-" | "sub" => Some(Self::Sub),
            "*" | "mul" => Some(Self::Mul),
            "/" | "div" => Some(Self::Div),
            _ => None,
        }
    }
}

/// Resolve a symbolic constant.
#[must_use]
pub fn symbol_value(name: &str) -> Option<f64> {
    if name.eq_ignore_ascii_case("pi") {
        Some(PI)
    } else if name.eq_ignore_ascii_case("tau") {
        Some(TAU)
    } else {
        None
    }
}

/// Build the canonical, simplified expression for a proto tree.
///
/// # Errors
///
/// Fails on unknown operators or symbols, unresolved references, bad crops,
/// wrong operand counts and divisors that do not fold to a non-zero constant.
pub fn build_proto_ast<T: SimpleFcnTable + ?Sized>(node: &ProtoNode, table: &T) -> Result<Expr> {
    build_at(node, table, "root").map(|e| simplify(&e))
}

fn build_at<T: SimpleFcnTable + ?Sized>(node: &ProtoNode, table: &T, path: &str) -> Result<Expr> {
    match node {
        ProtoNode::Number(v) => Ok(Expr::Const(*v)),
        ProtoNode::Symbol(name) => {
            symbol_value(name)
                .map(Expr::Const)
                .ok_or_else(|| ExprError::UnknownSymbol {
                    name: name.clone(),
                    path: path.to_string(),
                })
        }
        ProtoNode::Ref { name, crop } => {
            let base = table
                .simple_fcn(name)
                .ok_or_else(|| ExprError::unresolved_ref(name.as_str(), path))?
                .to_expr();
            match crop {
                None => Ok(base),
                Some([a, b]) => {
                    let reason = if !a.is_finite() || !b.is_finite() {
                        Some("bounds must be finite")
                    } else if a == b {
                        Some("interval is empty")
                    } else {
                        None
                    };
                    if let Some(reason) = reason {
                        return Err(ExprError::InvalidCrop {
                            name: name.clone(),
                            path: path.to_string(),
                            reason: reason.to_string(),
                        });
                    }
                    Ok(Expr::compose(base, Affine::onto(*a, *b)))
                }
            }
        }
        ProtoNode::Op { op, args } => {
            let kind = ProtoOp::parse(op).ok_or_else(|| ExprError::unknown_op(op.as_str(), path))?;
            let operands = args
                .iter()
                .enumerate()
                .map(|(i, a)| build_at(a, table, &format!("{path}/args[{i}]")))
                .collect::<Result<Vec<_>>>()?;
            apply_op(kind, op, operands, path)
        }
    }
}

fn apply_op(kind: ProtoOp, op: &str, operands: Vec<Expr>, path: &str) -> Result<Expr> {
    let arity = |expected: &'static str| ExprError::Arity {
        op: op.to_string(),
        expected,
        actual: operands.len(),
        path: path.to_string(),
    };

    match kind {
        ProtoOp::Add | ProtoOp::Mul => {
            let fold: fn(Expr, Expr) -> Expr = if kind == ProtoOp::Add {
                Expr::add
            } else {
                Expr::mul
            };
            let err = arity("at least 1");
            operands.into_iter().reduce(fold).ok_or(err)
        }
        ProtoOp::Sub => match <[Expr; 1]>::try_from(operands) {
            Ok([a]) => Ok(Expr::scale(-1.0, a)),
            Err(operands) => match <[Expr; 2]>::try_from(operands) {
                Ok([a, b]) => Ok(Expr::sub(a, b)),
                Err(operands) => Err(ExprError::Arity {
                    op: op.to_string(),
                    expected: "1 or 2",
                    actual: operands.len(),
                    path: path.to_string(),
                }),
            },
        },
        ProtoOp::Div => {
            let err = arity("exactly 2");
            let [num, den] = <[Expr; 2]>::try_from(operands).map_err(|_| err)?;
            let divisor_path = format!("{path}/args[1]");
            match simplify(&den).as_const() {
                Some(d) if d == 0.0 => Err(ExprError::DivisionByZero { path: divisor_path }),
                Some(d) => Ok(Expr::scale(1.0 / d, num)),
                None => Err(ExprError::NonConstantDivisor { path: divisor_path }),
            }
        }
    }
}
