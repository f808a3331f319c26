//! Symbolic curvature-shape expressions.
//!
//! This crate is the closed-form backbone of transition-curve families. It
//! turns declarative proto trees into a small canonical expression tree in one
//! variable `u` and offers exact operations on that tree:
//!
//! - [`build_proto_ast`] - Resolve a proto tree against named simple functions
//! - [`Expr::eval`] / [`make_eval_fn`] - Evaluate directly or compile once
//! - [`diff`] - Exact derivative (sum, product and chain rules)
//! - [`integrate`] - Restricted indefinite integral anchored at `u = 0`
//! - [`simplify`] - Constant folding and identity elimination
//!
//! Every unsupported construct is rejected when the expression is built or
//! transformed. Evaluation of a built expression is total.
//!
//! # Example
//!
//! ```
//! use shape_expr::{build_proto_ast, diff, integrate, make_eval_fn, ProtoNode, SimpleFcn};
//! use std::collections::BTreeMap;
//!
//! let mut table = BTreeMap::new();
//! table.insert("cos".to_string(), SimpleFcn::Cos);
//!
//! // 1 - cos(πu/2): a quarter-wave ease-in
//! let proto = ProtoNode::op(
//!     "-",
//!     vec![ProtoNode::Number(1.0), ProtoNode::cropped("cos", 0.0, 0.25)],
//! );
//! let kappa = build_proto_ast(&proto, &table).unwrap();
//! let slope = make_eval_fn(&diff(&kappa));
//! let area = make_eval_fn(&integrate(&kappa).unwrap());
//!
//! assert!((slope.call(1.0) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
//! assert!(area.call(0.0).abs() < 1e-12);
//! ```
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no geometry and no engine dependencies.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization of proto trees and ASTs

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::cast_precision_loss,
    clippy::float_cmp,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::suboptimal_flops
)]

mod ast;
mod build;
mod compile;
mod diff;
mod error;
mod integrate;
mod simplify;

pub use ast::{Affine, Expr};
pub use build::{ProtoNode, ProtoOp, SimpleFcn, SimpleFcnTable, build_proto_ast, symbol_value};
pub use compile::{CompiledFn, make_eval_fn};
pub use diff::{diff, diff_n};
pub use error::ExprError;
pub use integrate::integrate;
pub use simplify::{poly, simplify};

/// Result type for expression operations.
pub type Result<T> = std::result::Result<T, ExprError>;
