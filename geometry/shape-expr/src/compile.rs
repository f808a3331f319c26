//! Compilation of expression trees into callable evaluators.

use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

use crate::ast::{Expr, horner};

type Eval = dyn Fn(f64) -> f64 + Send + Sync;

/// A compiled evaluator `u ↦ value`.
///
/// Built once from an [`Expr`] by structural recursion into a tree of
/// closures. Cloning is cheap and the evaluator can be shared across threads.
#[derive(Clone)]
pub struct CompiledFn {
    eval: Arc<Eval>,
    source: Arc<Expr>,
}

impl CompiledFn {
    /// Compile an expression.
    #[must_use]
    pub fn new(expr: &Expr) -> Self {
        Self {
            eval: Arc::from(compile_node(expr)),
            source: Arc::new(expr.clone()),
        }
    }

    /// Evaluate at `u`.
    #[inline]
    #[must_use]
    pub fn call(&self, u: f64) -> f64 {
        (self.eval)(u)
    }

    /// The expression this evaluator was compiled from.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.source
    }
}

impl fmt::Debug for CompiledFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompiledFn").field(&*self.source).finish()
    }
}

/// Compile an expression into a boxed closure `u ↦ value`.
#[must_use]
pub fn make_eval_fn(expr: &Expr) -> CompiledFn {
    CompiledFn::new(expr)
}

fn compile_node(expr: &Expr) -> Box<Eval> {
    match expr {
        Expr::Const(c) => {
            let c = *c;
            Box::new(move |_| c)
        }
        Expr::Var => Box::new(|u| u),
        Expr::Add(a, b) => {
            let (fa, fb) = (compile_node(a), compile_node(b));
            Box::new(move |u| fa(u) + fb(u))
        }
        Expr::Mul(a, b) => match a.as_const() {
            Some(c) => {
                let fb = compile_node(b);
                Box::new(move |u| c * fb(u))
            }
            None => {
                let (fa, fb) = (compile_node(a), compile_node(b));
                Box::new(move |u| fa(u) * fb(u))
            }
        },
        Expr::Poly(coeffs) => {
            let coeffs = coeffs.clone();
            Box::new(move |u| horner(&coeffs, u))
        }
        Expr::Sin0 => Box::new(|u| (TAU * u).sin()),
        Expr::Cos0 => Box::new(|u| (TAU * u).cos()),
        Expr::Sin(arg) => {
            let fa = compile_node(arg);
            Box::new(move |u| fa(u).sin())
        }
        Expr::Cos(arg) => {
            let fa = compile_node(arg);
            Box::new(move |u| fa(u).cos())
        }
        Expr::Compose(inner, map) => {
            let fi = compile_node(inner);
            let map = *map;
            Box::new(move |u| fi(map.apply(u)))
        }
    }
}
