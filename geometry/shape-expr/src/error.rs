//! Error types for expression building and transformation.

use thiserror::Error;

/// Errors raised while building or transforming a shape expression.
///
/// Every variant is raised at build or transform time. Evaluating an
/// already-built expression never fails.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    /// The proto tree uses an operator the builder does not know.
    #[error("unknown operator '{op}' at {path}")]
    UnknownOp {
        /// Operator as written in the proto tree.
        op: String,
        /// Location of the node in the proto tree.
        path: String,
    },

    /// A `ref` node names a simple function missing from the table.
    #[error("unresolved reference '{name}' at {path}")]
    UnresolvedRef {
        /// Referenced simple-function name.
        name: String,
        /// Location of the node in the proto tree.
        path: String,
    },

    /// A symbolic constant other than `PI`/`TAU`.
    #[error("unknown symbol '{name}' at {path}")]
    UnknownSymbol {
        /// Symbol as written.
        name: String,
        /// Location of the node in the proto tree.
        path: String,
    },

    /// Operator applied to the wrong number of operands.
    #[error("operator '{op}' at {path} expects {expected} operand(s), got {actual}")]
    Arity {
        /// Operator name.
        op: String,
        /// Description of the accepted operand count.
        expected: &'static str,
        /// Number of operands provided.
        actual: usize,
        /// Location of the node in the proto tree.
        path: String,
    },

    /// Divisor does not fold to a constant.
    #[error("divisor at {path} is not constant")]
    NonConstantDivisor {
        /// Location of the divisor in the proto tree.
        path: String,
    },

    /// Divisor folds to zero.
    #[error("division by zero at {path}")]
    DivisionByZero {
        /// Location of the divisor in the proto tree.
        path: String,
    },

    /// Crop interval on a `ref` node is unusable.
    #[error("invalid crop on '{name}' at {path}: {reason}")]
    InvalidCrop {
        /// Referenced simple-function name.
        name: String,
        /// Location of the node in the proto tree.
        path: String,
        /// What is wrong with the interval.
        reason: String,
    },

    /// Node shape the symbolic engine cannot transform.
    #[error("unsupported expression node {node} for {operation}")]
    UnsupportedNode {
        /// Rendering of the offending node.
        node: String,
        /// Operation that was attempted (e.g. `integrate`).
        operation: &'static str,
    },
}

impl ExprError {
    /// Create an unknown operator error.
    #[must_use]
    pub fn unknown_op(op: impl Into<String>, path: impl Into<String>) -> Self {
        Self::UnknownOp {
            op: op.into(),
            path: path.into(),
        }
    }

    /// Create an unresolved reference error.
    #[must_use]
    pub fn unresolved_ref(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::UnresolvedRef {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Create an unsupported node error.
    #[must_use]
    pub fn unsupported(node: impl Into<String>, operation: &'static str) -> Self {
        Self::UnsupportedNode {
            node: node.into(),
            operation,
        }
    }

    /// Check if this is an unsupported node error.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedNode { .. })
    }

    /// Check if this is an unresolved reference error.
    #[must_use]
    pub fn is_unresolved_ref(&self) -> bool {
        matches!(self, Self::UnresolvedRef { .. })
    }

    /// Check if this error originates from a non-constant or zero divisor.
    #[must_use]
    pub fn is_bad_divisor(&self) -> bool {
        matches!(
            self,
            Self::NonConstantDivisor { .. } | Self::DivisionByZero { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExprError::unknown_op("pow", "root/args[0]");
        assert!(err.to_string().contains("'pow'"));
        assert!(err.to_string().contains("root/args[0]"));

        let err = ExprError::unsupported("Mul(Var, Var)", "integrate");
        assert!(err.to_string().contains("integrate"));
    }

    #[test]
    fn test_error_predicates() {
        let err = ExprError::unresolved_ref("bump", "root");
        assert!(err.is_unresolved_ref());
        assert!(!err.is_unsupported());

        let err = ExprError::DivisionByZero {
            path: "root/args[1]".into(),
        };
        assert!(err.is_bad_divisor());
    }
}
