//! Error types for family compilation and alignment construction.

use shape_expr::ExprError;
use thiserror::Error;

/// Errors that can occur while compiling curvature families or building
/// alignments.
///
/// All of these are configuration errors: they are raised when a table is
/// compiled or an alignment is assembled, never while evaluating stations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransitionError {
    /// Transition type id is not in the table (or was never compiled).
    #[error("unknown transition type '{id}'")]
    UnknownTransitionType {
        /// Requested transition type id.
        id: String,
    },

    /// Half-wave id referenced by a transition is not in the table.
    #[error("unknown half-wave '{id}' referenced by transition '{transition}'")]
    UnknownHalfWave {
        /// Half-wave id.
        id: String,
        /// Transition that referenced it.
        transition: String,
    },

    /// Proto function id is not in the table.
    #[error("unknown proto function '{id}'")]
    UnknownProto {
        /// Proto function id.
        id: String,
    },

    /// The raw shape cannot be range-normalized.
    #[error("degenerate range for '{half_wave}': k(0)={k0}, k(1)={k1} but shape is not constant")]
    DegenerateRange {
        /// Half-wave (or proto) whose range collapsed.
        half_wave: String,
        /// Raw value at `u = 0`.
        k0: f64,
        /// Raw value at `u = 1`.
        k1: f64,
    },

    /// The symbolic engine rejected a proto.
    #[error("expression error in proto '{proto}': {source}")]
    Expression {
        /// Proto function id.
        proto: String,
        /// Underlying expression error.
        #[source]
        source: ExprError,
    },

    /// The declarative table failed structural validation.
    #[error("malformed table at {path}: {reason}")]
    MalformedTable {
        /// Location inside the table (e.g. `transition/clothoid/lengths`).
        path: String,
        /// What is wrong.
        reason: String,
    },

    /// An element specification cannot be turned into an element.
    #[error("invalid element at index {index}: {reason}")]
    InvalidElement {
        /// Position of the element in the input list.
        index: usize,
        /// What is wrong.
        reason: String,
    },
}

impl TransitionError {
    /// Create an unknown transition type error.
    #[must_use]
    pub fn unknown_transition(id: impl Into<String>) -> Self {
        Self::UnknownTransitionType { id: id.into() }
    }

    /// Create a malformed table error.
    #[must_use]
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid element error.
    #[must_use]
    pub fn invalid_element(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidElement {
            index,
            reason: reason.into(),
        }
    }

    /// Wrap an expression error raised while compiling `proto`.
    #[must_use]
    pub fn expression(proto: impl Into<String>, source: ExprError) -> Self {
        Self::Expression {
            proto: proto.into(),
            source,
        }
    }

    /// Check if this is an unknown transition type error.
    #[must_use]
    pub fn is_unknown_transition(&self) -> bool {
        matches!(self, Self::UnknownTransitionType { .. })
    }

    /// Check if the symbolic engine met a node it cannot handle.
    #[must_use]
    pub fn is_unsupported_expression(&self) -> bool {
        matches!(self, Self::Expression { source, .. } if source.is_unsupported())
    }

    /// Check if this is a malformed table error.
    #[must_use]
    pub fn is_malformed_table(&self) -> bool {
        matches!(self, Self::MalformedTable { .. })
    }

    /// Check if this is a degenerate range error.
    #[must_use]
    pub fn is_degenerate_range(&self) -> bool {
        matches!(self, Self::DegenerateRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransitionError::unknown_transition("bloss");
        assert!(err.to_string().contains("'bloss'"));

        let err = TransitionError::malformed("halfWave/cosine/proto", "missing proto");
        assert!(err.to_string().contains("halfWave/cosine/proto"));

        let err = TransitionError::DegenerateRange {
            half_wave: "bump".into(),
            k0: 1.0,
            k1: 1.0,
        };
        assert!(err.to_string().contains("bump"));
    }

    #[test]
    fn test_error_predicates() {
        let err = TransitionError::expression(
            "wobble",
            ExprError::unsupported("(u * sin(2πu))", "integrate"),
        );
        assert!(err.is_unsupported_expression());
        assert!(!err.is_malformed_table());

        let err = TransitionError::expression("wobble", ExprError::unresolved_ref("x", "root"));
        assert!(!err.is_unsupported_expression());

        assert!(TransitionError::unknown_transition("x").is_unknown_transition());
    }
}
