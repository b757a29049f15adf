//! Error types for search planning.

use std::fmt;

use thiserror::Error;

/// Which length-limited clause of the index query overflowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    /// The entity type clause (`v."__typeName":...`).
    Types,
    /// The classification trait clause (`v."__traitNames":...`).
    Tags,
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClauseKind::Types => f.write_str("types"),
            ClauseKind::Tags => f.write_str("tags"),
        }
    }
}

/// Errors that fail a plan.
///
/// Per-leaf data problems (unresolvable attributes, unsupported operators)
/// never surface here; they degrade into diagnostics on the context. Only
/// structural invariant violations are errors.
#[derive(Debug, Clone, Error)]
pub enum PlanError {
    /// The emitted index query contains a stray-connector pattern.
    #[error("malformed index query (stray pattern `{pattern}`): {query}")]
    MalformedEmission {
        /// The pattern that matched.
        pattern: &'static str,
        /// The offending query string.
        query: String,
    },

    /// A type or trait clause exceeded its configured length limit.
    #[error("{kind} clause length {length} exceeds configured limit {limit}")]
    ClauseTooLong {
        /// Which clause overflowed.
        kind: ClauseKind,
        /// The rendered clause length.
        length: usize,
        /// The configured limit.
        limit: usize,
    },

    /// A pipeline stage failed to produce or refine candidates.
    #[error("search stage failed: {0}")]
    StageFailed(String),
}

/// Result type for planning operations.
pub type PlanResult<T> = Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PlanError::ClauseTooLong { kind: ClauseKind::Types, length: 600, limit: 512 };
        assert_eq!(err.to_string(), "types clause length 600 exceeds configured limit 512");

        let err = PlanError::MalformedEmission {
            pattern: r"\(\s*\)",
            query: "v.\"a\": x AND ( )".to_string(),
        };
        assert!(err.to_string().contains("stray pattern"));
    }
}
