//! Filter operators and group combinators.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A leaf predicate operator.
///
/// The set is closed: these are exactly the operators the rule-builder UI
/// can produce. Each backend maps them through its own template table; an
/// operator a backend cannot express is rejected there with a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    /// Strictly less than.
    Lt,
    /// Strictly greater than.
    Gt,
    /// Less than or equal.
    Lte,
    /// Greater than or equal.
    Gte,
    /// Equal.
    Eq,
    /// Not equal.
    Neq,
    /// Membership in a caller-rendered list.
    In,
    /// Pattern match; the value is treated as a regex fragment.
    Like,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Substring match.
    Contains,
}

impl FilterOperator {
    /// Returns the wire name of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Lt => "LT",
            FilterOperator::Gt => "GT",
            FilterOperator::Lte => "LTE",
            FilterOperator::Gte => "GTE",
            FilterOperator::Eq => "EQ",
            FilterOperator::Neq => "NEQ",
            FilterOperator::In => "IN",
            FilterOperator::Like => "LIKE",
            FilterOperator::StartsWith => "STARTS_WITH",
            FilterOperator::EndsWith => "ENDS_WITH",
            FilterOperator::Contains => "CONTAINS",
        }
    }

    /// All operators, in wire order. Useful for exhaustive tests.
    #[must_use]
    pub const fn all() -> [FilterOperator; 11] {
        [
            FilterOperator::Lt,
            FilterOperator::Gt,
            FilterOperator::Lte,
            FilterOperator::Gte,
            FilterOperator::Eq,
            FilterOperator::Neq,
            FilterOperator::In,
            FilterOperator::Like,
            FilterOperator::StartsWith,
            FilterOperator::EndsWith,
            FilterOperator::Contains,
        ]
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a group combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Combinator {
    /// All children must hold.
    And,
    /// At least one child must hold.
    Or,
}

impl Combinator {
    /// Returns the wire name of the combinator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
