//! Filter expression trees.

use serde::{Deserialize, Serialize};

use super::{Combinator, FilterOperator};

/// A node in a filter expression tree.
///
/// Leaves are `(attribute, operator, value)` predicates; groups combine an
/// ordered sequence of children with a single [`Combinator`]. Child order is
/// preserved and affects emitted query text, never semantics.
///
/// A group with no children contributes nothing to any backend; a leaf whose
/// attribute cannot be resolved contributes nothing and raises a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    /// A combinator over an ordered sequence of child nodes.
    Group {
        /// How the children combine.
        condition: Combinator,
        /// The children, in emission order.
        #[serde(default)]
        criterion: Vec<FilterNode>,
    },
    /// A leaf predicate.
    #[serde(rename_all = "camelCase")]
    Cond {
        /// The (unqualified) attribute name.
        attribute_name: String,
        /// The predicate operator.
        operator: FilterOperator,
        /// The raw value, as sent by the UI.
        attribute_value: String,
    },
}

impl FilterNode {
    /// Creates a leaf predicate.
    #[must_use]
    pub fn cond(
        attribute_name: impl Into<String>,
        operator: FilterOperator,
        attribute_value: impl Into<String>,
    ) -> Self {
        FilterNode::Cond {
            attribute_name: attribute_name.into(),
            operator,
            attribute_value: attribute_value.into(),
        }
    }

    /// Creates an AND group.
    #[must_use]
    pub fn all_of(criterion: Vec<FilterNode>) -> Self {
        FilterNode::Group { condition: Combinator::And, criterion }
    }

    /// Creates an OR group.
    #[must_use]
    pub fn any_of(criterion: Vec<FilterNode>) -> Self {
        FilterNode::Group { condition: Combinator::Or, criterion }
    }

    /// Iterates over every leaf in pre-order.
    pub fn leaves(&self) -> impl Iterator<Item = (&str, FilterOperator, &str)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out.into_iter()
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<(&'a str, FilterOperator, &'a str)>) {
        match self {
            FilterNode::Group { criterion, .. } => {
                for child in criterion {
                    child.collect_leaves(out);
                }
            }
            FilterNode::Cond { attribute_name, operator, attribute_value } => {
                out.push((attribute_name, *operator, attribute_value));
            }
        }
    }
}
