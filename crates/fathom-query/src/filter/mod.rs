//! Structured filter expressions.
//!
//! This module defines the filter AST produced by the rule-builder UI:
//! trees of AND/OR groups over leaf predicates
//! `(attribute name, operator, value)`. The serde representation matches the
//! JSON wire shape the UI sends:
//!
//! ```json
//! {
//!   "condition": "AND",
//!   "criterion": [
//!     { "attributeName": "name", "operator": "EQ", "attributeValue": "foo" },
//!     { "attributeName": "owner", "operator": "EQ", "attributeValue": "bob" }
//!   ]
//! }
//! ```

mod node;
mod op;

pub use node::FilterNode;
pub use op::{Combinator, FilterOperator};
