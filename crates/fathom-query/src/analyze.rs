//! Filter analysis: attribute classification and pushdown decision.
//!
//! One pre-order walk over the filter tree produces both planning inputs:
//!
//! - **Classification**: each leaf's attribute lands in exactly one of the
//!   context's `index_filtered` / `graph_filtered` sets (by index-catalog
//!   membership), in `entity_attributes` when the root is an entity type,
//!   and always in `all_attributes`. Unresolvable attributes are dropped
//!   from every set with a diagnostic.
//! - **Pushdown**: whether the tree can be split into an index pass plus a
//!   graph pass. The split is safe iff no non-indexed leaf appears anywhere
//!   under an OR group: the index engine cannot represent the disjunct
//!   containing the non-indexed attribute, and dropping the disjunct would
//!   over-filter. Equivalently, every non-indexed leaf must lie on a pure
//!   AND path from the root.
//!
//! The walk is idempotent and fills the sets in first-reference order.

use tracing::warn;

use crate::context::{DiagnosticKind, SearchContext};
use crate::filter::{Combinator, FilterNode};

/// The analyzer's verdict on a filter tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisReport {
    /// Whether the tree can be split into an index pass plus a graph pass.
    ///
    /// When `false` the index emitter must be skipped and the whole tree
    /// handed to the graph emitter.
    pub can_push_down: bool,
}

/// Classifies every referenced attribute and decides pushdown eligibility.
///
/// An absent filter trivially allows pushdown: the index pass still carries
/// the type and state clauses.
pub fn analyze(ctx: &mut SearchContext<'_>, filter: Option<&FilterNode>) -> AnalysisReport {
    let mut can_push_down = true;

    if let Some(node) = filter {
        walk(ctx, node, false, &mut can_push_down);
    }

    AnalysisReport { can_push_down }
}

fn walk(ctx: &mut SearchContext<'_>, node: &FilterNode, inside_or: bool, can_push_down: &mut bool) {
    match node {
        FilterNode::Group { condition, criterion } => {
            let inside_or = inside_or || *condition == Combinator::Or;
            for child in criterion {
                walk(ctx, child, inside_or, can_push_down);
            }
        }
        FilterNode::Cond { attribute_name, .. } => {
            // The UI can submit half-built rows with no attribute selected.
            if attribute_name.is_empty() {
                return;
            }

            let resolved =
                ctx.schema().qualified_attribute_name(ctx.type_name(), attribute_name);

            match resolved {
                Ok(qualified_name) => {
                    if ctx.index_keys().is_indexed(&qualified_name) {
                        ctx.record_index_attribute(attribute_name);
                    } else {
                        warn!(
                            attribute = %qualified_name,
                            "search includes non-indexed attribute; might cause poor performance"
                        );
                        ctx.record_graph_attribute(attribute_name);

                        if inside_or {
                            *can_push_down = false;
                        }
                    }

                    if ctx.is_entity_root() {
                        ctx.record_entity_attribute(attribute_name);
                    }

                    ctx.record_attribute(attribute_name);
                }
                Err(err) => {
                    ctx.record_diagnostic(DiagnosticKind::SchemaResolution, err.to_string());
                }
            }
        }
    }
}
