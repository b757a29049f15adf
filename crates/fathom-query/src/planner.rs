//! Plan orchestration.
//!
//! Ties the analyzer and the emitters together into the index/graph split:
//! when the analyzer allows pushdown, the index engine gets the
//! index-eligible projection and the graph engine gets only the residual;
//! when it refuses, the index emitter is not invoked at all and the graph
//! engine receives the whole expression.

use tracing::debug;

use crate::analyze::analyze;
use crate::context::SearchContext;
use crate::emit::graph::{emit_graph_filter, GraphFilterScope, GraphQueryProgram};
use crate::emit::index::emit_index_query;
use crate::error::PlanResult;
use crate::filter::FilterNode;

/// The artifacts of one planning session.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    /// The index engine's query string; `None` when pushdown was refused.
    pub index_query: Option<String>,
    /// The graph engine's residual program (or the full expression when the
    /// index pass was skipped). Empty when the index pass covers everything.
    pub graph_query: GraphQueryProgram,
    /// Whether the plan splits into an index pass plus a graph pass.
    pub index_applied: bool,
}

/// Plans a search over the context's root type with the given filter.
///
/// Re-running with identical snapshots produces byte-identical artifacts.
pub fn plan(ctx: &mut SearchContext<'_>, filter: Option<&FilterNode>) -> PlanResult<SearchPlan> {
    let report = analyze(ctx, filter);

    let mut graph_query = GraphQueryProgram::new();

    if report.can_push_down {
        let index_query = emit_index_query(ctx, filter)?;

        if let Some(node) = filter {
            if !ctx.graph_filtered().is_empty() {
                emit_graph_filter(ctx, node, GraphFilterScope::Residual, &mut graph_query);
            }
        }

        debug!(
            index_query = %index_query,
            residual = %graph_query,
            "planned index+graph search"
        );

        Ok(SearchPlan { index_query: Some(index_query), graph_query, index_applied: true })
    } else {
        // A non-indexed attribute under an OR poisons the whole expression
        // for the index engine; everything runs in the graph pass.
        if let Some(node) = filter {
            emit_graph_filter(ctx, node, GraphFilterScope::FullExpression, &mut graph_query);
        }

        debug!(graph_query = %graph_query, "planned graph-only search");

        Ok(SearchPlan { index_query: None, graph_query, index_applied: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterOperator;
    use fathom_core::{StaticIndexCatalog, TypeDef, TypeRegistry, ValueType};

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with_type(
                TypeDef::entity("Asset")
                    .with_attribute("name", ValueType::String)
                    .with_attribute("owner", ValueType::String)
                    .with_attribute("comment", ValueType::String),
            )
            .with_type(TypeDef::entity("Table").with_super_type("Asset"))
    }

    fn catalog() -> StaticIndexCatalog {
        StaticIndexCatalog::from_keys(["Asset.name", "Asset.owner"])
    }

    #[test]
    fn split_plan_covers_residual_in_graph_pass() {
        let registry = registry();
        let catalog = catalog();
        let mut ctx = SearchContext::new(&registry, &catalog, "Table");

        let filter = FilterNode::all_of(vec![
            FilterNode::cond("name", FilterOperator::Eq, "foo"),
            FilterNode::cond("comment", FilterOperator::Contains, "bar"),
        ]);

        let plan = plan(&mut ctx, Some(&filter)).unwrap();

        assert!(plan.index_applied);
        let index_query = plan.index_query.unwrap();
        assert!(index_query.contains("v.\"Asset.name\": foo"));
        assert!(!index_query.contains("comment"));
        assert_eq!(
            plan.graph_query.to_string(),
            "has(Asset.comment, REGEX, \".*bar.*\")"
        );
    }

    #[test]
    fn refused_pushdown_skips_index_pass() {
        let registry = registry();
        let catalog = catalog();
        let mut ctx = SearchContext::new(&registry, &catalog, "Table");

        let filter = FilterNode::any_of(vec![
            FilterNode::cond("name", FilterOperator::Eq, "foo"),
            FilterNode::cond("comment", FilterOperator::Contains, "bar"),
        ]);

        let plan = plan(&mut ctx, Some(&filter)).unwrap();

        assert!(!plan.index_applied);
        assert!(plan.index_query.is_none());
        // The graph program carries the full expression, indexed leaf
        // included.
        assert_eq!(
            plan.graph_query.to_string(),
            "or(has(Asset.name, EQ, foo), has(Asset.comment, REGEX, \".*bar.*\"))"
        );
    }

    #[test]
    fn fully_indexed_filter_leaves_graph_pass_empty() {
        let registry = registry();
        let catalog = catalog();
        let mut ctx = SearchContext::new(&registry, &catalog, "Table");

        let filter = FilterNode::all_of(vec![
            FilterNode::cond("name", FilterOperator::Eq, "foo"),
            FilterNode::cond("owner", FilterOperator::Eq, "bob"),
        ]);

        let plan = plan(&mut ctx, Some(&filter)).unwrap();

        assert!(plan.index_applied);
        assert!(plan.graph_query.is_empty());
    }

    #[test]
    fn no_filter_still_plans_type_and_state_clauses() {
        let registry = registry();
        let catalog = catalog();
        let mut ctx = SearchContext::new(&registry, &catalog, "Table");

        let plan = plan(&mut ctx, None).unwrap();

        assert!(plan.index_applied);
        assert_eq!(
            plan.index_query.as_deref(),
            Some("v.\"__typeName\":Table AND v.\"__state\":ACTIVE")
        );
        assert!(plan.graph_query.is_empty());
    }

    #[test]
    fn planning_is_deterministic() {
        let registry = registry();
        let catalog = catalog();

        let filter = FilterNode::all_of(vec![
            FilterNode::cond("name", FilterOperator::Eq, "foo"),
            FilterNode::cond("comment", FilterOperator::Eq, "x"),
        ]);

        let mut first_ctx = SearchContext::new(&registry, &catalog, "Table");
        let first = plan(&mut first_ctx, Some(&filter)).unwrap();
        let mut second_ctx = SearchContext::new(&registry, &catalog, "Table");
        let second = plan(&mut second_ctx, Some(&filter)).unwrap();

        assert_eq!(first.index_query, second.index_query);
        assert_eq!(first.graph_query, second.graph_query);
    }
}
