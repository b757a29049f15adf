//! Fathom Query
//!
//! This crate is the hybrid search planner: given a structured filter
//! expression over a typed catalog schema, it decides which predicates are
//! cheap enough to push into the full-text index engine and which residual
//! predicates must be re-checked against the graph engine, then emits the
//! query artifacts for both.
//!
//! # Overview
//!
//! Planning is a fixed sequence over a per-request [`SearchContext`]:
//!
//! 1. The **analyzer** ([`analyze`]) classifies every referenced attribute
//!    as index-eligible or graph-only and decides whether the expression is
//!    safe to split. A non-indexed attribute anywhere under an OR poisons
//!    the split: the index engine cannot represent that disjunct, and
//!    dropping it would over-filter.
//! 2. The **index emitter** renders the index-eligible projection into the
//!    engine's Lucene-style syntax, together with the type and state
//!    clauses.
//! 3. The **graph emitter** compiles the residual (or, when the split was
//!    refused, the whole expression) into a typed
//!    [`GraphQueryProgram`](emit::graph::GraphQueryProgram).
//! 4. The **Gremlin emitter** is the alternate full-expression backend for
//!    paths that cannot use the index at all, producing a traversal fragment
//!    with named parameter bindings.
//!
//! Executed plans compose into a [`SearchPipeline`](pipeline::SearchPipeline)
//! of produce/refine stages.
//!
//! # Example
//!
//! ```
//! use fathom_core::{StaticIndexCatalog, TypeDef, TypeRegistry, ValueType};
//! use fathom_query::{plan, FilterNode, FilterOperator, SearchContext};
//!
//! let registry = TypeRegistry::new().with_type(
//!     TypeDef::entity("Asset")
//!         .with_attribute("name", ValueType::String)
//!         .with_attribute("comment", ValueType::String),
//! );
//! let catalog = StaticIndexCatalog::from_keys(["Asset.name"]);
//!
//! let filter = FilterNode::all_of(vec![
//!     FilterNode::cond("name", FilterOperator::Eq, "orders"),
//!     FilterNode::cond("comment", FilterOperator::Contains, "deprecated"),
//! ]);
//!
//! let mut ctx = SearchContext::new(&registry, &catalog, "Asset");
//! let plan = plan(&mut ctx, Some(&filter)).unwrap();
//!
//! assert!(plan.index_applied);
//! assert!(plan.index_query.unwrap().contains("v.\"Asset.name\": orders"));
//! assert!(!plan.graph_query.is_empty());
//! ```
//!
//! # Modules
//!
//! - [`filter`] - Filter expression AST
//! - [`analyze`](mod@analyze) - Attribute classification and pushdown analysis
//! - [`emit`] - The index, graph, and Gremlin backends
//! - [`planner`] - Plan orchestration
//! - [`pipeline`] - Produce/refine stage composition
//! - [`context`] - Per-request planning state
//! - [`config`] - Tunables
//! - [`error`] - Error types ([`PlanError`])

pub mod analyze;
pub mod config;
pub mod context;
pub mod emit;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod planner;


// Re-export commonly used items at the crate root
pub use analyze::{analyze, AnalysisReport};
pub use config::SearchConfig;
pub use context::{AttributeSet, CancellationToken, Diagnostic, DiagnosticKind, SearchContext};
pub use emit::graph::{
    emit_graph_filter, ComparisonOperator, GraphFilterScope, GraphPredicate, GraphQuery,
    GraphQueryProgram, MatchingOperator,
};
pub use emit::gremlin::{emit_gremlin_filter, GremlinFragment};
pub use emit::index::{emit_index_query, escape_index_query_value};
pub use error::{ClauseKind, PlanError, PlanResult};
pub use filter::{Combinator, FilterNode, FilterOperator};
pub use pipeline::{FnStage, SearchPipeline, SearchStage, VertexId};
pub use planner::{plan, SearchPlan};
