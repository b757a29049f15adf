//! Graph query emission.
//!
//! Renders a filter tree into a graph query builder program through the
//! [`GraphQuery`] port. AND groups merge each child's predicates into the
//! same scope; OR groups compile each child into its own child scope and
//! combine them with a single `or`. Leaves outside the supplied attribute
//! set are skipped silently; they were already handled by the index pass.
//!
//! [`GraphQueryProgram`] is the bundled recording implementation and the
//! artifact handed across the planning boundary; execution engines provide
//! their own [`GraphQuery`] impl instead.

use std::fmt;

use fathom_core::SchemaProvider;

use crate::context::{AttributeSet, Diagnostic, DiagnosticKind, SearchContext};
use crate::filter::{Combinator, FilterNode, FilterOperator};

/// Comparison predicates understood by the graph engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    /// Strictly less than.
    LessThan,
    /// Less than or equal.
    LessThanEqual,
    /// Strictly greater than.
    GreaterThan,
    /// Greater than or equal.
    GreaterThanEqual,
    /// Equal.
    Equal,
    /// Not equal.
    NotEqual,
}

impl ComparisonOperator {
    /// Short mnemonic used in program rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::LessThan => "LT",
            ComparisonOperator::LessThanEqual => "LTE",
            ComparisonOperator::GreaterThan => "GT",
            ComparisonOperator::GreaterThanEqual => "GTE",
            ComparisonOperator::Equal => "EQ",
            ComparisonOperator::NotEqual => "NEQ",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String-matching predicates understood by the graph engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchingOperator {
    /// Prefix match on the raw value.
    Prefix,
    /// Regular expression match.
    Regex,
}

impl MatchingOperator {
    /// Short mnemonic used in program rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MatchingOperator::Prefix => "PREFIX",
            MatchingOperator::Regex => "REGEX",
        }
    }
}

impl fmt::Display for MatchingOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The graph query builder port.
///
/// Mirrors the builder surface of the graph engine: typed predicates on a
/// query scope, child scopes, and disjunction over child scopes.
pub trait GraphQuery: Sized {
    /// Adds a comparison predicate to this scope.
    fn has(&mut self, qualified_name: &str, op: ComparisonOperator, value: &str);

    /// Adds a string-matching predicate to this scope.
    fn has_matching(&mut self, qualified_name: &str, op: MatchingOperator, pattern: &str);

    /// Opens an empty child scope.
    fn create_child(&self) -> Self;

    /// Merges another scope's predicates into this one.
    fn add_conditions_from(&mut self, other: Self);

    /// Combines child scopes disjunctively.
    fn or(&mut self, children: Vec<Self>);

    /// Whether this scope carries no conditions yet.
    ///
    /// The emitter uses this to drop child scopes that compiled to nothing,
    /// the same drop-without-stray-connector discipline the index emitter
    /// applies to empty rendered fragments.
    fn is_empty(&self) -> bool;
}

/// One step of a recorded graph query program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphPredicate {
    /// A comparison predicate.
    Has {
        /// Qualified attribute name.
        qualified_name: String,
        /// The comparison.
        op: ComparisonOperator,
        /// The raw value.
        value: String,
    },
    /// A string-matching predicate.
    Matching {
        /// Qualified attribute name.
        qualified_name: String,
        /// The match kind.
        op: MatchingOperator,
        /// The pattern (regex fragment or raw prefix).
        pattern: String,
    },
    /// A disjunction of child programs.
    Or(Vec<GraphQueryProgram>),
}

impl fmt::Display for GraphPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphPredicate::Has { qualified_name, op, value } => {
                write!(f, "has({qualified_name}, {op}, {value})")
            }
            GraphPredicate::Matching { qualified_name, op, pattern } => {
                write!(f, "has({qualified_name}, {op}, \"{pattern}\")")
            }
            GraphPredicate::Or(children) => {
                write!(f, "or(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A recorded graph query: an ordered conjunction of [`GraphPredicate`]s.
///
/// This is the artifact the planner emits; callers replay it against their
/// engine's builder or execute it directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphQueryProgram {
    predicates: Vec<GraphPredicate>,
}

impl GraphQueryProgram {
    /// Creates an empty program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded predicates, in emission order.
    #[must_use]
    pub fn predicates(&self) -> &[GraphPredicate] {
        &self.predicates
    }

    /// Whether the program carries no predicates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Display for GraphQueryProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

impl GraphQuery for GraphQueryProgram {
    fn has(&mut self, qualified_name: &str, op: ComparisonOperator, value: &str) {
        self.predicates.push(GraphPredicate::Has {
            qualified_name: qualified_name.to_string(),
            op,
            value: value.to_string(),
        });
    }

    fn has_matching(&mut self, qualified_name: &str, op: MatchingOperator, pattern: &str) {
        self.predicates.push(GraphPredicate::Matching {
            qualified_name: qualified_name.to_string(),
            op,
            pattern: pattern.to_string(),
        });
    }

    fn create_child(&self) -> Self {
        Self::new()
    }

    fn add_conditions_from(&mut self, other: Self) {
        self.predicates.extend(other.predicates);
    }

    fn or(&mut self, children: Vec<Self>) {
        self.predicates.push(GraphPredicate::Or(children));
    }

    fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Which attribute set the graph emitter filters leaves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFilterScope {
    /// Only the graph-only residual; the index pass handled the rest.
    Residual,
    /// The whole expression; pushdown was refused.
    FullExpression,
}

/// Compiles a filter tree into graph predicates on `query`.
pub fn emit_graph_filter<Q: GraphQuery>(
    ctx: &mut SearchContext<'_>,
    filter: &FilterNode,
    scope: GraphFilterScope,
    query: &mut Q,
) {
    let mut diagnostics = Vec::new();
    {
        let attributes = match scope {
            GraphFilterScope::Residual => ctx.graph_filtered(),
            GraphFilterScope::FullExpression => ctx.all_attributes(),
        };
        build_node(ctx.schema(), ctx.type_name(), attributes, filter, query, &mut diagnostics);
    }

    for diagnostic in diagnostics {
        ctx.record_diagnostic(diagnostic.kind, diagnostic.message);
    }
}

fn build_node<Q: GraphQuery>(
    schema: &dyn SchemaProvider,
    type_name: &str,
    attributes: &AttributeSet,
    node: &FilterNode,
    query: &mut Q,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match node {
        FilterNode::Group { condition: Combinator::And, criterion } => {
            for child in criterion {
                let mut nested = query.create_child();
                build_node(schema, type_name, attributes, child, &mut nested, diagnostics);
                query.add_conditions_from(nested);
            }
        }
        FilterNode::Group { condition: Combinator::Or, criterion } => {
            // Children that compiled to nothing (index-handled or dropped
            // leaves) are pruned so the disjunction never degenerates into
            // an `or` over empty scopes.
            let mut children = Vec::with_capacity(criterion.len());
            for child in criterion {
                let mut nested = query.create_child();
                build_node(schema, type_name, attributes, child, &mut nested, diagnostics);
                if !nested.is_empty() {
                    children.push(nested);
                }
            }

            match children.len() {
                0 => {}
                1 => {
                    if let Some(only) = children.pop() {
                        query.add_conditions_from(only);
                    }
                }
                _ => query.or(children),
            }
        }
        FilterNode::Cond { attribute_name, operator, attribute_value } => {
            if !attributes.contains(attribute_name) {
                return;
            }

            let qualified_name = match schema.qualified_attribute_name(type_name, attribute_name)
            {
                Ok(qualified_name) => qualified_name,
                Err(err) => {
                    diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::SchemaResolution,
                        message: err.to_string(),
                    });
                    return;
                }
            };

            match operator {
                FilterOperator::Lt => {
                    query.has(&qualified_name, ComparisonOperator::LessThan, attribute_value);
                }
                FilterOperator::Lte => {
                    query.has(&qualified_name, ComparisonOperator::LessThanEqual, attribute_value);
                }
                FilterOperator::Gt => {
                    query.has(&qualified_name, ComparisonOperator::GreaterThan, attribute_value);
                }
                FilterOperator::Gte => {
                    query.has(
                        &qualified_name,
                        ComparisonOperator::GreaterThanEqual,
                        attribute_value,
                    );
                }
                FilterOperator::Eq => {
                    query.has(&qualified_name, ComparisonOperator::Equal, attribute_value);
                }
                FilterOperator::Neq => {
                    query.has(&qualified_name, ComparisonOperator::NotEqual, attribute_value);
                }
                FilterOperator::Like | FilterOperator::Contains => {
                    query.has_matching(
                        &qualified_name,
                        MatchingOperator::Regex,
                        &contains_regex(attribute_value),
                    );
                }
                FilterOperator::EndsWith => {
                    query.has_matching(
                        &qualified_name,
                        MatchingOperator::Regex,
                        &suffix_regex(attribute_value),
                    );
                }
                FilterOperator::StartsWith => {
                    query.has_matching(&qualified_name, MatchingOperator::Prefix, attribute_value);
                }
                FilterOperator::In => {
                    diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::UnsupportedOperator,
                        message: format!(
                            "IN: unsupported operator for graph filtering; \
                             ignored predicate on {qualified_name}"
                        ),
                    });
                }
            }
        }
    }
}

fn contains_regex(value: &str) -> String {
    format!(".*{value}.*")
}

fn suffix_regex(value: &str) -> String {
    format!(".*{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_core::{StaticIndexCatalog, TypeDef, TypeRegistry, ValueType};

    fn registry() -> TypeRegistry {
        TypeRegistry::new().with_type(
            TypeDef::entity("Asset")
                .with_attribute("name", ValueType::String)
                .with_attribute("comment", ValueType::String)
                .with_attribute("size", ValueType::Long),
        )
    }

    fn run(filter: &FilterNode, scope: GraphFilterScope) -> (GraphQueryProgram, Vec<DiagnosticKind>) {
        let registry = registry();
        let catalog = StaticIndexCatalog::from_keys(["Asset.name"]);
        let mut ctx = SearchContext::new(&registry, &catalog, "Asset");
        crate::analyze::analyze(&mut ctx, Some(filter));

        let mut program = GraphQueryProgram::new();
        emit_graph_filter(&mut ctx, filter, scope, &mut program);
        let kinds = ctx.diagnostics().iter().map(|d| d.kind).collect();
        (program, kinds)
    }

    #[test]
    fn and_group_flattens_into_one_scope() {
        let filter = FilterNode::all_of(vec![
            FilterNode::cond("comment", FilterOperator::Eq, "a"),
            FilterNode::cond("size", FilterOperator::Gt, "10"),
        ]);
        let (program, _) = run(&filter, GraphFilterScope::Residual);

        assert_eq!(
            program.predicates(),
            &[
                GraphPredicate::Has {
                    qualified_name: "Asset.comment".to_string(),
                    op: ComparisonOperator::Equal,
                    value: "a".to_string(),
                },
                GraphPredicate::Has {
                    qualified_name: "Asset.size".to_string(),
                    op: ComparisonOperator::GreaterThan,
                    value: "10".to_string(),
                },
            ]
        );
    }

    #[test]
    fn or_group_compiles_child_scopes() {
        let filter = FilterNode::any_of(vec![
            FilterNode::cond("name", FilterOperator::Eq, "foo"),
            FilterNode::cond("comment", FilterOperator::Contains, "bar"),
        ]);
        let (program, _) = run(&filter, GraphFilterScope::FullExpression);

        assert_eq!(program.predicates().len(), 1);
        let GraphPredicate::Or(children) = &program.predicates()[0] else {
            panic!("expected an or predicate");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0].predicates(),
            &[GraphPredicate::Has {
                qualified_name: "Asset.name".to_string(),
                op: ComparisonOperator::Equal,
                value: "foo".to_string(),
            }]
        );
        assert_eq!(
            children[1].predicates(),
            &[GraphPredicate::Matching {
                qualified_name: "Asset.comment".to_string(),
                op: MatchingOperator::Regex,
                pattern: ".*bar.*".to_string(),
            }]
        );
    }

    #[test]
    fn string_operator_mapping() {
        let filter = FilterNode::all_of(vec![
            FilterNode::cond("comment", FilterOperator::Like, "x"),
            FilterNode::cond("comment", FilterOperator::EndsWith, "y"),
            FilterNode::cond("comment", FilterOperator::StartsWith, "z"),
        ]);
        let (program, _) = run(&filter, GraphFilterScope::Residual);

        assert_eq!(
            program.predicates(),
            &[
                GraphPredicate::Matching {
                    qualified_name: "Asset.comment".to_string(),
                    op: MatchingOperator::Regex,
                    pattern: ".*x.*".to_string(),
                },
                GraphPredicate::Matching {
                    qualified_name: "Asset.comment".to_string(),
                    op: MatchingOperator::Regex,
                    pattern: ".*y".to_string(),
                },
                GraphPredicate::Matching {
                    qualified_name: "Asset.comment".to_string(),
                    op: MatchingOperator::Prefix,
                    pattern: "z".to_string(),
                },
            ]
        );
    }

    #[test]
    fn in_operator_is_diagnosed_and_skipped() {
        let filter = FilterNode::all_of(vec![
            FilterNode::cond("comment", FilterOperator::In, "a,b"),
            FilterNode::cond("size", FilterOperator::Eq, "1"),
        ]);
        let (program, kinds) = run(&filter, GraphFilterScope::Residual);

        assert_eq!(program.predicates().len(), 1);
        assert!(kinds.contains(&DiagnosticKind::UnsupportedOperator));
    }

    #[test]
    fn leaves_outside_scope_are_skipped_silently() {
        // name is indexed: in Residual scope it must not reach the program.
        let filter = FilterNode::all_of(vec![
            FilterNode::cond("name", FilterOperator::Eq, "foo"),
            FilterNode::cond("comment", FilterOperator::Eq, "bar"),
        ]);
        let (program, kinds) = run(&filter, GraphFilterScope::Residual);

        assert_eq!(program.predicates().len(), 1);
        assert!(matches!(
            &program.predicates()[0],
            GraphPredicate::Has { qualified_name, .. } if qualified_name == "Asset.comment"
        ));
        assert!(kinds.is_empty());
    }

    #[test]
    fn empty_or_group_is_a_no_op() {
        let filter = FilterNode::any_of(vec![]);
        let (program, _) = run(&filter, GraphFilterScope::FullExpression);
        assert!(program.is_empty());
    }

    #[test]
    fn fully_indexed_or_group_leaves_residual_empty() {
        // Both leaves are index-handled in Residual scope: every child
        // scope compiles to nothing, so no `or` may be recorded.
        let filter = FilterNode::all_of(vec![
            FilterNode::any_of(vec![
                FilterNode::cond("name", FilterOperator::Eq, "a"),
                FilterNode::cond("name", FilterOperator::Eq, "b"),
            ]),
            FilterNode::cond("comment", FilterOperator::Eq, "x"),
        ]);
        let (program, _) = run(&filter, GraphFilterScope::Residual);

        assert_eq!(program.to_string(), "has(Asset.comment, EQ, x)");
    }

    #[test]
    fn single_surviving_or_child_merges_inline() {
        // The unresolvable leaf drops out of the disjunction; the lone
        // survivor merges into the parent scope without an `or` wrapper.
        let filter = FilterNode::any_of(vec![
            FilterNode::cond("ghost", FilterOperator::Eq, "a"),
            FilterNode::cond("comment", FilterOperator::Contains, "bar"),
        ]);
        let (program, _) = run(&filter, GraphFilterScope::FullExpression);

        assert_eq!(program.to_string(), "has(Asset.comment, REGEX, \".*bar.*\")");
    }

    #[test]
    fn program_display() {
        let filter = FilterNode::any_of(vec![
            FilterNode::cond("name", FilterOperator::Eq, "foo"),
            FilterNode::cond("comment", FilterOperator::Contains, "bar"),
        ]);
        let (program, _) = run(&filter, GraphFilterScope::FullExpression);

        assert_eq!(
            program.to_string(),
            "or(has(Asset.name, EQ, foo), has(Asset.comment, REGEX, \".*bar.*\"))"
        );
    }
}
