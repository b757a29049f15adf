//! Gremlin traversal emission.
//!
//! The alternate full-expression backend for paths that cannot use the index
//! at all: renders the whole filter tree into a Gremlin traversal fragment
//! plus a bindings map. Each leaf becomes one traversal step from a fixed
//! per-operator template; its value is normalized through the schema and
//! bound under a synthetic `__bind_<N>` name instead of being inlined.
//! Date values are bound as epoch milliseconds.

use std::collections::HashMap;

use fathom_core::{SchemaProvider, Value};

use crate::context::{Diagnostic, DiagnosticKind, SearchContext};
use crate::filter::{Combinator, FilterNode, FilterOperator};

use super::expand_template;

/// Prefix for synthetic binding names.
const BIND_NAME_PREFIX: &str = "__bind_";

/// A rendered traversal fragment with its parameter bindings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GremlinFragment {
    /// The traversal steps, ready to append to a seeded traversal.
    pub fragment: String,
    /// Bind name to normalized value.
    pub bindings: HashMap<String, Value>,
}

impl GremlinFragment {
    /// Whether the fragment carries no traversal steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }
}

/// The traversal-step template for an operator, or `None` when the backend
/// cannot express it.
///
/// `%s` placeholders are the qualified attribute name and the bind name, in
/// that order.
#[must_use]
pub const fn gremlin_template(op: FilterOperator) -> Option<&'static str> {
    match op {
        FilterOperator::Lt => Some(".has('%s', T.lt, %s)"),
        FilterOperator::Gt => Some(".has('%s', T.gt, %s)"),
        FilterOperator::Lte => Some(".has('%s', T.lte, %s)"),
        FilterOperator::Gte => Some(".has('%s', T.gte, %s)"),
        FilterOperator::Eq => Some(".has('%s', T.eq, %s)"),
        FilterOperator::Neq => Some(".has('%s', T.neq, %s)"),
        FilterOperator::Like => Some(".filter({it.'%s'.matches(%s)})"),
        FilterOperator::StartsWith => Some(".filter({it.'%s'.startsWith(%s)})"),
        FilterOperator::EndsWith => Some(".filter({it.'%s'.endsWith(%s)})"),
        FilterOperator::Contains => Some(".filter({it.'%s'.contains(%s)})"),
        FilterOperator::In => None,
    }
}

/// Renders the full filter tree as a Gremlin fragment with bindings.
pub fn emit_gremlin_filter(ctx: &mut SearchContext<'_>, filter: &FilterNode) -> GremlinFragment {
    let mut out = GremlinFragment::default();
    let mut diagnostics = Vec::new();

    render_node(ctx.schema(), ctx.type_name(), filter, &mut out, &mut diagnostics);

    for diagnostic in diagnostics {
        ctx.record_diagnostic(diagnostic.kind, diagnostic.message);
    }

    out
}

fn render_node(
    schema: &dyn SchemaProvider,
    type_name: &str,
    node: &FilterNode,
    out: &mut GremlinFragment,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match node {
        FilterNode::Group { condition: Combinator::And, criterion } => {
            for child in criterion {
                render_node(schema, type_name, child, out, diagnostics);
            }
        }
        FilterNode::Group { condition: Combinator::Or, criterion } => {
            if criterion.is_empty() {
                return;
            }

            // Each disjunct is its own sub-traversal seeded with identity.
            let mut parts = Vec::with_capacity(criterion.len());
            for child in criterion {
                let mut nested = GremlinFragment {
                    fragment: String::from("_()"),
                    bindings: std::mem::take(&mut out.bindings),
                };
                render_node(schema, type_name, child, &mut nested, diagnostics);
                out.bindings = nested.bindings;
                parts.push(nested.fragment);
            }

            out.fragment.push_str(".or(");
            out.fragment.push_str(&parts.join(","));
            out.fragment.push(')');
        }
        FilterNode::Cond { attribute_name, operator, attribute_value } => {
            let Some(template) = gremlin_template(*operator) else {
                diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::UnsupportedOperator,
                    message: format!(
                        "{operator}: unsupported operator for Gremlin filtering; \
                         ignored predicate on {attribute_name}"
                    ),
                });
                return;
            };

            let resolved = schema
                .qualified_attribute_name(type_name, attribute_name)
                .and_then(|qualified_name| {
                    let value_type = schema.attribute_value_type(type_name, attribute_name)?;
                    Ok((qualified_name, value_type))
                });
            let (qualified_name, value_type) = match resolved {
                Ok(ok) => ok,
                Err(err) => {
                    diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::SchemaResolution,
                        message: err.to_string(),
                    });
                    return;
                }
            };

            let value = match value_type.normalize(attribute_value) {
                Ok(value) => value,
                Err(err) => {
                    diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::ValueNormalization,
                        message: err.to_string(),
                    });
                    return;
                }
            };

            let bind_name = format!("{BIND_NAME_PREFIX}{}", out.bindings.len());
            // The traversal engine binds dates as epoch milliseconds.
            let bind_value = match value {
                Value::Date(millis) => Value::Int(millis),
                other => other,
            };

            out.bindings.insert(bind_name.clone(), bind_value);
            out.fragment.push_str(&expand_template(template, &qualified_name, &bind_name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_core::{StaticIndexCatalog, TypeDef, TypeRegistry, ValueType};

    fn registry() -> TypeRegistry {
        TypeRegistry::new().with_type(
            TypeDef::entity("Asset")
                .with_attribute("name", ValueType::String)
                .with_attribute("size", ValueType::Long)
                .with_attribute("createdAt", ValueType::Date),
        )
    }

    fn run(filter: &FilterNode) -> (GremlinFragment, Vec<DiagnosticKind>) {
        let registry = registry();
        let catalog = StaticIndexCatalog::new();
        let mut ctx = SearchContext::new(&registry, &catalog, "Asset");
        let fragment = emit_gremlin_filter(&mut ctx, filter);
        let kinds = ctx.diagnostics().iter().map(|d| d.kind).collect();
        (fragment, kinds)
    }

    #[test]
    fn and_concatenates_steps() {
        let filter = FilterNode::all_of(vec![
            FilterNode::cond("name", FilterOperator::Eq, "foo"),
            FilterNode::cond("size", FilterOperator::Gt, "100"),
        ]);
        let (out, _) = run(&filter);

        assert_eq!(
            out.fragment,
            ".has('Asset.name', T.eq, __bind_0).has('Asset.size', T.gt, __bind_1)"
        );
        assert_eq!(out.bindings.get("__bind_0"), Some(&Value::String("foo".into())));
        assert_eq!(out.bindings.get("__bind_1"), Some(&Value::Int(100)));
    }

    #[test]
    fn or_opens_identity_seeded_subtraversals() {
        let filter = FilterNode::any_of(vec![
            FilterNode::cond("name", FilterOperator::Eq, "a"),
            FilterNode::cond("name", FilterOperator::Eq, "b"),
        ]);
        let (out, _) = run(&filter);

        assert_eq!(
            out.fragment,
            ".or(_().has('Asset.name', T.eq, __bind_0),_().has('Asset.name', T.eq, __bind_1))"
        );
        assert_eq!(out.bindings.len(), 2);
    }

    #[test]
    fn string_operators_render_filter_closures() {
        let filter = FilterNode::all_of(vec![
            FilterNode::cond("name", FilterOperator::Like, "f.o"),
            FilterNode::cond("name", FilterOperator::StartsWith, "f"),
            FilterNode::cond("name", FilterOperator::EndsWith, "o"),
            FilterNode::cond("name", FilterOperator::Contains, "x"),
        ]);
        let (out, _) = run(&filter);

        assert_eq!(
            out.fragment,
            ".filter({it.'Asset.name'.matches(__bind_0)})\
             .filter({it.'Asset.name'.startsWith(__bind_1)})\
             .filter({it.'Asset.name'.endsWith(__bind_2)})\
             .filter({it.'Asset.name'.contains(__bind_3)})"
        );
    }

    #[test]
    fn date_values_bind_as_epoch_millis() {
        let filter = FilterNode::cond("createdAt", FilterOperator::Gte, "2024-01-01");
        let (out, _) = run(&filter);

        assert_eq!(out.fragment, ".has('Asset.createdAt', T.gte, __bind_0)");
        assert_eq!(out.bindings.get("__bind_0"), Some(&Value::Int(1_704_067_200_000)));
    }

    #[test]
    fn in_operator_is_diagnosed_and_dropped() {
        let filter = FilterNode::all_of(vec![
            FilterNode::cond("name", FilterOperator::In, "a,b"),
            FilterNode::cond("size", FilterOperator::Eq, "1"),
        ]);
        let (out, kinds) = run(&filter);

        assert_eq!(out.fragment, ".has('Asset.size', T.eq, __bind_0)");
        assert!(kinds.contains(&DiagnosticKind::UnsupportedOperator));
    }

    #[test]
    fn unknown_attribute_is_diagnosed_and_dropped() {
        let filter = FilterNode::all_of(vec![
            FilterNode::cond("nope", FilterOperator::Eq, "x"),
            FilterNode::cond("name", FilterOperator::Eq, "foo"),
        ]);
        let (out, kinds) = run(&filter);

        assert_eq!(out.fragment, ".has('Asset.name', T.eq, __bind_0)");
        assert!(kinds.contains(&DiagnosticKind::SchemaResolution));
    }

    #[test]
    fn unparseable_value_is_diagnosed_and_dropped() {
        let filter = FilterNode::cond("size", FilterOperator::Eq, "not-a-number");
        let (out, kinds) = run(&filter);

        assert!(out.is_empty());
        assert!(out.bindings.is_empty());
        assert!(kinds.contains(&DiagnosticKind::ValueNormalization));
    }

    #[test]
    fn empty_or_group_is_a_no_op() {
        let filter = FilterNode::any_of(vec![]);
        let (out, _) = run(&filter);
        assert!(out.is_empty());
    }

    #[test]
    fn dropped_leaf_inside_or_keeps_identity_disjunct() {
        // A dropped disjunct degrades to the identity traversal rather than
        // silently narrowing the OR.
        let filter = FilterNode::any_of(vec![
            FilterNode::cond("name", FilterOperator::Eq, "a"),
            FilterNode::cond("nope", FilterOperator::Eq, "b"),
        ]);
        let (out, kinds) = run(&filter);

        assert_eq!(out.fragment, ".or(_().has('Asset.name', T.eq, __bind_0),_())");
        assert!(kinds.contains(&DiagnosticKind::SchemaResolution));
    }
}
