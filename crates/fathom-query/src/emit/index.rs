//! Index query emission.
//!
//! Renders the index-eligible projection of a filter tree into the engine's
//! Lucene-style query language and assembles the full per-request query:
//! type clause, optional state clause, then the filter clause, joined by
//! ` AND `. Leaves whose attribute is not index-eligible render to the empty
//! string; only non-empty rendered children are joined, so no stray
//! connectors can appear. The assembled query is still checked against the
//! stray patterns before being returned.

use fathom_core::SchemaProvider;

use crate::context::{AttributeSet, Diagnostic, DiagnosticKind, SearchContext};
use crate::error::{ClauseKind, PlanError, PlanResult};
use crate::filter::{FilterNode, FilterOperator};

use super::{expand_template, verify_well_formed};

/// Reserved vertex property holding an entity's type name.
pub const TYPE_NAME_PROPERTY_KEY: &str = "__typeName";

/// Reserved vertex property holding an entity's lifecycle state.
pub const STATE_PROPERTY_KEY: &str = "__state";

/// Reserved vertex property holding the classification names on an entity.
pub const TRAIT_NAMES_PROPERTY_KEY: &str = "__traitNames";

/// Characters the index engine's parser chokes on in bare terms.
const OFFENDING_CHARS: [char; 3] = [' ', '@', '/'];

/// The index-syntax template for an operator.
///
/// `%s` placeholders are the qualified attribute name and the escaped value,
/// in that order.
#[must_use]
pub const fn index_template(op: FilterOperator) -> &'static str {
    match op {
        FilterOperator::Lt => r#"v."%s": [* TO %s}"#,
        FilterOperator::Gt => r#"v."%s": {%s TO *]"#,
        FilterOperator::Lte => r#"v."%s": [* TO %s]"#,
        FilterOperator::Gte => r#"v."%s": [%s TO *]"#,
        FilterOperator::Eq => r#"v."%s": %s"#,
        FilterOperator::Neq => r#"-v."%s": %s"#,
        // Value must be a caller-rendered list of quoted strings.
        FilterOperator::In => r#"v."%s": (%s)"#,
        // Value is treated as a regex pattern.
        FilterOperator::Like => r#"v."%s": (%s)"#,
        FilterOperator::StartsWith => r#"v."%s": (%s*)"#,
        FilterOperator::EndsWith => r#"v."%s": (*%s)"#,
        FilterOperator::Contains => r#"v."%s": (*%s*)"#,
    }
}

/// Escapes a raw value for substitution into an index query.
///
/// Values containing an engine-reserved character are wrapped in double
/// quotes; a value the caller already quoted (fully or on one side) keeps
/// its quotes and only the missing side is added.
#[must_use]
pub fn escape_index_query_value(value: &str) -> String {
    if !value.contains(OFFENDING_CHARS) {
        return value.to_string();
    }

    let quote_at_start = value.starts_with('"');
    let quote_at_end = value.len() > 1 && value.ends_with('"');

    match (quote_at_start, quote_at_end) {
        (true, true) => value.to_string(),
        (true, false) => format!("{value}\""),
        (false, true) => format!("\"{value}"),
        (false, false) => format!("\"{value}\""),
    }
}

/// Emits the full index query for the session.
///
/// The filter clause covers only the context's `index_filtered` attributes;
/// the caller must have run the analyzer first and must skip this emitter
/// entirely when the analyzer refuses pushdown.
pub fn emit_index_query(
    ctx: &mut SearchContext<'_>,
    filter: Option<&FilterNode>,
) -> PlanResult<String> {
    let mut query = String::new();
    let mut diagnostics = Vec::new();

    let type_clause = render_type_clause(ctx)?;
    append_clause(&mut query, &type_clause);

    if ctx.exclude_deleted_entities() {
        append_clause(&mut query, &format!("v.\"{STATE_PROPERTY_KEY}\":ACTIVE"));
    }

    if let Some(node) = filter {
        let fragment = render_node(
            ctx.schema(),
            ctx.type_name(),
            ctx.index_filtered(),
            node,
            0,
            &mut diagnostics,
        );
        append_clause(&mut query, &fragment);
    }

    for diagnostic in diagnostics {
        ctx.record_diagnostic(diagnostic.kind, diagnostic.message);
    }

    verify_well_formed(&query)?;

    Ok(query)
}

/// Renders the type-restriction clause and enforces its length limit.
///
/// Entity roots match `__typeName` against the subtype closure; classification
/// roots match `__traitNames`, each with its own configured limit.
fn render_type_clause(ctx: &SearchContext<'_>) -> PlanResult<String> {
    let closure = ctx.schema().subtype_closure_clause(ctx.type_name());
    if closure.is_empty() {
        return Ok(String::new());
    }

    let (property, limit, kind) = if ctx.is_entity_root() {
        (TYPE_NAME_PROPERTY_KEY, ctx.config().max_query_str_length_types, ClauseKind::Types)
    } else {
        (TRAIT_NAMES_PROPERTY_KEY, ctx.config().max_query_str_length_tags, ClauseKind::Tags)
    };

    let clause = format!("v.\"{property}\":{closure}");
    if clause.len() > limit {
        return Err(PlanError::ClauseTooLong { kind, length: clause.len(), limit });
    }

    Ok(clause)
}

/// Appends a clause with ` AND `, skipping empty fragments.
fn append_clause(query: &mut String, clause: &str) {
    if clause.is_empty() {
        return;
    }
    if !query.is_empty() {
        query.push_str(" AND ");
    }
    query.push_str(clause);
}

/// Renders one filter node at the given nesting level.
///
/// Returns the empty string for empty groups and for leaves outside the
/// index-eligible set; parent groups join only non-empty children.
fn render_node(
    schema: &dyn SchemaProvider,
    type_name: &str,
    attributes: &AttributeSet,
    node: &FilterNode,
    level: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    match node {
        FilterNode::Group { condition, criterion } => {
            let rendered: Vec<String> = criterion
                .iter()
                .map(|child| {
                    render_node(schema, type_name, attributes, child, level + 1, diagnostics)
                })
                .filter(|fragment| !fragment.is_empty())
                .collect();

            if rendered.is_empty() {
                return String::new();
            }

            let joined = rendered.join(&format!(" {condition} "));

            if level == 0 {
                joined
            } else {
                // A negated term first in a nested expression trips the
                // engine's parser; surface it instead of emitting silently.
                if rendered[0].starts_with('-') {
                    diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::MalformedFragment,
                        message: format!(
                            "NEQ at the start of nested expression ({joined}) may be \
                             rejected by the index engine's parser"
                        ),
                    });
                }
                format!("({joined})")
            }
        }
        FilterNode::Cond { attribute_name, operator, attribute_value } => {
            if !attributes.contains(attribute_name) {
                return String::new();
            }

            match schema.qualified_attribute_name(type_name, attribute_name) {
                Ok(qualified_name) => expand_template(
                    index_template(*operator),
                    &qualified_name,
                    &escape_index_query_value(attribute_value),
                ),
                Err(err) => {
                    diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::SchemaResolution,
                        message: err.to_string(),
                    });
                    String::new()
                }
            }
        }
    }
}
