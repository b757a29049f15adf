//! Query emission backends.
//!
//! Three backends render a filter tree for their engines:
//!
//! - [`index`] - the full-text index engine's Lucene-style query string
//! - [`graph`] - a typed graph query builder program
//! - [`gremlin`] - a Gremlin traversal fragment with parameter bindings
//!
//! The index backend additionally guards its output against the stray
//! connector patterns that a drop-without-rejoin emitter would produce.

pub mod graph;
pub mod gremlin;
pub mod index;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PlanError, PlanResult};

/// `(AND )+)`: an AND connector left dangling before a closing brace.
static STRAY_AND_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(AND\s+)+\)").expect("static pattern compiles"));

/// `(OR )+)`: an OR connector left dangling before a closing brace.
static STRAY_OR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(OR\s+)+\)").expect("static pattern compiles"));

/// `( )`: an empty parenthesized group.
static STRAY_ELLIPSIS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\)").expect("static pattern compiles"));

/// Fails the plan if the emitted query contains a stray-connector pattern.
///
/// A correct emitter joins only non-empty rendered children, so a match
/// here is an internal invariant violation, not a user error.
pub(crate) fn verify_well_formed(query: &str) -> PlanResult<()> {
    for pattern in [&STRAY_AND_PATTERN, &STRAY_OR_PATTERN, &STRAY_ELLIPSIS_PATTERN] {
        if pattern.is_match(query) {
            return Err(PlanError::MalformedEmission {
                pattern: pattern.as_str(),
                query: query.to_string(),
            });
        }
    }
    Ok(())
}

/// Substitutes the `%s` placeholders of a template, in order.
///
/// Both the index and Gremlin template tables use two-placeholder templates
/// (qualified name, then value or bind name).
pub(crate) fn expand_template(template: &str, qualified_name: &str, value: &str) -> String {
    let mut out = String::with_capacity(template.len() + qualified_name.len() + value.len());
    let mut rest = template;

    for arg in [qualified_name, value] {
        match rest.find("%s") {
            Some(pos) => {
                out.push_str(&rest[..pos]);
                out.push_str(arg);
                rest = &rest[pos + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_substitutes_in_order() {
        assert_eq!(
            expand_template(r#"v."%s": [* TO %s}"#, "Asset.size", "100"),
            r#"v."Asset.size": [* TO 100}"#
        );
        assert_eq!(expand_template("-v.\"%s\": %s", "Asset.name", "foo"), "-v.\"Asset.name\": foo");
    }

    #[test]
    fn well_formed_passes() {
        assert!(verify_well_formed(r#"v."a": x AND (v."b": y OR v."c": z)"#).is_ok());
    }

    #[test]
    fn stray_connectors_fail() {
        for bad in [r#"(v."a": x AND )"#, r#"(v."a": x OR )"#, "v.\"a\": x AND ( )", "(  )"] {
            let err = verify_well_formed(bad).unwrap_err();
            assert!(matches!(err, PlanError::MalformedEmission { .. }), "{bad} should fail");
        }
    }
}
