//! Normalized attribute values.
//!
//! This module provides the [`ValueType`] enum describing the declared type
//! of a schema attribute, and the [`Value`] enum holding a value after
//! normalization from its raw wire string.
//!
//! Filter values arrive from the rule-builder UI as strings; backends that
//! bind typed parameters (the Gremlin emitter) normalize them through
//! [`ValueType::normalize`] first. Date values canonicalize to epoch
//! milliseconds.
//!
//! # Example
//!
//! ```
//! use fathom_core::{Value, ValueType};
//!
//! assert_eq!(ValueType::Long.normalize("42").unwrap(), Value::Int(42));
//! assert_eq!(
//!     ValueType::Date.normalize("2024-01-01").unwrap(),
//!     Value::Date(1_704_067_200_000),
//! );
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The declared value type of a schema attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// UTF-8 text.
    String,
    /// Boolean flag.
    Boolean,
    /// 32-bit integer (normalizes to [`Value::Int`]).
    Int,
    /// 64-bit integer.
    Long,
    /// 32-bit float (normalizes to [`Value::Float`]).
    Float,
    /// 64-bit float.
    Double,
    /// Instant in time, canonicalized to epoch milliseconds.
    Date,
}

impl ValueType {
    /// Returns the lowercase name of the type, as used in schema definitions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Date => "date",
        }
    }

    /// Normalizes a raw attribute value string to a typed [`Value`].
    ///
    /// Dates accept RFC 3339 timestamps, `YYYY-MM-DD` (taken as midnight
    /// UTC), or a raw epoch-millisecond integer.
    pub fn normalize(self, raw: &str) -> Result<Value, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidValue {
            value_type: self,
            raw: raw.to_string(),
            reason: reason.to_string(),
        };

        match self {
            ValueType::String => Ok(Value::String(raw.to_string())),
            ValueType::Boolean => match raw {
                "true" | "TRUE" | "True" => Ok(Value::Bool(true)),
                "false" | "FALSE" | "False" => Ok(Value::Bool(false)),
                _ => Err(invalid("expected true or false")),
            },
            ValueType::Int | ValueType::Long => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| invalid(&e.to_string())),
            ValueType::Float | ValueType::Double => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| invalid(&e.to_string())),
            ValueType::Date => parse_date_millis(raw.trim())
                .map(Value::Date)
                .ok_or_else(|| invalid("unrecognized date format")),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a date string to epoch milliseconds.
///
/// Accepted forms, tried in order: RFC 3339, `YYYY-MM-DDTHH:MM:SS` (UTC),
/// `YYYY-MM-DD` (midnight UTC), raw epoch milliseconds.
fn parse_date_millis(raw: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc().timestamp_millis());
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
    }

    raw.parse::<i64>().ok()
}

/// A normalized attribute value.
///
/// Produced by [`ValueType::normalize`] and carried in the Gremlin bindings
/// map. Dates hold epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Instant in time as epoch milliseconds.
    Date(i64),
}

impl Value {
    /// Returns the string contents if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer contents if this is a [`Value::Int`] or
    /// [`Value::Date`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) | Value::Date(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the boolean contents if this is a [`Value::Bool`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) | Value::Date(i) => write!(f, "{i}"),
            Value::Float(fl) => write!(f, "{fl}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_scalars() {
        assert_eq!(ValueType::String.normalize("foo").unwrap(), Value::String("foo".into()));
        assert_eq!(ValueType::Boolean.normalize("true").unwrap(), Value::Bool(true));
        assert_eq!(ValueType::Long.normalize(" 42 ").unwrap(), Value::Int(42));
        assert_eq!(ValueType::Double.normalize("3.5").unwrap(), Value::Float(3.5));
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(ValueType::Long.normalize("forty-two").is_err());
        assert!(ValueType::Boolean.normalize("yes").is_err());
        assert!(ValueType::Date.normalize("tomorrow").is_err());
    }

    #[test]
    fn normalize_date_forms() {
        // 2024-01-01T00:00:00Z
        let midnight = 1_704_067_200_000;
        assert_eq!(ValueType::Date.normalize("2024-01-01").unwrap(), Value::Date(midnight));
        assert_eq!(
            ValueType::Date.normalize("2024-01-01T00:00:00Z").unwrap(),
            Value::Date(midnight)
        );
        assert_eq!(
            ValueType::Date.normalize("2024-01-01T00:00:00").unwrap(),
            Value::Date(midnight)
        );
        assert_eq!(
            ValueType::Date.normalize("1704067200000").unwrap(),
            Value::Date(midnight)
        );
    }

    #[test]
    fn normalize_date_respects_offset() {
        let v = ValueType::Date.normalize("2024-01-01T01:00:00+01:00").unwrap();
        assert_eq!(v, Value::Date(1_704_067_200_000));
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(7i64).as_int(), Some(7));
        assert_eq!(Value::Date(5).as_int(), Some(5));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(7i64).as_str(), None);
    }

    #[test]
    fn value_serializes_untagged() {
        let json = serde_json::to_string(&Value::Int(42)).unwrap();
        assert_eq!(json, "42");
        let json = serde_json::to_string(&Value::String("a b".into())).unwrap();
        assert_eq!(json, "\"a b\"");
    }
}
