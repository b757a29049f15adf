//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur while resolving schema or normalizing values.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// The referenced type is not registered in the schema.
    #[error("unknown type: {0}")]
    TypeNotFound(String),

    /// The referenced attribute does not exist on the type or any of its
    /// supertypes.
    #[error("unknown attribute: {type_name}.{attr_name}")]
    AttributeNotFound {
        /// The type the lookup started from.
        type_name: String,
        /// The attribute that could not be resolved.
        attr_name: String,
    },

    /// A raw attribute value could not be normalized to its declared type.
    #[error("invalid {value_type} value {raw:?}: {reason}")]
    InvalidValue {
        /// The declared value type.
        value_type: crate::types::ValueType,
        /// The raw string that failed to normalize.
        raw: String,
        /// Why normalization failed.
        reason: String,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
