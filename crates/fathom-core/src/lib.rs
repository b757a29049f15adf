//! Fathom Core
//!
//! This crate provides the type-system foundation for the Fathom search
//! planner: the typed schema view over catalog entities and classifications,
//! the normalized value model for attribute values, and the index-key
//! catalog abstraction.
//!
//! # Overview
//!
//! The planner itself lives in `fathom-query`; this crate defines the ports
//! it plans against:
//!
//! - **Schema**: [`SchemaProvider`] resolves attribute names to their
//!   fully-qualified form, reports value types, and renders subtype-closure
//!   clauses. [`TypeRegistry`] is the in-memory implementation.
//! - **Index catalog**: [`IndexKeyCatalog`] answers which qualified
//!   attribute names are backed by the full-text index engine.
//! - **Values**: [`ValueType`] and [`Value`] model normalized attribute
//!   values, including date canonicalization to epoch milliseconds.
//!
//! # Example
//!
//! ```
//! use fathom_core::{SchemaProvider, TypeDef, TypeRegistry, ValueType};
//!
//! let registry = TypeRegistry::new()
//!     .with_type(
//!         TypeDef::entity("Asset")
//!             .with_attribute("name", ValueType::String)
//!             .with_attribute("owner", ValueType::String),
//!     )
//!     .with_type(TypeDef::entity("Table").with_super_type("Asset"));
//!
//! // Inherited attributes qualify against their defining type.
//! let qn = registry.qualified_attribute_name("Table", "name").unwrap();
//! assert_eq!(qn, "Asset.name");
//! ```
//!
//! # Modules
//!
//! - [`types`] - Value model ([`Value`], [`ValueType`])
//! - [`schema`] - Schema port and in-memory registry
//! - [`index`] - Index-key catalog port
//! - [`error`] - Error types ([`CoreError`])

pub mod error;
pub mod index;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, CoreResult};
pub use index::{IndexKeyCatalog, StaticIndexCatalog};
pub use schema::{SchemaProvider, TypeDef, TypeKind, TypeRegistry};
pub use types::{Value, ValueType};
