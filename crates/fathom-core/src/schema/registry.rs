//! In-memory schema registry.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::types::ValueType;

use super::{SchemaProvider, TypeKind};

/// Definition of a single entity or classification type.
///
/// Attributes declared directly on the type qualify as
/// `<type name>.<attribute name>`; attributes reachable through
/// [`with_super_type`](Self::with_super_type) qualify against the defining
/// supertype.
#[derive(Debug, Clone)]
pub struct TypeDef {
    name: String,
    kind: TypeKind,
    super_type: Option<String>,
    attributes: Vec<(String, ValueType)>,
}

impl TypeDef {
    /// Creates an entity type definition.
    #[must_use]
    pub fn entity(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: TypeKind::Entity, super_type: None, attributes: Vec::new() }
    }

    /// Creates a classification type definition.
    #[must_use]
    pub fn classification(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Classification,
            super_type: None,
            attributes: Vec::new(),
        }
    }

    /// Declares an attribute on this type.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.attributes.push((name.into(), value_type));
        self
    }

    /// Sets the supertype this type inherits attributes from.
    #[must_use]
    pub fn with_super_type(mut self, name: impl Into<String>) -> Self {
        self.super_type = Some(name.into());
        self
    }

    /// The type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is an entity or classification type.
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    fn attribute(&self, attr_name: &str) -> Option<ValueType> {
        self.attributes.iter().find(|(name, _)| name == attr_name).map(|&(_, vt)| vt)
    }
}

/// An immutable in-memory [`SchemaProvider`].
///
/// Built once at service startup (or per test) and borrowed by planning
/// sessions.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDef>,
    /// Registration order, used for deterministic closure rendering.
    order: Vec<String>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type definition.
    #[must_use]
    pub fn with_type(mut self, def: TypeDef) -> Self {
        if !self.types.contains_key(&def.name) {
            self.order.push(def.name.clone());
        }
        self.types.insert(def.name.clone(), def);
        self
    }

    /// Looks up a registered type.
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&TypeDef> {
        self.types.get(type_name)
    }

    /// Resolves the type that defines `attr_name`, walking up the supertype
    /// chain from `type_name`.
    fn defining_type(&self, type_name: &str, attr_name: &str) -> CoreResult<(&TypeDef, ValueType)> {
        let mut current = self
            .types
            .get(type_name)
            .ok_or_else(|| CoreError::TypeNotFound(type_name.to_string()))?;

        loop {
            if let Some(vt) = current.attribute(attr_name) {
                return Ok((current, vt));
            }

            match &current.super_type {
                Some(parent) => {
                    current = self
                        .types
                        .get(parent)
                        .ok_or_else(|| CoreError::TypeNotFound(parent.clone()))?;
                }
                None => {
                    return Err(CoreError::AttributeNotFound {
                        type_name: type_name.to_string(),
                        attr_name: attr_name.to_string(),
                    })
                }
            }
        }
    }

    /// Whether `candidate` is `root` or a transitive subtype of it.
    fn descends_from(&self, candidate: &str, root: &str) -> bool {
        let mut current = candidate;
        loop {
            if current == root {
                return true;
            }
            match self.types.get(current).and_then(|def| def.super_type.as_deref()) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}

impl SchemaProvider for TypeRegistry {
    fn qualified_attribute_name(&self, type_name: &str, attr_name: &str) -> CoreResult<String> {
        let (defining, _) = self.defining_type(type_name, attr_name)?;
        Ok(format!("{}.{attr_name}", defining.name))
    }

    fn attribute_value_type(&self, type_name: &str, attr_name: &str) -> CoreResult<ValueType> {
        let (_, value_type) = self.defining_type(type_name, attr_name)?;
        Ok(value_type)
    }

    fn is_entity_type(&self, type_name: &str) -> bool {
        self.types.get(type_name).is_some_and(|def| def.kind == TypeKind::Entity)
    }

    fn subtype_closure_clause(&self, type_name: &str) -> String {
        let closure: Vec<&str> = self
            .order
            .iter()
            .filter(|name| self.descends_from(name, type_name))
            .map(String::as_str)
            .collect();

        match closure.as_slice() {
            [] => type_name.to_string(),
            [single] => (*single).to_string(),
            many => format!("({})", many.join(" OR ")),
        }
    }
}
