//! Planning session state.
//!
//! A [`SearchContext`] is constructed once per request from the root type,
//! the schema snapshot, and the index-key catalog snapshot. The analyzer is
//! the only component that grows its attribute sets; emitters only append
//! diagnostics. After planning the context is read-only and is dropped once
//! the plan is handed to execution.
//!
//! The ports are borrowed for the session and assumed immutable for its
//! duration; the context itself is never shared across concurrent requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fathom_core::{IndexKeyCatalog, SchemaProvider};
use tracing::warn;

use crate::config::SearchConfig;

/// An insertion-ordered string set.
///
/// Attribute sets must iterate in first-reference order so emission is
/// deterministic; membership checks are linear, which is fine at filter-tree
/// scale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    items: Vec<String>,
}

impl AttributeSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a name, keeping the first occurrence's position.
    ///
    /// Returns `true` if the name was not already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.items.contains(&name) {
            false
        } else {
            self.items.push(name);
            true
        }
    }

    /// Whether the set contains `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| item == name)
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Number of names in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

/// What kind of per-leaf problem a diagnostic records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// An attribute could not be qualified against the schema.
    SchemaResolution,
    /// The operator is not expressible by the chosen backend.
    UnsupportedOperator,
    /// A raw value failed to normalize to its declared type.
    ValueNormalization,
    /// An emitted fragment is known to trip the index engine's parser.
    MalformedFragment,
}

/// A recoverable per-leaf problem encountered during planning.
///
/// Diagnostics are a side channel: they never change the emitted plan, only
/// record what was dropped or degraded along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The problem category.
    pub kind: DiagnosticKind,
    /// Human-readable description.
    pub message: String,
}

/// A handle for cancelling a planning pipeline.
///
/// Can be shared between threads to request cancellation from outside the
/// planning thread; the pipeline checks it at stage boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Checks whether cancellation was requested.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// State owned by one planning session.
pub struct SearchContext<'a> {
    schema: &'a dyn SchemaProvider,
    index_keys: &'a dyn IndexKeyCatalog,
    type_name: String,
    is_entity_root: bool,
    config: SearchConfig,
    exclude_deleted_entities: bool,
    index_filtered: AttributeSet,
    graph_filtered: AttributeSet,
    entity_attributes: AttributeSet,
    all_attributes: AttributeSet,
    diagnostics: Vec<Diagnostic>,
    cancellation: CancellationToken,
}

impl<'a> SearchContext<'a> {
    /// Creates a context for planning a search rooted at `type_name`.
    #[must_use]
    pub fn new(
        schema: &'a dyn SchemaProvider,
        index_keys: &'a dyn IndexKeyCatalog,
        type_name: impl Into<String>,
    ) -> Self {
        let type_name = type_name.into();
        let is_entity_root = schema.is_entity_type(&type_name);
        Self {
            schema,
            index_keys,
            type_name,
            is_entity_root,
            config: SearchConfig::new(),
            exclude_deleted_entities: true,
            index_filtered: AttributeSet::new(),
            graph_filtered: AttributeSet::new(),
            entity_attributes: AttributeSet::new(),
            all_attributes: AttributeSet::new(),
            diagnostics: Vec::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Sets the planner configuration.
    #[must_use]
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Controls whether soft-deleted entities are excluded.
    ///
    /// When `true` (the default) the index query carries a state clause
    /// restricting results to active entities.
    #[must_use]
    pub const fn with_exclude_deleted_entities(mut self, exclude: bool) -> Self {
        self.exclude_deleted_entities = exclude;
        self
    }

    /// Attaches a cancellation token shared with the caller.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The schema snapshot for this session.
    ///
    /// The returned borrow is tied to the port, not to the context, so it
    /// can be held across context mutation.
    #[must_use]
    pub fn schema(&self) -> &'a dyn SchemaProvider {
        self.schema
    }

    /// The index-key catalog snapshot for this session.
    #[must_use]
    pub fn index_keys(&self) -> &'a dyn IndexKeyCatalog {
        self.index_keys
    }

    /// The resolved root type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether the root type is an entity (as opposed to a classification).
    #[must_use]
    pub const fn is_entity_root(&self) -> bool {
        self.is_entity_root
    }

    /// The planner configuration.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Whether soft-deleted entities are excluded.
    #[must_use]
    pub const fn exclude_deleted_entities(&self) -> bool {
        self.exclude_deleted_entities
    }

    /// The cancellation token for this session.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Attributes whose qualified form is backed by the index engine.
    #[must_use]
    pub const fn index_filtered(&self) -> &AttributeSet {
        &self.index_filtered
    }

    /// Attributes referenced but not indexed.
    #[must_use]
    pub const fn graph_filtered(&self) -> &AttributeSet {
        &self.graph_filtered
    }

    /// Referenced attributes belonging to the entity root type, exported
    /// for post-filter enrichment.
    #[must_use]
    pub const fn entity_attributes(&self) -> &AttributeSet {
        &self.entity_attributes
    }

    /// Every attribute the filter references and the schema resolves.
    #[must_use]
    pub const fn all_attributes(&self) -> &AttributeSet {
        &self.all_attributes
    }

    /// Diagnostics accumulated so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Records an attribute as index-eligible.
    pub(crate) fn record_index_attribute(&mut self, name: &str) {
        self.index_filtered.insert(name);
    }

    /// Records an attribute as graph-only.
    pub(crate) fn record_graph_attribute(&mut self, name: &str) {
        self.graph_filtered.insert(name);
    }

    /// Records an attribute as belonging to the entity root.
    pub(crate) fn record_entity_attribute(&mut self, name: &str) {
        self.entity_attributes.insert(name);
    }

    /// Records an attribute as referenced.
    pub(crate) fn record_attribute(&mut self, name: &str) {
        self.all_attributes.insert(name);
    }

    /// Records a diagnostic and logs it on the side channel.
    pub(crate) fn record_diagnostic(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        warn!(?kind, "{message}");
        self.diagnostics.push(Diagnostic { kind, message });
    }
}

impl std::fmt::Debug for SearchContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchContext")
            .field("type_name", &self.type_name)
            .field("is_entity_root", &self.is_entity_root)
            .field("index_filtered", &self.index_filtered)
            .field("graph_filtered", &self.graph_filtered)
            .field("entity_attributes", &self.entity_attributes)
            .field("all_attributes", &self.all_attributes)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}
