//! Side table of per-field policies keyed by schema and field name.
//!
//! Policies registered here take precedence over the policy a schema declares
//! on the field itself. This lets callers adjust merge behaviour for a type
//! they do not own without touching its declaration.

use std::collections::HashMap;

use fieldwise_types::{MergePolicy, SchemaId};

use crate::record::FieldDescriptor;

/// Policy overrides keyed by `(schema, field)`.
#[derive(Clone, Debug, Default)]
pub struct PolicyTable {
    entries: HashMap<SchemaId, HashMap<String, MergePolicy>>,
}

impl PolicyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy for a field, returning the previous one.
    pub fn set(
        &mut self,
        schema: &SchemaId,
        field: impl Into<String>,
        policy: MergePolicy,
    ) -> Option<MergePolicy> {
        self.entries
            .entry(schema.clone())
            .or_default()
            .insert(field.into(), policy)
    }

    /// Register a policy for a field of a statically typed record.
    pub fn set_for<R: 'static>(
        &mut self,
        field: impl Into<String>,
        policy: MergePolicy,
    ) -> Option<MergePolicy> {
        self.set(&SchemaId::of::<R>(), field, policy)
    }

    /// Builder form of [`Self::set`].
    pub fn with(mut self, schema: &SchemaId, field: impl Into<String>, policy: MergePolicy) -> Self {
        self.set(schema, field, policy);
        self
    }

    /// Remove a registered policy.
    pub fn remove(&mut self, schema: &SchemaId, field: &str) -> Option<MergePolicy> {
        let fields = self.entries.get_mut(schema)?;
        let removed = fields.remove(field);
        if fields.is_empty() {
            self.entries.remove(schema);
        }
        removed
    }

    /// Look up a registered policy.
    pub fn get(&self, schema: &SchemaId, field: &str) -> Option<MergePolicy> {
        self.entries.get(schema)?.get(field).copied()
    }

    /// Resolve the effective policy for a field: registered, declared, or default.
    pub fn resolve(&self, schema: &SchemaId, field: &FieldDescriptor) -> MergePolicy {
        self.get(schema, field.name())
            .or(field.declared_policy())
            .unwrap_or_default()
    }

    /// Total number of registered overrides.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
