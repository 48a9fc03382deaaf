//! Injectable diagnostics for the merge engine.
//!
//! The engine never logs directly. It reports noteworthy events to a
//! [`DiagnosticSink`] owned by the [`Merger`](crate::Merger). [`TracingSink`]
//! forwards them to `tracing`; [`MemorySink`] keeps them for inspection.

use std::sync::Mutex;

use fieldwise_types::SchemaId;

/// An event worth surfacing from a merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// The schema declares no fields; the merge was a no-op.
    EmptySchema { schema: SchemaId },
    /// A field could not be read or written; the merge is being aborted.
    FieldFailed {
        schema: SchemaId,
        field: String,
        reason: String,
    },
    /// A merge completed.
    Merged {
        schema: SchemaId,
        overwritten: usize,
        kept: usize,
        skipped: usize,
    },
}

/// Receiver for merge diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Record a diagnostic.
    fn notice(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn notice(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::EmptySchema { schema } => {
                tracing::warn!(schema = %schema, "schema has no declared fields");
            }
            Diagnostic::FieldFailed {
                schema,
                field,
                reason,
            } => {
                tracing::error!(schema = %schema, field = %field, %reason, "field merge failed");
            }
            Diagnostic::Merged {
                schema,
                overwritten,
                kept,
                skipped,
            } => {
                tracing::debug!(
                    schema = %schema,
                    overwritten,
                    kept,
                    skipped,
                    "merge complete"
                );
            }
        }
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded diagnostics, oldest first.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn notice(&self, diagnostic: &Diagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic.clone());
    }
}
