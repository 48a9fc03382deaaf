use std::fmt;
use std::sync::Arc;

use fieldwise_types::{MergePolicy, SchemaId};

use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::{AccessFault, MergeError, MergeResult};
use crate::record::{AnyValue, Record};
use crate::table::PolicyTable;

// ---------------------------------------------------------------------------
// MergeReport
// ---------------------------------------------------------------------------

/// What a merge did to one field of the base record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldOutcome {
    /// The field is `Ignored`; neither side was read.
    Skipped,
    /// The base field now holds the incoming value.
    Overwritten,
    /// The incoming value was absent, so the base value was kept.
    Kept,
}

impl fmt::Display for FieldOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::Overwritten => write!(f, "overwritten"),
            Self::Kept => write!(f, "kept"),
        }
    }
}

/// Outcome of one field, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldReport {
    /// Field name.
    pub field: String,
    /// The policy that was applied.
    pub policy: MergePolicy,
    /// What happened to the base field.
    pub outcome: FieldOutcome,
}

/// Per-field account of a completed merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeReport {
    /// Schema of the merged records.
    pub schema: SchemaId,
    /// Field outcomes in declaration order.
    pub fields: Vec<FieldReport>,
}

impl MergeReport {
    fn new(schema: SchemaId, capacity: usize) -> Self {
        Self {
            schema,
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Returns `true` if the schema had no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Outcome for the named field.
    pub fn outcome(&self, field: &str) -> Option<FieldOutcome> {
        self.fields
            .iter()
            .find(|r| r.field == field)
            .map(|r| r.outcome)
    }

    /// Number of fields overwritten from the incoming record.
    pub fn overwritten(&self) -> usize {
        self.count(FieldOutcome::Overwritten)
    }

    /// Number of fields kept because the incoming value was absent.
    pub fn kept(&self) -> usize {
        self.count(FieldOutcome::Kept)
    }

    /// Number of ignored fields.
    pub fn skipped(&self) -> usize {
        self.count(FieldOutcome::Skipped)
    }

    fn count(&self, outcome: FieldOutcome) -> usize {
        self.fields.iter().filter(|r| r.outcome == outcome).count()
    }
}

// ---------------------------------------------------------------------------
// Merger
// ---------------------------------------------------------------------------

/// The merge engine.
///
/// Folds an incoming record onto a base record of the same schema, one field
/// at a time, according to each field's resolved policy. A merger holds no
/// per-call state, so one instance can serve concurrent merges of different
/// record pairs.
///
/// Failure handling is **abort on first fault**: a schema mismatch is
/// detected before any field is touched, and the first field that cannot be
/// read or written stops the merge. Fields processed before the fault keep
/// their merged values; the failing field and everything after it are left
/// as they were.
#[derive(Clone)]
pub struct Merger {
    policies: PolicyTable,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Merger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merger")
            .field("policies", &self.policies)
            .finish_non_exhaustive()
    }
}

impl Merger {
    /// A merger with no policy overrides that reports through `tracing`.
    pub fn new() -> Self {
        Self {
            policies: PolicyTable::new(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the policy override table.
    pub fn with_policies(mut self, policies: PolicyTable) -> Self {
        self.policies = policies;
        self
    }

    /// Replace the diagnostic sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The active policy overrides.
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Mutable access to the policy overrides.
    pub fn policies_mut(&mut self) -> &mut PolicyTable {
        &mut self.policies
    }

    /// Fold `incoming` onto `base` in place.
    pub fn merge<R: Record>(&self, base: &mut R, incoming: &R) -> MergeResult<MergeReport> {
        let schema = base.schema();
        let incoming_schema = incoming.schema();
        if schema != incoming_schema {
            return Err(MergeError::SchemaMismatch {
                base: schema,
                incoming: incoming_schema,
            });
        }

        let fields = base.fields();
        if fields.is_empty() {
            self.sink.notice(&Diagnostic::EmptySchema {
                schema: schema.clone(),
            });
            return Ok(MergeReport::new(schema, 0));
        }

        let mut report = MergeReport::new(schema, fields.len());
        for field in &fields {
            let policy = self.policies.resolve(&report.schema, field);
            let outcome = match apply(base, incoming, field.name(), policy) {
                Ok(outcome) => outcome,
                Err(source) => {
                    self.sink.notice(&Diagnostic::FieldFailed {
                        schema: report.schema.clone(),
                        field: field.name().to_string(),
                        reason: source.to_string(),
                    });
                    return Err(MergeError::FieldAccess {
                        schema: report.schema,
                        field: field.name().to_string(),
                        source,
                    });
                }
            };
            report.fields.push(FieldReport {
                field: field.name().to_string(),
                policy,
                outcome,
            });
        }

        self.sink.notice(&Diagnostic::Merged {
            schema: report.schema.clone(),
            overwritten: report.overwritten(),
            kept: report.kept(),
            skipped: report.skipped(),
        });
        Ok(report)
    }

    /// Fold a type-erased `incoming` value onto `base`.
    ///
    /// Fails with [`MergeError::SchemaMismatch`] when `incoming` is not an
    /// `R`, naming the concrete incoming type.
    pub fn merge_any<R: Record>(
        &self,
        base: &mut R,
        incoming: &dyn AnyValue,
    ) -> MergeResult<MergeReport> {
        match incoming.as_any().downcast_ref::<R>() {
            Some(incoming) => self.merge(base, incoming),
            None => Err(MergeError::SchemaMismatch {
                base: base.schema(),
                incoming: incoming.type_schema(),
            }),
        }
    }
}

fn apply<R: Record>(
    base: &mut R,
    incoming: &R,
    field: &str,
    policy: MergePolicy,
) -> Result<FieldOutcome, AccessFault> {
    match policy {
        MergePolicy::Ignored => Ok(FieldOutcome::Skipped),
        MergePolicy::Required => {
            if incoming.is_present(field)? {
                base.assign(field, incoming)?;
                Ok(FieldOutcome::Overwritten)
            } else {
                Ok(FieldOutcome::Kept)
            }
        }
        MergePolicy::Mandatory => {
            base.assign(field, incoming)?;
            Ok(FieldOutcome::Overwritten)
        }
    }
}

/// Fold `incoming` onto `base` with a default [`Merger`] and return `base`.
pub fn merge_into<'a, R: Record>(base: &'a mut R, incoming: &R) -> MergeResult<&'a mut R> {
    Merger::new().merge(base, incoming)?;
    Ok(base)
}
