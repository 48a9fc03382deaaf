//! Error types for the merge engine.

use fieldwise_types::SchemaId;
use thiserror::Error;

/// A failure reading or writing one field of a record.
///
/// Raised by [`Record`](crate::Record) implementations; the engine wraps it in
/// [`MergeError::FieldAccess`] together with the schema and field name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessFault {
    /// The schema does not declare a field with this name.
    #[error("no such field: {name}")]
    UnknownField { name: String },

    /// The stored value does not have the type the field expects.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The field exists but may not be read or written.
    #[error("access restricted: {0}")]
    Restricted(String),
}

impl AccessFault {
    /// Create an `UnknownField` fault.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownField { name: name.into() }
    }
}

/// Errors that can occur during a merge.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The two records do not share a schema. Nothing was modified.
    #[error("<{base}> can not merge with other schema <{incoming}>")]
    SchemaMismatch { base: SchemaId, incoming: SchemaId },

    /// A field could not be read or written; the merge was aborted.
    #[error("field '{field}' of <{schema}> could not be merged: {source}")]
    FieldAccess {
        schema: SchemaId,
        field: String,
        #[source]
        source: AccessFault,
    },
}

impl MergeError {
    /// Returns `true` for a schema mismatch.
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. })
    }

    /// The failing field name, for field access errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::FieldAccess { field, .. } => Some(field.as_str()),
            Self::SchemaMismatch { .. } => None,
        }
    }
}

/// Errors raised while loading schema files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The schema file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The schema file is not valid TOML or does not match the layout.
    #[error("invalid schema file: {0}")]
    Parse(String),

    /// Two schemas share a name.
    #[error("duplicate schema: {0}")]
    DuplicateSchema(String),

    /// A schema declares the same field twice.
    #[error("duplicate field '{field}' in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    /// A schema or field name is blank.
    #[error("blank name in schema file: {0}")]
    BlankName(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
