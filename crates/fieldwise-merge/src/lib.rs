//! Merge engine for Fieldwise.
//!
//! Folds an "update" record onto a "base" record of the same schema, field by
//! field, according to a per-field [`MergePolicy`]. Fields are enumerated in
//! declaration order; each resolves to a policy from the [`PolicyTable`], the
//! schema's own declaration, or the default `Required`.
//!
//! Nested values are replaced wholesale. A nested type that wants fieldwise
//! merging must invoke the engine itself.
//!
//! # Quick Start
//!
//! ```rust
//! use fieldwise_merge::{impl_record, Merger};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Settings {
//!     theme: Option<String>,
//!     volume: u8,
//!     session: Option<String>,
//! }
//!
//! impl_record!(Settings {
//!     theme,
//!     volume,
//!     session => Ignored,
//! });
//!
//! let mut base = Settings { theme: Some("dark".into()), volume: 3, session: Some("s1".into()) };
//! let update = Settings { theme: None, volume: 7, session: Some("s2".into()) };
//!
//! let report = Merger::new().merge(&mut base, &update).unwrap();
//! assert_eq!(base.theme.as_deref(), Some("dark"));
//! assert_eq!(base.volume, 7);
//! assert_eq!(base.session.as_deref(), Some("s1"));
//! assert_eq!(report.skipped(), 1);
//! ```
//!
//! # Modules
//!
//! - [`record`] — The [`Record`] trait and the [`impl_record!`] macro
//! - [`engine`] — [`Merger`], [`merge_into`], and [`MergeReport`]
//! - [`table`] — [`PolicyTable`] side table of policy overrides
//! - [`dynamic`] — [`DynamicSchema`] / [`DynamicRecord`] for runtime schemas
//! - [`config`] — TOML schema files
//! - [`diagnostics`] — Injectable [`DiagnosticSink`]
//! - [`error`] — Error types

pub mod config;
pub mod diagnostics;
pub mod dynamic;
pub mod engine;
pub mod error;
pub mod record;
pub mod table;

pub use config::{FieldConfig, SchemaCatalog, SchemaConfig, SchemaFile};
pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, TracingSink};
pub use dynamic::{DynamicRecord, DynamicSchema};
pub use engine::{merge_into, FieldOutcome, FieldReport, MergeReport, Merger};
pub use error::{AccessFault, ConfigError, MergeError, MergeResult};
pub use fieldwise_types::{MergePolicy, Presence, SchemaId};
pub use record::{AnyValue, FieldDescriptor, Record};
pub use table::PolicyTable;
