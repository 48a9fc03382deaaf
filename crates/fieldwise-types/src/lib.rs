//! Foundation types for Fieldwise.
//!
//! This crate provides the vocabulary shared by the merge engine and anything
//! that declares merge policies: the per-field policy itself, the notion of a
//! value being *present*, and the runtime identity of a record schema.
//!
//! # Key Types
//!
//! - [`MergePolicy`] — Three-valued per-field merge instruction
//! - [`Presence`] — Whether a field value carries data or is the absent sentinel
//! - [`SchemaId`] — Runtime schema identity used to guard merge compatibility

pub mod error;
pub mod policy;
pub mod presence;
pub mod schema;

pub use error::PolicyParseError;
pub use policy::MergePolicy;
pub use presence::Presence;
pub use schema::SchemaId;
