//! Schema mapping and record merge strategies for Keyplane.
//!
//! Defines the two pluggable collaborators the adapter validates and
//! combines records with:
//! - [`SchemaMapper`] — coerces a raw record against a named schema;
//!   [`ProjectionMapper`] is the built-in implementation backed by JSON
//!   catalog files
//! - [`RecordMerge`] — combines an existing record with a partial update;
//!   [`ReplaceMerge`] is the built-in replace-unless-append-hint strategy
//!
//! Both are trait seams so callers can swap in their own validation or
//! merge engine without touching the adapter.

mod merge;
mod schema;

pub use merge::{MergeHint, MergeHints, RecordMerge, ReplaceMerge};
pub use schema::{
    FieldType, ProjectionMapper, RecordSchema, SchemaError, SchemaMapper, SchemaResult,
    SchemaSource,
};
