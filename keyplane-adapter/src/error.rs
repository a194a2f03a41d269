//! Error types for the adapter layer.

use crate::store::StoreError;
use keyplane_model::SchemaError;
use thiserror::Error;

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Errors surfaced to callers of the adapter.
///
/// No failure is retried internally; every variant carries enough context
/// (field name, expected vs actual) for the caller to act on.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// An update locator resolved no record. Fatal, no retry.
    #[error("no record found to update: {0}")]
    NotFound(String),

    /// The record failed schema validation. The caller must fix the input.
    #[error(transparent)]
    SchemaViolation(#[from] SchemaError),

    /// The guard field is configured but absent on the stored record.
    #[error("idempotence key '{field}' not found in original record")]
    MissingIdempotenceValue { field: String },

    /// The caller attempted to change the guarded field during an update.
    #[error("idempotence key '{field}' value changed: expected {expected}, got {actual}")]
    IdempotenceConflict {
        field: String,
        expected: String,
        actual: String,
    },

    /// `use_latest` requires timestamp-parseable guard values.
    #[error("idempotence key '{field}' holds a non-timestamp value: {value}")]
    InvalidIdempotenceValue { field: String, value: String },

    /// The conditional write lost a race with a concurrent update. The
    /// caller may retry the whole update cycle (re-fetch included).
    #[error("concurrent modification detected on field '{field}'")]
    ConcurrentModification { field: String },

    /// Insert found an existing record with the same identifier.
    #[error("record with identifier field '{field}' already exists")]
    DuplicateKey { field: String },

    /// Batch input had the wrong shape. Rejected before any I/O.
    #[error("batch item error: {0}")]
    BatchItem(String),

    /// A required request field is missing or malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The store client failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
