//! Store client abstraction.
//!
//! Defines the contract the adapter consumes from the underlying
//! key/range-partitioned item store. Implementations wrap an actual table
//! service client; tests use an in-memory one.

use keyplane_types::{Page, Record};
use serde_json::Value;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a store client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional write's predicate did not hold at commit time.
    #[error("condition failed on field '{field}'")]
    ConditionFailed { field: String },

    /// Transport or backend failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// Payload could not be encoded for the wire.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Server-side predicate attached to a conditional write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteCondition {
    /// The field must not exist on any stored record with this key
    /// (insert guard).
    FieldAbsent { field: String },
    /// The stored field must still equal the given value at commit time
    /// (idempotence guard).
    FieldEquals { field: String, value: Value },
}

impl WriteCondition {
    /// The guarded field's name.
    pub fn field(&self) -> &str {
        match self {
            WriteCondition::FieldAbsent { field } => field,
            WriteCondition::FieldEquals { field, .. } => field,
        }
    }
}

/// A query or scan request, already prefix-transcoded.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    /// Opaque filter descriptor, passed through untouched.
    pub filter: Option<Value>,
    /// Secondary index name.
    pub index: Option<String>,
    /// Maximum number of items to return.
    pub limit: Option<u32>,
    /// Cursor from a previous page.
    pub start_cursor: Option<Record>,
}

/// Client contract for the underlying item store.
///
/// Conflict detection is delegated entirely to the store's
/// conditional-write primitive; the adapter performs no cross-call
/// locking.
pub trait StoreClient: Send + Sync {
    /// Fetches a single record by its full key.
    fn get_item(&self, key: &Record) -> StoreResult<Option<Record>>;

    /// Writes a record, optionally guarded by a condition. Fails with
    /// [`StoreError::ConditionFailed`] when the predicate does not hold.
    fn put_item(&self, record: Record, condition: Option<WriteCondition>) -> StoreResult<()>;

    /// Runs a key-condition query.
    fn query(&self, request: &QueryRequest) -> StoreResult<Page>;

    /// Runs a table scan.
    fn scan(&self, request: &QueryRequest) -> StoreResult<Page>;

    /// Deletes a record, returning the previous value when `return_old`
    /// is set and a record existed.
    fn delete_item(&self, key: &Record, return_old: bool) -> StoreResult<Option<Record>>;

    /// Opens a batch writer. The writer buffers puts/deletes and releases
    /// its resources on drop.
    fn batch_writer(&self) -> StoreResult<Box<dyn BatchWriter + '_>>;
}

/// Buffered batch-write handle.
///
/// Implementations must release any held resources on drop so that a
/// failure partway through a chunk cannot leak them.
pub trait BatchWriter {
    fn put_item(&mut self, record: Record) -> StoreResult<()>;
    fn delete_key(&mut self, key: Record) -> StoreResult<()>;
    /// Pushes any buffered writes to the store.
    fn flush(&mut self) -> StoreResult<()>;
}

/// Runs `f` against a scoped batch writer.
///
/// The writer is flushed on the success path only; on every path — early
/// return, item-level error — it is dropped and its resources released.
pub fn with_batch_writer<T>(
    client: &dyn StoreClient,
    f: impl FnOnce(&mut dyn BatchWriter) -> StoreResult<T>,
) -> StoreResult<T> {
    let mut writer = client.batch_writer()?;
    let value = f(writer.as_mut())?;
    writer.flush()?;
    Ok(value)
}
