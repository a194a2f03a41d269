//! Adapter configuration and per-operation request structs.
//!
//! Each operation takes an explicit request struct with named optional
//! fields and documented defaults; required fields are validated at the
//! boundary with a typed error instead of a missing-key fault.

use keyplane_model::{MergeHints, SchemaSource};
use keyplane_types::{IdempotenceContract, Locator, PrefixConfig, Record};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-request chunk cap for batch writes, matching the store's
/// per-request item limit.
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Static configuration for a [`TableAdapter`](crate::TableAdapter).
#[derive(Debug, Clone, Default)]
pub struct AdapterConfig {
    /// Table this adapter addresses. Informational for logging and
    /// published attributes.
    pub table: String,
    /// The store identifier field guarding conditional inserts.
    pub identifier: String,
    /// Default schema source; individual requests may override it.
    pub schema: Option<SchemaSource>,
    /// Guarded-update behavior.
    pub idempotence: IdempotenceContract,
    /// Default key-prefix configuration; individual requests may
    /// override it.
    pub prefix: PrefixConfig,
    /// Notification delivery configuration.
    pub publish: PublishConfig,
}

/// Where and how change events are published.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Destination (topic/queue identifier). `None` disables publishing.
    pub destination: Option<String>,
    /// Override endpoint for the sink transport.
    pub endpoint: Option<String>,
    /// Include the adapter's default attributes (schema name, identifier,
    /// idempotence key, author, operation).
    pub default_attributes: bool,
    /// Extra attributes merged over the defaults.
    pub custom_attributes: BTreeMap<String, Value>,
    /// Attributed author of writes, when the caller tracks one.
    pub author_identifier: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            destination: None,
            endpoint: None,
            default_attributes: true,
            custom_attributes: BTreeMap::new(),
            author_identifier: None,
        }
    }
}

/// FIFO delivery hints a caller may attach to any write request.
#[derive(Debug, Clone, Default)]
pub struct PublishHints {
    pub fifo_group_id: Option<String>,
    pub fifo_duplication_id: Option<String>,
}

/// Whether `create` inserts (duplicate-guarded) or overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMode {
    #[default]
    Insert,
    Overwrite,
}

/// Request for [`TableAdapter::create`](crate::TableAdapter::create).
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub mode: CreateMode,
    /// The record to write.
    pub data: Record,
    /// Schema override for this call.
    pub schema: Option<SchemaSource>,
    /// Prefix override for this call.
    pub prefix: Option<PrefixConfig>,
    pub publish: PublishHints,
}

impl CreateRequest {
    pub fn insert(data: Record) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn overwrite(data: Record) -> Self {
        Self {
            mode: CreateMode::Overwrite,
            data,
            ..Self::default()
        }
    }
}

/// Request for [`TableAdapter::read`](crate::TableAdapter::read).
#[derive(Debug, Clone, Default)]
pub struct ReadRequest {
    pub locator: Locator,
    /// Return the full page wrapper (cursor included) for query/scan
    /// instead of unwrapping to a bare item list.
    pub raw: bool,
    pub prefix: Option<PrefixConfig>,
}

impl ReadRequest {
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            ..Self::default()
        }
    }

    pub fn raw(locator: Locator) -> Self {
        Self {
            locator,
            raw: true,
            ..Self::default()
        }
    }
}

/// Request for [`TableAdapter::update`](crate::TableAdapter::update).
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// Partial update; absent fields are preserved from the original.
    pub data: Record,
    /// How to find the original record.
    pub locator: Locator,
    /// Per-field merge overrides.
    pub hints: MergeHints,
    pub schema: Option<SchemaSource>,
    pub prefix: Option<PrefixConfig>,
    pub publish: PublishHints,
}

impl UpdateRequest {
    pub fn new(data: Record, locator: Locator) -> Self {
        Self {
            data,
            locator,
            ..Self::default()
        }
    }
}

/// Request for [`TableAdapter::delete`](crate::TableAdapter::delete).
#[derive(Debug, Clone, Default)]
pub struct DeleteRequest {
    pub locator: Locator,
    pub prefix: Option<PrefixConfig>,
    pub publish: PublishHints,
}

impl DeleteRequest {
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            ..Self::default()
        }
    }
}

/// Request for batch insert/delete.
///
/// `data` stays a raw JSON value so a non-array payload can be rejected
/// with a typed error before any I/O.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub data: Value,
    /// Chunk size; defaults to [`DEFAULT_BATCH_SIZE`].
    pub batch_size: usize,
    pub schema: Option<SchemaSource>,
    pub prefix: Option<PrefixConfig>,
}

impl BatchRequest {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            batch_size: DEFAULT_BATCH_SIZE,
            schema: None,
            prefix: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}
