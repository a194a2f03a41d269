use crate::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which read path a [`Locator`] resolves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadOperation {
    /// Direct key lookup.
    #[default]
    Get,
    /// Key-condition query, possibly against a secondary index.
    Query,
    /// Full table scan with an optional filter.
    Scan,
}

/// Addresses one or more items: either a direct key or a query/scan
/// descriptor.
///
/// Only `key` and `start_cursor` participate in key-prefix transcoding;
/// `filter` is opaque to the adapter and passed through to the store client
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Locator {
    /// Read path discriminator.
    #[serde(default)]
    pub operation: ReadOperation,
    /// Direct lookup key (partition field, optional sort field).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Record>,
    /// Opaque query/filter descriptor for the store client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    /// Secondary index name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Maximum number of items to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Pagination cursor from a previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<Record>,
}

impl Locator {
    /// Locator for a direct key lookup.
    pub fn key(key: Record) -> Self {
        Self {
            operation: ReadOperation::Get,
            key: Some(key),
            ..Self::default()
        }
    }

    /// Locator for a query with the given filter descriptor.
    pub fn query(filter: Value) -> Self {
        Self {
            operation: ReadOperation::Query,
            filter: Some(filter),
            ..Self::default()
        }
    }

    /// Locator for a scan.
    pub fn scan() -> Self {
        Self {
            operation: ReadOperation::Scan,
            ..Self::default()
        }
    }

    /// Sets the secondary index name.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Sets the pagination cursor.
    pub fn with_start_cursor(mut self, cursor: Record) -> Self {
        self.start_cursor = Some(cursor);
        self
    }

    /// Sets the item limit.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}
