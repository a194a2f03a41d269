use crate::record::Record;
use serde::{Deserialize, Serialize};

/// One page of a query/scan result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Record>,
    /// Cursor addressing the next page, when the store truncated the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Record>,
}

impl Page {
    pub fn new(items: Vec<Record>) -> Self {
        Self {
            items,
            cursor: None,
        }
    }

    pub fn with_cursor(mut self, cursor: Record) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// Tagged result shape for read paths.
///
/// Replaces shape-probing on wrapper mappings: callers and the transcoder
/// match on the variant instead of checking for well-known child keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreResponse {
    /// A single record (direct lookup).
    Single(Record),
    /// An unwrapped item list.
    Collection(Vec<Record>),
    /// The full page wrapper, cursor included — raw query/scan mode.
    Raw(Page),
}

impl StoreResponse {
    /// The contained items, consuming the response.
    pub fn into_items(self) -> Vec<Record> {
        match self {
            StoreResponse::Single(record) => vec![record],
            StoreResponse::Collection(items) => items,
            StoreResponse::Raw(page) => page.items,
        }
    }

    /// The single record, if this is a `Single` response.
    pub fn into_single(self) -> Option<Record> {
        match self {
            StoreResponse::Single(record) => Some(record),
            _ => None,
        }
    }
}
