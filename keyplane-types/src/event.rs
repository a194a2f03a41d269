use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// The write verb a [`ChangeEvent`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOperation {
    Create,
    Update,
    Delete,
}

impl ChangeOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOperation::Create => "create",
            ChangeOperation::Update => "update",
            ChangeOperation::Delete => "delete",
        }
    }
}

/// Wire type of a message attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    String,
    Number,
}

/// A typed message attribute attached to a change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub data_type: AttributeType,
    pub value: String,
}

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: AttributeType::String,
            value: value.into(),
        }
    }

    pub fn number(value: impl ToString) -> Self {
        Self {
            data_type: AttributeType::Number,
            value: value.to_string(),
        }
    }
}

/// Named attributes published alongside a change event. Ordered so the
/// published form is deterministic.
pub type MessageAttributes = BTreeMap<String, AttributeValue>;

/// A change notification built per write call and handed to the
/// notification sink. Never persisted by the adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Unique id for downstream deduplication/tracing.
    pub event_id: Uuid,
    pub operation: ChangeOperation,
    /// The written (or deleted) record, prefixes already stripped.
    pub record: Record,
    pub attributes: MessageAttributes,
}

impl ChangeEvent {
    pub fn new(operation: ChangeOperation, record: Record, attributes: MessageAttributes) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            operation,
            record,
            attributes,
        }
    }
}
