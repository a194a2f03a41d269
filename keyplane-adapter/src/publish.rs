//! Change-notification publishing.
//!
//! The sink is fire-and-forget from the adapter's perspective: a publish
//! failure is logged and isolated, never rolling back a committed write.

use keyplane_types::{AttributeValue, ChangeEvent, MessageAttributes};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Errors raised by a notification sink.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The sink could not deliver the event.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Per-call delivery options resolved from adapter config plus caller
/// hints.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Where the event is delivered (topic ARN, queue URL, channel name).
    /// `None` disables publishing.
    pub destination: Option<String>,
    /// Override endpoint for the sink transport.
    pub endpoint: Option<String>,
    /// Ordering group for FIFO destinations.
    pub fifo_group_id: Option<String>,
    /// Deduplication id for FIFO destinations.
    pub fifo_duplication_id: Option<String>,
}

/// Delivers a change event. Best-effort: errors are surfaced to the
/// adapter only for logging.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: &ChangeEvent, options: &PublishOptions) -> PublishResult<()>;
}

/// Sink that drops every event. Default for compositions without a
/// notification transport, and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn publish(&self, _event: &ChangeEvent, _options: &PublishOptions) -> PublishResult<()> {
        Ok(())
    }
}

/// Formats raw attribute values into typed message attributes.
///
/// Null values are dropped; JSON numbers are typed `Number`, everything
/// else is stringified as `String`.
pub fn format_attributes(raw: &BTreeMap<String, Value>) -> MessageAttributes {
    let mut formatted = MessageAttributes::new();
    for (name, value) in raw {
        let attribute = match value {
            Value::Null => continue,
            Value::Number(number) => AttributeValue::number(number),
            Value::String(text) => AttributeValue::string(text.clone()),
            other => AttributeValue::string(other.to_string()),
        };
        formatted.insert(name.clone(), attribute);
    }
    formatted
}
