//! Core type definitions for Keyplane.
//!
//! This crate defines the fundamental, store-agnostic types used throughout
//! the adapter layer:
//! - [`Record`] — the ordered field→value mapping items are expressed as
//! - [`Locator`] and [`Page`] — how items are addressed and paginated
//! - [`StoreResponse`] — tagged result shape returned by read paths
//! - [`PrefixConfig`] — key-namespacing configuration
//! - [`IdempotenceContract`] — guarded-update configuration
//! - [`ChangeEvent`] — the notification payload emitted after writes
//!
//! Store-specific wire formats (expression syntax, attribute encodings)
//! belong to the store client implementation, not here.

mod event;
mod idempotence;
mod locator;
mod prefix;
mod record;
mod response;

pub use event::{AttributeType, AttributeValue, ChangeEvent, ChangeOperation, MessageAttributes};
pub use idempotence::IdempotenceContract;
pub use locator::{Locator, ReadOperation};
pub use prefix::PrefixConfig;
pub use record::{record_from_value, Record};
pub use response::{Page, StoreResponse};
