//! Schema-validated CRUD and idempotent-update adapter over
//! key/range-partitioned item stores.
//!
//! Keyplane normalizes access to a DynamoDB-style table service:
//! - schema-validated create/read/update/delete plus chunked batch writes
//! - an update orchestrator enforcing an idempotence contract through
//!   conditional writes
//! - reversible key-prefix transcoding for multi-tenant or
//!   type-namespaced key layouts
//! - at-most-once change notifications after committed writes
//!
//! # Architecture
//!
//! The adapter is a stateless transform between caller and store. The
//! store client, schema mapper, merge strategy, and notification sink are
//! trait collaborators injected at construction; conflict detection is
//! delegated entirely to the store's conditional-write primitive.
//!
//! # Example
//!
//! ```no_run
//! use keyplane_adapter::{AdapterConfig, CreateRequest, TableAdapter};
//! use std::sync::Arc;
//!
//! # fn client() -> Arc<dyn keyplane_adapter::StoreClient> { unimplemented!() }
//! let adapter = TableAdapter::new(
//!     client(),
//!     AdapterConfig {
//!         table: "widgets".into(),
//!         identifier: "widget_id".into(),
//!         ..AdapterConfig::default()
//!     },
//! );
//!
//! let record = serde_json::json!({"widget_id": "abc123", "name": "widget"});
//! adapter.create(CreateRequest::insert(record.as_object().unwrap().clone()))?;
//! # Ok::<(), keyplane_adapter::AdapterError>(())
//! ```

mod adapter;
mod cache;
mod config;
mod error;
mod publish;
mod store;
mod transcoder;

pub use adapter::TableAdapter;
pub use cache::{HandleCache, DEFAULT_HANDLE_CAPACITY};
pub use config::{
    AdapterConfig, BatchRequest, CreateMode, CreateRequest, DeleteRequest, PublishConfig,
    PublishHints, ReadRequest, UpdateRequest, DEFAULT_BATCH_SIZE,
};
pub use error::{AdapterError, AdapterResult};
pub use publish::{
    format_attributes, NoopSink, NotificationSink, PublishError, PublishOptions, PublishResult,
};
pub use store::{
    with_batch_writer, BatchWriter, QueryRequest, StoreClient, StoreError, StoreResult,
    WriteCondition,
};
pub use transcoder::Transcoder;
