//! Shared test fixtures: an in-memory store client and a recording sink.

#![allow(dead_code)]

use keyplane_adapter::{
    BatchWriter, NotificationSink, PublishError, PublishOptions, PublishResult, QueryRequest,
    StoreClient, StoreError, StoreResult, WriteCondition,
};
use keyplane_types::{ChangeEvent, Page, Record};
use serde_json::json;
use std::sync::{Mutex, Once};

/// Routes adapter logs through the test harness. Honors `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Builds a record from a JSON object literal.
pub fn record(value: serde_json::Value) -> Record {
    value.as_object().expect("test record must be an object").clone()
}

/// The baseline item used across adapter tests.
pub fn base_item() -> Record {
    record(json!({
        "test_id": "abc123",
        "test_query_id": "def345",
        "object_key": {"string_key": "nothing"},
        "array_number": [1, 2, 3],
        "created": "2020-10-05",
        "modified": "2020-10-05",
    }))
}

#[derive(Default)]
struct MemoryInner {
    records: Vec<Record>,
    put_calls: Vec<(Record, Option<WriteCondition>)>,
    put_chunks: Vec<Vec<Record>>,
    delete_chunks: Vec<Vec<Record>>,
    writer_drops: usize,
    query_page: Option<Page>,
    scan_cursor: Option<Record>,
    fail_batch_at: Option<usize>,
    batch_ops_seen: usize,
}

/// In-memory stand-in for a partitioned table, recording every call so
/// tests can assert on conditions, chunking, and resource release.
pub struct MemoryStore {
    key_fields: Vec<String>,
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new(key_fields: &[&str]) -> Self {
        Self {
            key_fields: key_fields.iter().map(|field| field.to_string()).collect(),
            inner: Mutex::new(MemoryInner::default()),
        }
    }

    /// Stores a record directly, bypassing conditions. Replaces any
    /// record with the same key.
    pub fn seed(&self, item: Record) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(position) = self.position_of(&inner.records, &item) {
            inner.records[position] = item;
        } else {
            inner.records.push(item);
        }
    }

    /// Cans the next query response.
    pub fn set_query_page(&self, page: Page) {
        self.inner.lock().unwrap().query_page = Some(page);
    }

    /// Makes subsequent scans report a pagination cursor.
    pub fn set_scan_cursor(&self, cursor: Record) {
        self.inner.lock().unwrap().scan_cursor = Some(cursor);
    }

    /// Makes the nth batch-writer operation (1-based, across chunks) fail.
    pub fn fail_batch_at(&self, nth: usize) {
        self.inner.lock().unwrap().fail_batch_at = Some(nth);
    }

    pub fn records(&self) -> Vec<Record> {
        self.inner.lock().unwrap().records.clone()
    }

    pub fn put_calls(&self) -> Vec<(Record, Option<WriteCondition>)> {
        self.inner.lock().unwrap().put_calls.clone()
    }

    pub fn put_chunks(&self) -> Vec<Vec<Record>> {
        self.inner.lock().unwrap().put_chunks.clone()
    }

    pub fn delete_chunks(&self) -> Vec<Vec<Record>> {
        self.inner.lock().unwrap().delete_chunks.clone()
    }

    pub fn writer_drops(&self) -> usize {
        self.inner.lock().unwrap().writer_drops
    }

    fn position_of(&self, records: &[Record], key: &Record) -> Option<usize> {
        records.iter().position(|candidate| {
            self.key_fields
                .iter()
                .all(|field| candidate.get(field) == key.get(field))
        })
    }

    fn check_condition(
        existing: Option<&Record>,
        condition: &WriteCondition,
    ) -> StoreResult<()> {
        match condition {
            WriteCondition::FieldAbsent { field } => match existing {
                Some(record) if record.contains_key(field) => Err(StoreError::ConditionFailed {
                    field: field.clone(),
                }),
                _ => Ok(()),
            },
            WriteCondition::FieldEquals { field, value } => match existing {
                Some(record) if record.get(field) == Some(value) => Ok(()),
                _ => Err(StoreError::ConditionFailed {
                    field: field.clone(),
                }),
            },
        }
    }
}

impl StoreClient for MemoryStore {
    fn get_item(&self, key: &Record) -> StoreResult<Option<Record>> {
        let inner = self.inner.lock().unwrap();
        Ok(self
            .position_of(&inner.records, key)
            .map(|position| inner.records[position].clone()))
    }

    fn put_item(&self, item: Record, condition: Option<WriteCondition>) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let existing = self
            .position_of(&inner.records, &item)
            .map(|position| inner.records[position].clone());
        if let Some(condition) = &condition {
            Self::check_condition(existing.as_ref(), condition)?;
        }
        inner.put_calls.push((item.clone(), condition));
        if let Some(position) = self.position_of(&inner.records, &item) {
            inner.records[position] = item;
        } else {
            inner.records.push(item);
        }
        Ok(())
    }

    fn query(&self, _request: &QueryRequest) -> StoreResult<Page> {
        let inner = self.inner.lock().unwrap();
        match &inner.query_page {
            Some(page) => Ok(page.clone()),
            None => Ok(Page::new(inner.records.clone())),
        }
    }

    fn scan(&self, _request: &QueryRequest) -> StoreResult<Page> {
        let inner = self.inner.lock().unwrap();
        let mut page = Page::new(inner.records.clone());
        page.cursor = inner.scan_cursor.clone();
        Ok(page)
    }

    fn delete_item(&self, key: &Record, return_old: bool) -> StoreResult<Option<Record>> {
        let mut inner = self.inner.lock().unwrap();
        match self.position_of(&inner.records, key) {
            Some(position) => {
                let removed = inner.records.remove(position);
                Ok(return_old.then_some(removed))
            }
            None => Ok(None),
        }
    }

    fn batch_writer(&self) -> StoreResult<Box<dyn BatchWriter + '_>> {
        Ok(Box::new(MemoryBatchWriter {
            store: self,
            puts: Vec::new(),
            deletes: Vec::new(),
        }))
    }
}

struct MemoryBatchWriter<'a> {
    store: &'a MemoryStore,
    puts: Vec<Record>,
    deletes: Vec<Record>,
}

impl MemoryBatchWriter<'_> {
    fn bump_op_counter(&self) -> StoreResult<()> {
        let mut inner = self.store.inner.lock().unwrap();
        inner.batch_ops_seen += 1;
        if inner.fail_batch_at == Some(inner.batch_ops_seen) {
            return Err(StoreError::Backend("injected batch failure".into()));
        }
        Ok(())
    }
}

impl BatchWriter for MemoryBatchWriter<'_> {
    fn put_item(&mut self, item: Record) -> StoreResult<()> {
        self.bump_op_counter()?;
        self.puts.push(item);
        Ok(())
    }

    fn delete_key(&mut self, key: Record) -> StoreResult<()> {
        self.bump_op_counter()?;
        self.deletes.push(key);
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        let puts = std::mem::take(&mut self.puts);
        let deletes = std::mem::take(&mut self.deletes);
        let mut inner = self.store.inner.lock().unwrap();
        if !puts.is_empty() {
            for item in &puts {
                match self.store.position_of(&inner.records, item) {
                    Some(position) => inner.records[position] = item.clone(),
                    None => inner.records.push(item.clone()),
                }
            }
            inner.put_chunks.push(puts);
        }
        if !deletes.is_empty() {
            for key in &deletes {
                if let Some(position) = self.store.position_of(&inner.records, key) {
                    inner.records.remove(position);
                }
            }
            inner.delete_chunks.push(deletes);
        }
        Ok(())
    }
}

impl Drop for MemoryBatchWriter<'_> {
    fn drop(&mut self) {
        self.store.inner.lock().unwrap().writer_drops += 1;
    }
}

/// Sink that records every published event, optionally failing delivery.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(ChangeEvent, PublishOptions)>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<(ChangeEvent, PublishOptions)> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, event: &ChangeEvent, options: &PublishOptions) -> PublishResult<()> {
        self.events
            .lock()
            .unwrap()
            .push((event.clone(), options.clone()));
        if self.fail {
            return Err(PublishError::Delivery("sink offline".into()));
        }
        Ok(())
    }
}
