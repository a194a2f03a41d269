//! CRUD façade and update orchestrator.
//!
//! The adapter is stateless per call: it normalizes a request, delegates
//! validation and merging to its collaborators, talks to the store client,
//! and emits a change notification. All conflict detection is delegated to
//! the store's conditional-write primitive.

use crate::config::{
    AdapterConfig, BatchRequest, CreateMode, CreateRequest, DeleteRequest, PublishHints,
    ReadRequest, UpdateRequest,
};
use crate::error::{AdapterError, AdapterResult};
use crate::publish::{format_attributes, NoopSink, NotificationSink, PublishOptions};
use crate::store::{with_batch_writer, QueryRequest, StoreClient, StoreError, WriteCondition};
use crate::transcoder::Transcoder;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use keyplane_model::{
    ProjectionMapper, RecordMerge, ReplaceMerge, SchemaMapper, SchemaSource,
};
use keyplane_types::{
    ChangeEvent, ChangeOperation, Locator, PrefixConfig, ReadOperation, Record, StoreResponse,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of the idempotence guard check on an update.
enum GuardOutcome {
    /// Proceed to the write, optionally guarded by a condition.
    Write(Option<WriteCondition>),
    /// The stored record is already current; skip the write and return it.
    ReturnOriginal,
}

/// Normalization façade over a single table of a partitioned item store.
///
/// Collaborators are injected at construction; the defaults are the
/// built-in projection mapper, replace merge, and a no-op sink.
pub struct TableAdapter {
    store: Arc<dyn StoreClient>,
    mapper: Arc<dyn SchemaMapper>,
    merger: Arc<dyn RecordMerge>,
    sink: Arc<dyn NotificationSink>,
    config: AdapterConfig,
}

impl TableAdapter {
    /// Adapter with default collaborators.
    pub fn new(store: Arc<dyn StoreClient>, config: AdapterConfig) -> Self {
        Self {
            store,
            mapper: Arc::new(ProjectionMapper::new()),
            merger: Arc::new(ReplaceMerge),
            sink: Arc::new(NoopSink),
            config,
        }
    }

    /// Replaces the schema mapper.
    pub fn with_mapper(mut self, mapper: Arc<dyn SchemaMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Replaces the merge strategy.
    pub fn with_merger(mut self, merger: Arc<dyn RecordMerge>) -> Self {
        self.merger = merger;
        self
    }

    /// Replaces the notification sink.
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    // ── Create ───────────────────────────────────────────────────

    /// Dispatches to [`TableAdapter::insert`] or
    /// [`TableAdapter::overwrite`] by request mode.
    pub fn create(&self, request: CreateRequest) -> AdapterResult<Record> {
        match request.mode {
            CreateMode::Insert => self.insert(request),
            CreateMode::Overwrite => self.overwrite(request),
        }
    }

    /// Writes a new record, guarded by "identifier field absent".
    pub fn insert(&self, request: CreateRequest) -> AdapterResult<Record> {
        let identifier = self.identifier()?;
        let payload = self.map_with_schema(&request.data, request.schema.as_ref())?;
        match payload.get(&identifier) {
            Some(value) if !value.is_null() => {}
            _ => {
                return Err(AdapterError::InvalidRequest(format!(
                    "identifier field '{identifier}' must be present and non-null"
                )));
            }
        }
        let transcoder = self.transcoder_for(request.prefix.as_ref());
        let stored = transcoder.apply(&payload);
        self.store
            .put_item(
                stored.clone(),
                Some(WriteCondition::FieldAbsent {
                    field: identifier.clone(),
                }),
            )
            .map_err(|err| match err {
                StoreError::ConditionFailed { .. } => {
                    AdapterError::DuplicateKey { field: identifier }
                }
                other => AdapterError::Store(other),
            })?;
        let cleaned = transcoder.strip(&stored);
        self.publish_event(ChangeOperation::Create, &cleaned, &request.publish);
        Ok(cleaned)
    }

    /// Writes a record unconditionally, replacing any existing one.
    pub fn overwrite(&self, request: CreateRequest) -> AdapterResult<Record> {
        let payload = self.map_with_schema(&request.data, request.schema.as_ref())?;
        let transcoder = self.transcoder_for(request.prefix.as_ref());
        let stored = transcoder.apply(&payload);
        self.store.put_item(stored.clone(), None)?;
        let cleaned = transcoder.strip(&stored);
        self.publish_event(ChangeOperation::Create, &cleaned, &request.publish);
        Ok(cleaned)
    }

    // ── Read ─────────────────────────────────────────────────────

    /// Dispatches to get/query/scan by the locator's operation.
    pub fn read(&self, request: ReadRequest) -> AdapterResult<StoreResponse> {
        match request.locator.operation {
            ReadOperation::Get => Ok(StoreResponse::Single(self.get(&request)?)),
            ReadOperation::Query => self.query(&request),
            ReadOperation::Scan => self.scan(&request),
        }
    }

    /// Direct key lookup. Returns an empty record when nothing is stored
    /// under the key.
    pub fn get(&self, request: &ReadRequest) -> AdapterResult<Record> {
        let transcoder = self.transcoder_for(request.prefix.as_ref());
        let locator = transcoder.apply_locator(&request.locator);
        let key = locator
            .key
            .ok_or_else(|| AdapterError::InvalidRequest("get requires a locator key".into()))?;
        let record = self.store.get_item(&key)?.unwrap_or_default();
        Ok(transcoder.strip(&record))
    }

    /// Key-condition query. Raw mode returns the page wrapper (cursor
    /// included) so callers can paginate.
    pub fn query(&self, request: &ReadRequest) -> AdapterResult<StoreResponse> {
        let transcoder = self.transcoder_for(request.prefix.as_ref());
        let locator = transcoder.apply_locator(&request.locator);
        let page = self.store.query(&Self::query_request(locator))?;
        let cleaned = transcoder.strip_page(&page);
        if request.raw {
            Ok(StoreResponse::Raw(cleaned))
        } else {
            Ok(StoreResponse::Collection(cleaned.items))
        }
    }

    /// Table scan, with the same raw-mode contract as
    /// [`TableAdapter::query`].
    pub fn scan(&self, request: &ReadRequest) -> AdapterResult<StoreResponse> {
        let transcoder = self.transcoder_for(request.prefix.as_ref());
        let locator = transcoder.apply_locator(&request.locator);
        let page = self.store.scan(&Self::query_request(locator))?;
        let cleaned = transcoder.strip_page(&page);
        if request.raw {
            Ok(StoreResponse::Raw(cleaned))
        } else {
            Ok(StoreResponse::Collection(cleaned.items))
        }
    }

    // ── Update ───────────────────────────────────────────────────

    /// Orchestrated update: fetch-original → merge → validate → guard
    /// check → conditional write → respond.
    pub fn update(&self, request: UpdateRequest) -> AdapterResult<Record> {
        let transcoder = self.transcoder_for(request.prefix.as_ref());
        let original = self.fetch_original(&request, &transcoder)?;
        let merged = self.merger.merge(&original, &request.data, &request.hints);
        let payload = self.map_with_schema(&merged, request.schema.as_ref())?;
        let stored = transcoder.apply(&payload);
        let candidate = transcoder.strip(&stored);

        match self.guard_check(&original, &candidate)? {
            GuardOutcome::ReturnOriginal => {
                debug!(
                    table = %self.config.table,
                    "stored record is newer; skipping update"
                );
                Ok(original)
            }
            GuardOutcome::Write(condition) => {
                self.store
                    .put_item(stored, condition)
                    .map_err(|err| match err {
                        StoreError::ConditionFailed { field } => {
                            AdapterError::ConcurrentModification { field }
                        }
                        other => AdapterError::Store(other),
                    })?;
                self.publish_event(ChangeOperation::Update, &candidate, &request.publish);
                Ok(candidate)
            }
        }
    }

    // ── Delete ───────────────────────────────────────────────────

    /// Deletes by key, returning the previous record (empty when nothing
    /// was stored).
    pub fn delete(&self, request: DeleteRequest) -> AdapterResult<Record> {
        let transcoder = self.transcoder_for(request.prefix.as_ref());
        let locator = transcoder.apply_locator(&request.locator);
        let key = locator
            .key
            .ok_or_else(|| AdapterError::InvalidRequest("delete requires a locator key".into()))?;
        let previous = self.store.delete_item(&key, true)?.unwrap_or_default();
        let cleaned = transcoder.strip(&previous);
        self.publish_event(ChangeOperation::Delete, &cleaned, &request.publish);
        Ok(cleaned)
    }

    // ── Batch ────────────────────────────────────────────────────

    /// Schema-maps, transcodes, and writes records in order-preserving
    /// chunks through a scoped batch writer.
    pub fn batch_insert(&self, request: BatchRequest) -> AdapterResult<()> {
        let records = Self::batch_records(&request.data)?;
        let mapped = records
            .iter()
            .map(|record| self.map_with_schema(record, request.schema.as_ref()))
            .collect::<AdapterResult<Vec<Record>>>()?;
        let transcoder = self.transcoder_for(request.prefix.as_ref());
        let chunk_size = request.batch_size.max(1);
        with_batch_writer(self.store.as_ref(), |writer| {
            for chunk in mapped.chunks(chunk_size) {
                for item in transcoder.apply_all(chunk) {
                    writer.put_item(item)?;
                }
                writer.flush()?;
            }
            Ok(())
        })?;
        debug!(
            table = %self.config.table,
            count = mapped.len(),
            "batch insert complete"
        );
        Ok(())
    }

    /// Deletes the given keys in order-preserving chunks through a scoped
    /// batch writer.
    pub fn batch_delete(&self, request: BatchRequest) -> AdapterResult<()> {
        let keys = Self::batch_records(&request.data)?;
        let transcoder = self.transcoder_for(request.prefix.as_ref());
        let chunk_size = request.batch_size.max(1);
        with_batch_writer(self.store.as_ref(), |writer| {
            for chunk in keys.chunks(chunk_size) {
                for key in transcoder.apply_all(chunk) {
                    writer.delete_key(key)?;
                }
                writer.flush()?;
            }
            Ok(())
        })?;
        debug!(
            table = %self.config.table,
            count = keys.len(),
            "batch delete complete"
        );
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────

    fn identifier(&self) -> AdapterResult<String> {
        if self.config.identifier.is_empty() {
            return Err(AdapterError::InvalidRequest(
                "adapter has no identifier field configured".into(),
            ));
        }
        Ok(self.config.identifier.clone())
    }

    fn transcoder_for(&self, prefix: Option<&PrefixConfig>) -> Transcoder {
        Transcoder::new(prefix.cloned().unwrap_or_else(|| self.config.prefix.clone()))
    }

    fn map_with_schema(
        &self,
        record: &Record,
        schema: Option<&SchemaSource>,
    ) -> AdapterResult<Record> {
        match schema.or(self.config.schema.as_ref()) {
            Some(source) => Ok(self.mapper.map(record, source)?),
            None => Ok(record.clone()),
        }
    }

    fn query_request(locator: Locator) -> QueryRequest {
        QueryRequest {
            filter: locator.filter,
            index: locator.index,
            limit: locator.limit,
            start_cursor: locator.start_cursor,
        }
    }

    /// Resolves the update locator to the current stored record.
    fn fetch_original(
        &self,
        request: &UpdateRequest,
        transcoder: &Transcoder,
    ) -> AdapterResult<Record> {
        let original = match request.locator.operation {
            ReadOperation::Get => {
                let locator = transcoder.apply_locator(&request.locator);
                let key = locator.key.ok_or_else(|| {
                    AdapterError::InvalidRequest("update locator requires a key".into())
                })?;
                self.store
                    .get_item(&key)?
                    .map(|record| transcoder.strip(&record))
                    .unwrap_or_default()
            }
            ReadOperation::Query | ReadOperation::Scan => {
                let locator = transcoder.apply_locator(&request.locator);
                let query = Self::query_request(locator);
                let page = match request.locator.operation {
                    ReadOperation::Scan => self.store.scan(&query)?,
                    _ => self.store.query(&query)?,
                };
                let cleaned = transcoder.strip_page(&page);
                cleaned.items.into_iter().next().unwrap_or_default()
            }
        };
        if original.is_empty() {
            return Err(AdapterError::NotFound(
                "locator resolved no record".into(),
            ));
        }
        Ok(original)
    }

    /// Evaluates the idempotence contract against the original and the
    /// merged/validated candidate.
    fn guard_check(&self, original: &Record, candidate: &Record) -> AdapterResult<GuardOutcome> {
        let contract = &self.config.idempotence;
        let Some(field) = contract.key.as_deref() else {
            return Ok(GuardOutcome::Write(None));
        };
        let original_value = original.get(field).filter(|value| !value.is_null());
        let candidate_value = candidate.get(field).filter(|value| !value.is_null());

        if contract.use_latest {
            if let (Some(original_value), Some(candidate_value)) =
                (original_value, candidate_value)
            {
                let stored = parse_timestamp(original_value).ok_or_else(|| {
                    AdapterError::InvalidIdempotenceValue {
                        field: field.to_string(),
                        value: original_value.to_string(),
                    }
                })?;
                let incoming = parse_timestamp(candidate_value).ok_or_else(|| {
                    AdapterError::InvalidIdempotenceValue {
                        field: field.to_string(),
                        value: candidate_value.to_string(),
                    }
                })?;
                if stored > incoming {
                    return Ok(GuardOutcome::ReturnOriginal);
                }
            }
        }

        match original_value {
            None => {
                if contract.raise_on_mismatch {
                    Err(AdapterError::MissingIdempotenceValue {
                        field: field.to_string(),
                    })
                } else {
                    Ok(GuardOutcome::Write(None))
                }
            }
            Some(original_value) => {
                if contract.raise_on_mismatch && Some(original_value) != candidate_value {
                    return Err(AdapterError::IdempotenceConflict {
                        field: field.to_string(),
                        expected: original_value.to_string(),
                        actual: candidate_value
                            .map(|value| value.to_string())
                            .unwrap_or_else(|| "null".into()),
                    });
                }
                Ok(GuardOutcome::Write(Some(WriteCondition::FieldEquals {
                    field: field.to_string(),
                    value: original_value.clone(),
                })))
            }
        }
    }

    /// Emits a change event. Failures are logged and isolated — the write
    /// already committed and is never rolled back.
    fn publish_event(&self, operation: ChangeOperation, record: &Record, hints: &PublishHints) {
        let publish = &self.config.publish;
        let Some(destination) = publish.destination.as_ref() else {
            return;
        };
        if record.is_empty() {
            return;
        }
        let attributes = format_attributes(&self.attribute_values(operation));
        let event = ChangeEvent::new(operation, record.clone(), attributes);
        let options = PublishOptions {
            destination: Some(destination.clone()),
            endpoint: publish.endpoint.clone(),
            fifo_group_id: hints.fifo_group_id.clone(),
            fifo_duplication_id: hints.fifo_duplication_id.clone(),
        };
        if let Err(err) = self.sink.publish(&event, &options) {
            warn!(
                error = %err,
                operation = operation.as_str(),
                table = %self.config.table,
                "change notification failed"
            );
        }
    }

    fn attribute_values(&self, operation: ChangeOperation) -> BTreeMap<String, Value> {
        let publish = &self.config.publish;
        let mut defaults = BTreeMap::new();
        defaults.insert(
            "operation".to_string(),
            Value::String(operation.as_str().to_string()),
        );
        if !self.config.identifier.is_empty() {
            defaults.insert(
                "identifier".to_string(),
                Value::String(self.config.identifier.clone()),
            );
        }
        if let Some(name) = self.config.schema.as_ref().and_then(SchemaSource::name) {
            defaults.insert("schema".to_string(), Value::String(name.to_string()));
        }
        if let Some(key) = self.config.idempotence.key.as_ref() {
            defaults.insert("idempotence_key".to_string(), Value::String(key.clone()));
        }
        if let Some(author) = publish.author_identifier.as_ref() {
            defaults.insert(
                "author_identifier".to_string(),
                Value::String(author.clone()),
            );
        }

        match (publish.default_attributes, publish.custom_attributes.is_empty()) {
            (true, false) => {
                defaults.extend(
                    publish
                        .custom_attributes
                        .iter()
                        .map(|(name, value)| (name.clone(), value.clone())),
                );
                defaults
            }
            (false, false) => publish.custom_attributes.clone(),
            (true, true) => defaults,
            (false, true) => BTreeMap::new(),
        }
    }

    fn batch_records(data: &Value) -> AdapterResult<Vec<Record>> {
        let Value::Array(items) = data else {
            return Err(AdapterError::BatchItem(
                "batched data must be contained within a list".into(),
            ));
        };
        items
            .iter()
            .map(|item| {
                item.as_object().cloned().ok_or_else(|| {
                    AdapterError::BatchItem("batch items must be records".into())
                })
            })
            .collect()
    }
}

/// Parses a guard value as an ISO-8601 timestamp: RFC 3339, naive
/// datetime, or bare date.
fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    let text = value.as_str()?;
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.naive_utc());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(datetime);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}
