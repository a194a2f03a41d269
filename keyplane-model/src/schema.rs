use keyplane_types::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while loading or applying a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The record failed validation against the schema.
    #[error("schema violation in '{schema}': {detail}")]
    Violation { schema: String, detail: String },

    /// The named schema does not exist in the catalog.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// Catalog file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Bool,
    Array,
    Object,
    /// No type constraint.
    Any,
}

impl FieldType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
            FieldType::Any => true,
        }
    }
}

/// Declares the fields a record may carry and which are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Declared fields and their types. Undeclared fields are dropped
    /// during mapping.
    pub fields: BTreeMap<String, FieldType>,
    /// Fields that must be present and non-null.
    #[serde(default)]
    pub required: Vec<String>,
}

/// Where a schema definition comes from.
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// A named schema inside a JSON catalog file.
    File { path: PathBuf, name: String },
    /// An in-code schema definition.
    Inline(RecordSchema),
}

impl SchemaSource {
    pub fn file(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        SchemaSource::File {
            path: path.into(),
            name: name.into(),
        }
    }

    /// The catalog schema name, when this source refers to one.
    pub fn name(&self) -> Option<&str> {
        match self {
            SchemaSource::File { name, .. } => Some(name),
            SchemaSource::Inline(_) => None,
        }
    }

    fn label(&self) -> String {
        self.name().unwrap_or("<inline>").to_string()
    }
}

/// Validates and coerces a raw record against a schema definition.
///
/// Treated as a pure `record → record` function by the adapter; the
/// mapping engine behind it is replaceable.
pub trait SchemaMapper: Send + Sync {
    fn map(&self, record: &Record, source: &SchemaSource) -> SchemaResult<Record>;
}

/// On-disk shape of a schema catalog file:
/// `{"schemas": {"name": {"fields": {...}, "required": [...]}}}`.
#[derive(Debug, Clone, Deserialize)]
struct Catalog {
    schemas: HashMap<String, RecordSchema>,
}

/// Built-in mapper: projects records onto their declared fields.
///
/// Undeclared fields are dropped, declared types are enforced, and
/// required fields must be present and non-null. Parsed catalog files are
/// cached per path for the lifetime of the mapper.
#[derive(Debug, Default)]
pub struct ProjectionMapper {
    catalogs: Mutex<HashMap<PathBuf, Arc<Catalog>>>,
}

impl ProjectionMapper {
    pub fn new() -> Self {
        Self::default()
    }

    fn load_catalog(&self, path: &Path) -> SchemaResult<Arc<Catalog>> {
        // Cached entries are immutable once inserted, so a poisoned lock
        // is recovered rather than propagated.
        let mut catalogs = self
            .catalogs
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(catalog) = catalogs.get(path) {
            return Ok(catalog.clone());
        }
        let raw = std::fs::read_to_string(path)?;
        let catalog: Arc<Catalog> = Arc::new(serde_json::from_str(&raw)?);
        catalogs.insert(path.to_path_buf(), catalog.clone());
        Ok(catalog)
    }

    fn resolve(&self, source: &SchemaSource) -> SchemaResult<RecordSchema> {
        match source {
            SchemaSource::Inline(schema) => Ok(schema.clone()),
            SchemaSource::File { path, name } => {
                let catalog = self.load_catalog(path)?;
                catalog
                    .schemas
                    .get(name)
                    .cloned()
                    .ok_or_else(|| SchemaError::UnknownSchema(name.clone()))
            }
        }
    }

    fn project(schema: &RecordSchema, record: &Record, label: &str) -> SchemaResult<Record> {
        let mut mapped = Record::new();
        for (field, value) in record {
            let Some(field_type) = schema.fields.get(field) else {
                continue; // undeclared fields are dropped
            };
            if !value.is_null() && !field_type.matches(value) {
                return Err(SchemaError::Violation {
                    schema: label.to_string(),
                    detail: format!("field '{field}' is not of type {field_type:?}"),
                });
            }
            mapped.insert(field.clone(), value.clone());
        }
        for required in &schema.required {
            match mapped.get(required) {
                Some(value) if !value.is_null() => {}
                _ => {
                    return Err(SchemaError::Violation {
                        schema: label.to_string(),
                        detail: format!("required field '{required}' is missing or null"),
                    });
                }
            }
        }
        Ok(mapped)
    }
}

impl SchemaMapper for ProjectionMapper {
    fn map(&self, record: &Record, source: &SchemaSource) -> SchemaResult<Record> {
        let schema = self.resolve(source)?;
        Self::project(&schema, record, &source.label())
    }
}
