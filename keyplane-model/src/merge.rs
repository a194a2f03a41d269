use keyplane_types::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-field override for how a partial update combines with the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeHint {
    /// The partial value replaces the original (default).
    #[default]
    Replace,
    /// Array values are appended to the original array instead of
    /// replacing it.
    Append,
}

/// Caller-supplied per-field merge overrides.
pub type MergeHints = BTreeMap<String, MergeHint>;

/// Combines an existing record with a partial update.
///
/// Contract: fields absent from the partial are preserved from the
/// original; fields present in the partial replace the original's value
/// unless a hint says otherwise.
pub trait RecordMerge: Send + Sync {
    fn merge(&self, original: &Record, partial: &Record, hints: &MergeHints) -> Record;
}

/// Built-in merge strategy: replace unless an [`MergeHint::Append`] hint
/// applies to an array field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceMerge;

impl RecordMerge for ReplaceMerge {
    fn merge(&self, original: &Record, partial: &Record, hints: &MergeHints) -> Record {
        let mut merged = original.clone();
        for (field, value) in partial {
            let append = hints.get(field) == Some(&MergeHint::Append);
            if append {
                if let (Some(Value::Array(existing)), Value::Array(incoming)) =
                    (merged.get(field), value)
                {
                    let mut combined = existing.clone();
                    combined.extend(incoming.iter().cloned());
                    merged.insert(field.clone(), Value::Array(combined));
                    continue;
                }
            }
            merged.insert(field.clone(), value.clone());
        }
        merged
    }
}
