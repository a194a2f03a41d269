//! Key-prefix transcoding.
//!
//! Reversible add/remove of a fixed string prefix on the designated
//! partition-key and sort-key fields, used for multi-tenant or
//! type-namespaced key layouts. Both directions are idempotent so the
//! transform is safe to apply to data that may or may not already carry
//! the prefix.

use keyplane_types::{Locator, Page, PrefixConfig, Record, StoreResponse};
use serde_json::Value;

/// Applies and strips key prefixes on records, pages, responses, and
/// locators. Never mutates its input; always returns a copy.
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    config: PrefixConfig,
}

impl Transcoder {
    pub fn new(config: PrefixConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PrefixConfig {
        &self.config
    }

    /// Adds configured prefixes to a record's key fields.
    pub fn apply(&self, record: &Record) -> Record {
        self.rewrite(record, true)
    }

    /// Strips configured prefixes from a record's key fields.
    pub fn strip(&self, record: &Record) -> Record {
        self.rewrite(record, false)
    }

    /// Element-wise [`Transcoder::apply`].
    pub fn apply_all(&self, records: &[Record]) -> Vec<Record> {
        records.iter().map(|record| self.apply(record)).collect()
    }

    /// Element-wise [`Transcoder::strip`].
    pub fn strip_all(&self, records: &[Record]) -> Vec<Record> {
        records.iter().map(|record| self.strip(record)).collect()
    }

    /// Adds prefixes to the items and pagination cursor of a page.
    pub fn apply_page(&self, page: &Page) -> Page {
        Page {
            items: self.apply_all(&page.items),
            cursor: page.cursor.as_ref().map(|cursor| self.apply(cursor)),
        }
    }

    /// Strips items and the pagination cursor of a page.
    pub fn strip_page(&self, page: &Page) -> Page {
        Page {
            items: self.strip_all(&page.items),
            cursor: page.cursor.as_ref().map(|cursor| self.strip(cursor)),
        }
    }

    /// Strips every record embedded in a response, whatever the variant.
    pub fn strip_response(&self, response: StoreResponse) -> StoreResponse {
        match response {
            StoreResponse::Single(record) => StoreResponse::Single(self.strip(&record)),
            StoreResponse::Collection(items) => StoreResponse::Collection(self.strip_all(&items)),
            StoreResponse::Raw(page) => StoreResponse::Raw(self.strip_page(&page)),
        }
    }

    /// Adds prefixes to the key fields a locator embeds: the direct key
    /// and the pagination cursor. The filter descriptor is opaque and
    /// passes through untouched.
    pub fn apply_locator(&self, locator: &Locator) -> Locator {
        let mut prefixed = locator.clone();
        prefixed.key = locator.key.as_ref().map(|key| self.apply(key));
        prefixed.start_cursor = locator.start_cursor.as_ref().map(|cursor| self.apply(cursor));
        prefixed
    }

    fn rewrite(&self, record: &Record, add: bool) -> Record {
        let mut out = record.clone();
        if let Some((field, prefix)) = self.config.hash_pair() {
            Self::rewrite_field(&mut out, field, prefix, add);
        }
        if let Some((field, prefix)) = self.config.range_pair() {
            Self::rewrite_field(&mut out, field, prefix, add);
        }
        out
    }

    fn rewrite_field(record: &mut Record, field: &str, prefix: &str, add: bool) {
        let Some(Value::String(value)) = record.get(field) else {
            return; // missing or non-string values are untouched
        };
        let rewritten = if add {
            if value.starts_with(prefix) {
                return; // already prefixed, adding again is a no-op
            }
            format!("{prefix}{value}")
        } else {
            match value.strip_prefix(prefix) {
                Some(stripped) => stripped.to_string(),
                None => return, // already clean, stripping is a no-op
            }
        };
        record.insert(field.to_string(), Value::String(rewritten));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn half_configured_pair_is_inert() {
        let transcoder = Transcoder::new(PrefixConfig {
            hash_key: Some("pk".into()),
            ..PrefixConfig::default()
        });
        let item = record(json!({"pk": "123"}));
        assert_eq!(transcoder.apply(&item), item);
    }

    #[test]
    fn non_string_values_pass_through() {
        let transcoder = Transcoder::new(PrefixConfig::hash("pk", "tenant#"));
        let item = record(json!({"pk": 42}));
        assert_eq!(transcoder.apply(&item), item);
        assert_eq!(transcoder.strip(&item), item);
    }

    #[test]
    fn input_is_never_mutated() {
        let transcoder = Transcoder::new(PrefixConfig::hash("pk", "tenant#"));
        let item = record(json!({"pk": "123"}));
        let prefixed = transcoder.apply(&item);
        assert_eq!(item["pk"], "123");
        assert_eq!(prefixed["pk"], "tenant#123");
    }
}
