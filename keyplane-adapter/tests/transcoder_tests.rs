mod common;

use common::record;
use keyplane_adapter::Transcoder;
use keyplane_types::{Locator, Page, PrefixConfig, StoreResponse};
use pretty_assertions::assert_eq;
use serde_json::json;

fn hash_only() -> Transcoder {
    Transcoder::new(PrefixConfig::hash("pk", "tenant#"))
}

fn hash_and_range() -> Transcoder {
    Transcoder::new(PrefixConfig::hash("pk", "tenant#").with_range("sk", "order#"))
}

// ── Records ──────────────────────────────────────────────────────

#[test]
fn applies_both_configured_prefixes() {
    let item = record(json!({"pk": "123", "sk": "456", "other": "789"}));
    let prefixed = hash_and_range().apply(&item);

    assert_eq!(
        prefixed,
        record(json!({"pk": "tenant#123", "sk": "order#456", "other": "789"}))
    );
}

#[test]
fn strips_both_configured_prefixes() {
    let item = record(json!({"pk": "tenant#123", "sk": "order#456"}));
    let cleaned = hash_and_range().strip(&item);

    assert_eq!(cleaned, record(json!({"pk": "123", "sk": "456"})));
}

#[test]
fn apply_is_idempotent() {
    let transcoder = hash_only();
    let item = record(json!({"pk": "tenant#123"}));

    assert_eq!(transcoder.apply(&item), item);
}

#[test]
fn strip_is_idempotent() {
    let transcoder = hash_only();
    let item = record(json!({"pk": "123"}));

    assert_eq!(transcoder.strip(&item), item);
}

#[test]
fn missing_key_field_passes_through() {
    let item = record(json!({"unrelated": "value"}));
    assert_eq!(hash_and_range().apply(&item), item);
    assert_eq!(hash_and_range().strip(&item), item);
}

#[test]
fn empty_config_transcodes_nothing() {
    let transcoder = Transcoder::default();
    let item = record(json!({"pk": "123", "sk": "456"}));
    assert_eq!(transcoder.apply(&item), item);
}

// ── Collections ──────────────────────────────────────────────────

#[test]
fn apply_all_preserves_order() {
    let items = vec![
        record(json!({"pk": "1"})),
        record(json!({"pk": "2"})),
        record(json!({"pk": "3"})),
    ];
    let prefixed = hash_only().apply_all(&items);

    let values: Vec<&str> = prefixed
        .iter()
        .map(|item| item["pk"].as_str().unwrap())
        .collect();
    assert_eq!(values, vec!["tenant#1", "tenant#2", "tenant#3"]);
}

#[test]
fn apply_page_covers_items_and_cursor() {
    let page = Page::new(vec![record(json!({"pk": "1"}))])
        .with_cursor(record(json!({"pk": "1"})));
    let prefixed = hash_only().apply_page(&page);

    assert_eq!(prefixed.items[0]["pk"], "tenant#1");
    assert_eq!(prefixed.cursor.unwrap()["pk"], "tenant#1");
}

#[test]
fn strip_page_covers_items_and_cursor() {
    let page = Page::new(vec![record(json!({"pk": "tenant#1"}))])
        .with_cursor(record(json!({"pk": "tenant#1"})));
    let cleaned = hash_only().strip_page(&page);

    assert_eq!(cleaned.items[0]["pk"], "1");
    assert_eq!(cleaned.cursor.unwrap()["pk"], "1");
}

#[test]
fn strip_response_handles_every_variant() {
    let transcoder = hash_only();

    let single = StoreResponse::Single(record(json!({"pk": "tenant#1"})));
    let StoreResponse::Single(item) = transcoder.strip_response(single) else {
        panic!("variant changed");
    };
    assert_eq!(item["pk"], "1");

    let collection = StoreResponse::Collection(vec![record(json!({"pk": "tenant#1"}))]);
    let StoreResponse::Collection(items) = transcoder.strip_response(collection) else {
        panic!("variant changed");
    };
    assert_eq!(items[0]["pk"], "1");

    let raw = StoreResponse::Raw(Page::new(vec![record(json!({"pk": "tenant#1"}))]));
    let StoreResponse::Raw(page) = transcoder.strip_response(raw) else {
        panic!("variant changed");
    };
    assert_eq!(page.items[0]["pk"], "1");
}

// ── Locators ─────────────────────────────────────────────────────

#[test]
fn apply_locator_rewrites_key_and_cursor_only() {
    let locator = Locator {
        key: Some(record(json!({"pk": "1"}))),
        filter: Some(json!({"pk": "1"})),
        start_cursor: Some(record(json!({"pk": "2"}))),
        ..Locator::default()
    };
    let prefixed = hash_only().apply_locator(&locator);

    assert_eq!(prefixed.key.unwrap()["pk"], "tenant#1");
    assert_eq!(prefixed.start_cursor.unwrap()["pk"], "tenant#2");
    assert_eq!(prefixed.filter, Some(json!({"pk": "1"})));
}
