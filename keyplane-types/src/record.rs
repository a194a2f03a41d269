use serde_json::{Map, Value};

/// A stored item: an ordered mapping from field name to JSON value.
///
/// No schema is enforced at this level — validation happens at write time
/// through the schema mapper.
pub type Record = Map<String, Value>;

/// Converts a JSON value into a [`Record`], returning `None` for anything
/// that is not an object.
pub fn record_from_value(value: Value) -> Option<Record> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
