//! Record representation.

use serde_json::Value;

/// One row of one entity.
///
/// Records are opaque JSON objects keyed by column name. Nested objects
/// (JSON/JSONB columns) are ordinary `Value::Object`s.
pub type Record = serde_json::Map<String, Value>;

/// Whether a field value counts as "nothing to anonymise".
///
/// Null and the empty string are empty. `false` and `0` are real values.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Short type name of a JSON value, for error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
