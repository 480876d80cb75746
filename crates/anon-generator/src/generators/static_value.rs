//! Generators that always produce the same value.

use anon_core::Generator;
use serde_json::Value;

/// Always `value`, whatever the original was.
pub fn constant(value: Value) -> Generator {
    Generator::fresh("constant", move |_| value.clone())
}

/// Always `null`.
pub fn null() -> Generator {
    Generator::fresh("null", |_| Value::Null)
}
