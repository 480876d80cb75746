//! Run-scoped value substitution cache.
//!
//! Every generator-mapped field goes through this cache, keyed by the
//! canonical serialisation of its *original* value. Two entities holding the
//! same original value therefore receive the same substitute, which is what
//! keeps foreign keys pointing at the right (anonymised) rows.

use serde_json::Value;
use std::collections::HashMap;

/// Maximum nesting depth accepted by [`canonical_key`].
pub const MAX_KEY_DEPTH: usize = 128;

/// Error type for cache key serialisation.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Value nests deeper than [`MAX_KEY_DEPTH`]
    #[error("value nests deeper than {MAX_KEY_DEPTH} levels and cannot be used as a cache key")]
    TooDeep,
}

/// Serialise a value into its canonical cache key.
///
/// Object keys are emitted in sorted order, so two logically equal values
/// always produce the same key regardless of how they were constructed.
/// Scalars use their JSON encoding, so `42` and `"42"` stay distinct.
pub fn canonical_key(value: &Value) -> Result<String, KeyError> {
    let mut out = String::new();
    write_canonical(value, &mut out, 0)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String, depth: usize) -> Result<(), KeyError> {
    if depth > MAX_KEY_DEPTH {
        return Err(KeyError::TooDeep);
    }

    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out, depth + 1)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out, depth + 1)?;
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }

    Ok(())
}

/// Memo from canonical original values to their chosen substitutes.
///
/// Created at the start of an export run and dropped at its end; nothing is
/// persisted. The first substitute stored for a key wins.
#[derive(Debug, Default)]
pub struct ValueCache {
    entries: HashMap<String, Value>,
}

impl ValueCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the substitute chosen for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Store a substitute and return the value now associated with the key.
    ///
    /// If the key already has a substitute it is kept and returned unchanged.
    pub fn set(&mut self, key: String, value: Value) -> &Value {
        self.entries.entry(key).or_insert(value)
    }

    /// Number of memoised values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been memoised yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
