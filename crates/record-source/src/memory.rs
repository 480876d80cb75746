//! In-memory record source.

use crate::traits::{PageRequest, RecordSource};
use anon_core::Record;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Tables of records held in memory, keyed by table name.
///
/// Pages are served in ascending order of the requested columns; rows that
/// tie keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<Record>>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add rows to a table.
    pub fn with_table(mut self, table: impl Into<String>, records: Vec<Record>) -> Self {
        self.insert(table, records);
        self
    }

    /// Append rows to a table.
    pub fn insert(&mut self, table: impl Into<String>, records: Vec<Record>) {
        self.tables.entry(table.into()).or_default().extend(records);
    }

    /// Number of rows held for a table.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, Vec::len)
    }

    /// Build a source from a JSON dump document.
    ///
    /// ```text
    /// { "<table>": [ { ..row.. }, ... ], ... }
    /// ```
    pub fn from_json_value(document: Value) -> Result<Self> {
        let Value::Object(tables) = document else {
            bail!("JSON dump must be an object mapping table names to row arrays");
        };

        let mut source = Self::new();
        for (table, rows) in tables {
            let Value::Array(rows) = rows else {
                bail!("JSON dump table '{table}' is not an array");
            };
            let records = rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| match row {
                    Value::Object(record) => Ok(record),
                    _ => bail!("JSON dump table '{table}' row {i} is not an object"),
                })
                .collect::<Result<Vec<_>>>()?;
            source.insert(table, records);
        }
        Ok(source)
    }

    /// Load a JSON dump document from disk.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read JSON dump {}", path.display()))?;
        let document: Value = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse JSON dump {}", path.display()))?;
        let source = Self::from_json_value(document)?;

        info!(
            "Loaded {} tables from {}",
            source.tables.len(),
            path.display()
        );
        Ok(source)
    }
}

/// Total order over JSON values for sorting key columns.
///
/// null < bool < number < string < array < object; numbers compare
/// numerically, everything else by its natural or serialised form.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(0.0)
                .total_cmp(&y.as_f64().unwrap_or(0.0)),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            a.to_string().cmp(&b.to_string())
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait::async_trait]
impl RecordSource for MemorySource {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Vec<Record>> {
        let Some(rows) = self.tables.get(&request.entity.table) else {
            debug!("No rows held for table {}", request.entity.table);
            return Ok(Vec::new());
        };

        let mut matching: Vec<&Record> = rows
            .iter()
            .filter(|row| request.filter.map_or(true, |filter| filter.matches(row)))
            .collect();

        matching.sort_by(|a, b| {
            request
                .order_by
                .iter()
                .map(|column| {
                    compare_values(
                        a.get(column).unwrap_or(&Value::Null),
                        b.get(column).unwrap_or(&Value::Null),
                    )
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        Ok(matching
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordFilter;
    use anon_core::EntityDescriptor;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    fn contact() -> EntityDescriptor {
        EntityDescriptor::new("Contact", "contact", ["id"])
    }

    #[tokio::test]
    async fn test_pages_are_ordered_by_key() {
        let entity = contact();
        let source = MemorySource::new().with_table(
            "contact",
            vec![
                record(json!({"id": 3})),
                record(json!({"id": 1})),
                record(json!({"id": 10})),
                record(json!({"id": 2})),
            ],
        );

        let first = source
            .fetch_page(&PageRequest::new(&entity, 0, 3))
            .await
            .unwrap();
        let second = source
            .fetch_page(&PageRequest::new(&entity, 3, 3))
            .await
            .unwrap();
        let third = source
            .fetch_page(&PageRequest::new(&entity, 6, 3))
            .await
            .unwrap();

        let ids: Vec<_> = first.iter().chain(&second).map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2), json!(3), json!(10)]);
        assert!(third.is_empty());
    }

    #[tokio::test]
    async fn test_filter_applies_before_paging() {
        let entity = EntityDescriptor::new("CalloutResponse", "callout_response", ["id"]);
        let source = MemorySource::new().with_table(
            "callout_response",
            (0..10)
                .map(|i| {
                    let callout = if i % 2 == 0 { "a" } else { "b" };
                    record(json!({"id": i, "calloutId": callout}))
                })
                .collect(),
        );
        let filter = RecordFilter::equals("calloutId", json!("b"));

        let page = source
            .fetch_page(&PageRequest::new(&entity, 1, 2).with_filter(Some(&filter)))
            .await
            .unwrap();

        let ids: Vec<_> = page.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(3), json!(5)]);
    }

    #[tokio::test]
    async fn test_unknown_table_is_empty() {
        let entity = contact();
        let page = MemorySource::new()
            .fetch_page(&PageRequest::new(&entity, 0, 10))
            .await
            .unwrap();

        assert!(page.is_empty());
    }

    #[test]
    fn test_from_json_value_rejects_bad_shapes() {
        assert!(MemorySource::from_json_value(json!([])).is_err());
        assert!(MemorySource::from_json_value(json!({"contact": {}})).is_err());
        assert!(MemorySource::from_json_value(json!({"contact": [1]})).is_err());

        let source = MemorySource::from_json_value(json!({"contact": [{"id": 1}]})).unwrap();
        assert_eq!(source.row_count("contact"), 1);
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!(1.5), &json!(1)), Ordering::Greater);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_values(&Value::Null, &json!("a")), Ordering::Less);
        assert_eq!(compare_values(&json!([1, 2]), &json!([1, 2])), Ordering::Equal);
    }
}
