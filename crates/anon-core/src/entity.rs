//! Entity descriptors.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifies one entity type (one table) of the source dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Entity type name (e.g. `Contact`)
    pub name: String,

    /// Table name used in dumps (e.g. `contact`)
    pub table: String,

    /// Primary-key column(s), in key order
    pub primary_key: Vec<String>,

    /// Names of the entities this one holds foreign keys into
    #[serde(default)]
    pub references: Vec<String>,
}

impl EntityDescriptor {
    /// Create a new entity descriptor.
    pub fn new<I, S>(name: impl Into<String>, table: impl Into<String>, primary_key: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            table: table.into(),
            primary_key: primary_key.into_iter().map(Into::into).collect(),
            references: Vec::new(),
        }
    }

    /// Builder: declare the entities this one references.
    pub fn references<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.references = references.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `field` is one of the primary-key columns.
    pub fn is_primary_key(&self, field: &str) -> bool {
        self.primary_key.iter().any(|pk| pk == field)
    }

    /// The single primary-key column, if the key is not composite.
    pub fn single_key(&self) -> Option<&str> {
        match self.primary_key.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    /// Extract a record's primary-key value.
    ///
    /// Single keys yield the column value; composite keys yield an array of
    /// the column values in key order. Returns `None` if any column is missing.
    pub fn key_of(&self, record: &Record) -> Option<Value> {
        if let Some(column) = self.single_key() {
            return record.get(column).cloned();
        }

        self.primary_key
            .iter()
            .map(|column| record.get(column).cloned())
            .collect::<Option<Vec<_>>>()
            .map(Value::Array)
    }
}
