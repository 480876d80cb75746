//! Row filters understood by every source.

use anon_core::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A predicate over top-level record fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFilter {
    /// `field == value`
    Equals { field: String, value: Value },
    /// `field` is one of `values`
    In { field: String, values: Vec<Value> },
    /// Every inner filter holds
    All(Vec<RecordFilter>),
}

impl RecordFilter {
    /// `field == value`.
    pub fn equals(field: impl Into<String>, value: Value) -> Self {
        RecordFilter::Equals {
            field: field.into(),
            value,
        }
    }

    /// `field` is one of `values`.
    pub fn one_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        RecordFilter::In {
            field: field.into(),
            values,
        }
    }

    /// Conjunction of two filters, flattening nested `All`s.
    pub fn and(self, other: RecordFilter) -> Self {
        let mut filters = match self {
            RecordFilter::All(filters) => filters,
            filter => vec![filter],
        };
        match other {
            RecordFilter::All(more) => filters.extend(more),
            filter => filters.push(filter),
        }
        RecordFilter::All(filters)
    }

    /// Combine an optional base filter with another.
    pub fn and_optional(base: Option<&RecordFilter>, other: RecordFilter) -> Self {
        match base {
            Some(base) => base.clone().and(other),
            None => other,
        }
    }

    /// Whether `record` satisfies the filter. Missing fields compare as null.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            RecordFilter::Equals { field, value } => {
                record.get(field).unwrap_or(&Value::Null) == value
            }
            RecordFilter::In { field, values } => {
                let actual = record.get(field).unwrap_or(&Value::Null);
                values.contains(actual)
            }
            RecordFilter::All(filters) => filters.iter().all(|filter| filter.matches(record)),
        }
    }
}
