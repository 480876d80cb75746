//! RecordSource trait definition.

use crate::filter::RecordFilter;
use anon_core::{EntityDescriptor, Record};
use anyhow::Result;

/// One page of an ordered scan over an entity's table.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    /// Entity being read
    pub entity: &'a EntityDescriptor,
    /// Sort columns, ascending
    pub order_by: &'a [String],
    /// Rows to skip
    pub offset: usize,
    /// Maximum rows to return
    pub limit: usize,
    /// Optional row filter
    pub filter: Option<&'a RecordFilter>,
}

impl<'a> PageRequest<'a> {
    /// Page ordered by the entity's primary key.
    pub fn new(entity: &'a EntityDescriptor, offset: usize, limit: usize) -> Self {
        Self {
            entity,
            order_by: &entity.primary_key,
            offset,
            limit,
            filter: None,
        }
    }

    /// Builder: restrict the page to matching rows.
    pub fn with_filter(mut self, filter: Option<&'a RecordFilter>) -> Self {
        self.filter = filter;
        self
    }
}

/// Trait for reading records page by page.
///
/// Pages of the same scan must be consistent: for a fixed dataset, fetching
/// offsets `0, n, 2n, ..` until an empty page yields every matching row
/// exactly once.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page. An empty result means the scan is complete.
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Vec<Record>>;
}
