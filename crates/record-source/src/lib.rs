//! Paged record sources for anon-export.
//!
//! The export driver reads every entity through [`RecordSource::fetch_page`],
//! one ordered page at a time. Implementations:
//!
//! - [`PostgresSource`] - the live CRM database
//! - [`MemorySource`] - in-memory tables, also loaded from a JSON dump

mod filter;
mod memory;
mod postgres;
mod traits;

pub use filter::RecordFilter;
pub use memory::MemorySource;
pub use postgres::{build_page_query, PostgresSource};
pub use traits::{PageRequest, RecordSource};
