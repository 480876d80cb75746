//! Dump sinks for anon-export.
//!
//! This crate defines the `DumpSink` trait the export driver writes through,
//! and two implementations:
//!
//! - [`SqlDumpSink`] - parameterised `DELETE` / `INSERT` statements, each
//!   followed by a line holding its JSON parameter array
//! - [`JsonDumpSink`] - a single JSON document mapping table names to rows
//!
//! Sinks are written to strictly in dependency order; clearing happens in
//! reverse dependency order via [`DumpSink::clear`].

mod json;
mod sql;
mod traits;

pub use json::JsonDumpSink;
pub use sql::{quote_identifier, render_delete, render_insert, SqlDumpSink};
pub use traits::DumpSink;
