//! JSON dump writer.
//!
//! The whole dump is held in memory and written as one document on
//! [`DumpSink::finish`]:
//!
//! ```text
//! { "contact": [ {..}, {..} ], "payment": [ .. ] }
//! ```
//!
//! Tables appear in the order they were first cleared or written.

use crate::traits::DumpSink;
use anon_core::{EntityDescriptor, Record};
use anyhow::{bail, Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Tables and rows in first-seen order.
struct DumpDocument<'a>(&'a [(String, Vec<Record>)]);

impl Serialize for DumpDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (table, rows) in self.0 {
            map.serialize_entry(table, rows)?;
        }
        map.end()
    }
}

/// Collects rows per table and writes them as a single JSON document.
pub struct JsonDumpSink<W> {
    writer: W,
    tables: Vec<(String, Vec<Record>)>,
    index: HashMap<String, usize>,
    finished: bool,
}

impl<W: AsyncWrite + Unpin + Send> JsonDumpSink<W> {
    /// Create a new JSON sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            tables: Vec::new(),
            index: HashMap::new(),
            finished: false,
        }
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn table_mut(&mut self, table: &str) -> &mut Vec<Record> {
        let position = match self.index.get(table) {
            Some(&position) => position,
            None => {
                self.tables.push((table.to_string(), Vec::new()));
                self.index.insert(table.to_string(), self.tables.len() - 1);
                self.tables.len() - 1
            }
        };
        &mut self.tables[position].1
    }
}

#[async_trait::async_trait]
impl<W: AsyncWrite + Unpin + Send> DumpSink for JsonDumpSink<W> {
    async fn clear_table(&mut self, entity: &EntityDescriptor) -> Result<()> {
        self.table_mut(&entity.table).clear();
        Ok(())
    }

    async fn write_records(&mut self, entity: &EntityDescriptor, records: &[Record]) -> Result<()> {
        if self.finished {
            bail!("JSON dump already written; cannot add rows to {}", entity.table);
        }
        self.table_mut(&entity.table).extend_from_slice(records);
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        if self.finished {
            bail!("JSON dump already written");
        }

        let bytes = serde_json::to_vec_pretty(&DumpDocument(&self.tables))
            .context("Failed to encode JSON dump")?;
        self.writer
            .write_all(&bytes)
            .await
            .context("Failed to write JSON dump")?;
        self.writer
            .write_all(b"\n")
            .await
            .context("Failed to write JSON dump")?;
        self.writer
            .flush()
            .await
            .context("Failed to flush JSON dump")?;
        self.finished = true;

        debug!("JSON dump finished with {} tables", self.tables.len());
        Ok(())
    }
}
