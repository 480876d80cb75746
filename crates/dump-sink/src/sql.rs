//! SQL dump writer.
//!
//! Every statement takes two lines: the statement itself, with `$n`
//! placeholders, and a JSON array holding the parameters in placeholder
//! order.
//!
//! ```text
//! DELETE FROM "contact";
//! []
//! INSERT INTO "contact" ("email", "id") VALUES ($1, $2), ($3, DEFAULT);
//! ["a@example.com","c1","b@example.com"]
//! ```

use crate::traits::DumpSink;
use anon_core::{EntityDescriptor, Record};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render the statement removing every row of `table`.
pub fn render_delete(table: &str) -> String {
    format!("DELETE FROM {};", quote_identifier(table))
}

/// Render one multi-row insert and its parameters.
///
/// Columns are the union of the records' keys, in first-seen order. A record
/// without one of the columns gets `DEFAULT` there. Returns `None` for an
/// empty batch.
pub fn render_insert(table: &str, records: &[Record]) -> Option<(String, Vec<Value>)> {
    if records.is_empty() {
        return None;
    }

    let mut columns: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.as_str());
            }
        }
    }

    let table = quote_identifier(table);

    if columns.is_empty() {
        let statement = vec![format!("INSERT INTO {table} DEFAULT VALUES;"); records.len()];
        return Some((statement.join("\n[]\n"), Vec::new()));
    }

    let mut params = Vec::new();
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| match record.get(*column) {
                Some(value) => {
                    params.push(value.clone());
                    format!("${}", params.len())
                }
                None => "DEFAULT".to_string(),
            })
            .collect();
        rows.push(format!("({})", cells.join(", ")));
    }

    let column_list = columns
        .iter()
        .map(|column| quote_identifier(column))
        .collect::<Vec<_>>()
        .join(", ");

    Some((
        format!(
            "INSERT INTO {table} ({column_list}) VALUES {};",
            rows.join(", ")
        ),
        params,
    ))
}

/// Writes a SQL dump to any async writer.
pub struct SqlDumpSink<W> {
    writer: W,
    statements: usize,
}

impl<W: AsyncWrite + Unpin + Send> SqlDumpSink<W> {
    /// Create a new SQL sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            statements: 0,
        }
    }

    /// Number of statements written so far.
    pub fn statements(&self) -> usize {
        self.statements
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    async fn write_statement(&mut self, statement: &str, params: &[Value]) -> Result<()> {
        let params = serde_json::to_string(params).context("Failed to encode SQL parameters")?;
        let text = format!("{statement}\n{params}\n");
        self.writer
            .write_all(text.as_bytes())
            .await
            .context("Failed to write SQL dump")?;
        self.statements += 1;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<W: AsyncWrite + Unpin + Send> DumpSink for SqlDumpSink<W> {
    async fn clear_table(&mut self, entity: &EntityDescriptor) -> Result<()> {
        debug!("Clearing table {}", entity.table);
        self.write_statement(&render_delete(&entity.table), &[]).await
    }

    async fn write_records(&mut self, entity: &EntityDescriptor, records: &[Record]) -> Result<()> {
        let Some((statement, params)) = render_insert(&entity.table, records) else {
            return Ok(());
        };
        debug!(
            "Writing {} rows ({} params) to {}",
            records.len(),
            params.len(),
            entity.table
        );
        self.write_statement(&statement, &params).await
    }

    async fn finish(&mut self) -> Result<()> {
        self.writer
            .flush()
            .await
            .context("Failed to flush SQL dump")?;
        debug!("SQL dump finished after {} statements", self.statements);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("contact"), "\"contact\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_render_delete() {
        assert_eq!(render_delete("payment"), "DELETE FROM \"payment\";");
    }

    #[test]
    fn test_render_insert_missing_columns_use_default() {
        let records = vec![
            record(json!({"id": "c1", "email": "a@example.com"})),
            record(json!({"id": "c2", "name": "Bo"})),
        ];

        let (statement, params) = render_insert("contact", &records).unwrap();

        assert_eq!(
            statement,
            "INSERT INTO \"contact\" (\"email\", \"id\", \"name\") VALUES ($1, $2, DEFAULT), (DEFAULT, $3, $4);"
        );
        assert_eq!(
            params,
            vec![json!("a@example.com"), json!("c1"), json!("c2"), json!("Bo")]
        );
    }

    #[test]
    fn test_render_insert_keeps_nested_values() {
        let records = vec![record(json!({"id": 1, "answers": {"s1": {"q": "x"}}}))];

        let (_, params) = render_insert("callout_response", &records).unwrap();

        assert_eq!(params, vec![json!({"s1": {"q": "x"}}), json!(1)]);
    }

    #[test]
    fn test_render_insert_empty_batch() {
        assert!(render_insert("contact", &[]).is_none());
    }

    #[test]
    fn test_render_insert_no_columns() {
        let records = vec![Record::new(), Record::new()];
        let (statement, params) = render_insert("t", &records).unwrap();

        assert_eq!(
            statement,
            "INSERT INTO \"t\" DEFAULT VALUES;\n[]\nINSERT INTO \"t\" DEFAULT VALUES;"
        );
        assert!(params.is_empty());
    }

    #[tokio::test]
    async fn test_sink_output_lines() {
        let contact = EntityDescriptor::new("Contact", "contact", ["id"]);
        let mut sink = SqlDumpSink::new(Vec::new());

        sink.clear_table(&contact).await.unwrap();
        sink.write_records(&contact, &[]).await.unwrap();
        sink.write_records(&contact, &[record(json!({"id": "c1"}))])
            .await
            .unwrap();
        sink.finish().await.unwrap();

        assert_eq!(sink.statements(), 2);
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            output,
            "DELETE FROM \"contact\";\n[]\nINSERT INTO \"contact\" (\"id\") VALUES ($1);\n[\"c1\"]\n"
        );
    }
}
