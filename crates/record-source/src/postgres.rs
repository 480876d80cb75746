//! PostgreSQL record source.
//!
//! Rows are read as JSON with `row_to_json`, so column types need no
//! per-type conversion. Filter values are bound as `jsonb` parameters and
//! compared against `to_jsonb(column)`.

use crate::filter::RecordFilter;
use crate::traits::{PageRequest, RecordSource};
use anon_core::Record;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, info};

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn push_condition(filter: &RecordFilter, params: &mut Vec<Value>) -> String {
    match filter {
        RecordFilter::Equals { field, value } => {
            params.push(value.clone());
            format!(
                "to_jsonb(item.{}) = ${}::jsonb",
                quote_identifier(field),
                params.len()
            )
        }
        RecordFilter::In { field, values } => {
            params.push(Value::Array(values.clone()));
            format!(
                "to_jsonb(item.{}) IN (SELECT jsonb_array_elements(${}::jsonb))",
                quote_identifier(field),
                params.len()
            )
        }
        RecordFilter::All(filters) if filters.is_empty() => "TRUE".to_string(),
        RecordFilter::All(filters) => {
            let parts: Vec<String> = filters
                .iter()
                .map(|filter| push_condition(filter, params))
                .collect();
            format!("({})", parts.join(" AND "))
        }
    }
}

/// Build the query and `jsonb` parameters for one page.
///
/// ```text
/// SELECT row_to_json(item) FROM "<table>" AS item
///   [WHERE <filter>] ORDER BY item."<col>" ASC, .. LIMIT <n> OFFSET <m>
/// ```
pub fn build_page_query(request: &PageRequest<'_>) -> (String, Vec<Value>) {
    let mut params = Vec::new();
    let mut query = format!(
        "SELECT row_to_json(item) FROM {} AS item",
        quote_identifier(&request.entity.table)
    );

    if let Some(filter) = request.filter {
        query.push_str(" WHERE ");
        query.push_str(&push_condition(filter, &mut params));
    }

    if !request.order_by.is_empty() {
        let columns: Vec<String> = request
            .order_by
            .iter()
            .map(|column| format!("item.{} ASC", quote_identifier(column)))
            .collect();
        query.push_str(" ORDER BY ");
        query.push_str(&columns.join(", "));
    }

    query.push_str(&format!(
        " LIMIT {} OFFSET {}",
        request.limit, request.offset
    ));

    (query, params)
}

/// Reads pages from a PostgreSQL database.
pub struct PostgresSource {
    client: Client,
}

impl PostgresSource {
    /// Wrap an already connected client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect to `uri` and spawn the connection handler.
    pub async fn connect(uri: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(uri, NoTls)
            .await
            .context("Failed to connect to PostgreSQL")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {e}");
            }
        });

        info!("Connected to PostgreSQL source");
        Ok(Self::new(client))
    }
}

#[async_trait::async_trait]
impl RecordSource for PostgresSource {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Vec<Record>> {
        let (query, params) = build_page_query(request);
        debug!("Fetching page: {query}");

        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let rows = self
            .client
            .query(&query, &params)
            .await
            .with_context(|| format!("Failed to query table {}", request.entity.table))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let value: Value = row
                .try_get(0)
                .with_context(|| format!("Failed to decode row of {}", request.entity.table))?;
            match value {
                Value::Object(record) => records.push(record),
                other => bail!(
                    "Expected a JSON object row from {}, got {other}",
                    request.entity.table
                ),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anon_core::EntityDescriptor;
    use serde_json::json;

    #[test]
    fn test_plain_page_query() {
        let entity = EntityDescriptor::new("Contact", "contact", ["id"]);
        let (query, params) = build_page_query(&PageRequest::new(&entity, 2000, 1000));

        assert_eq!(
            query,
            "SELECT row_to_json(item) FROM \"contact\" AS item ORDER BY item.\"id\" ASC LIMIT 1000 OFFSET 2000"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_filtered_composite_key_query() {
        let entity =
            EntityDescriptor::new("SegmentContact", "segment_contacts", ["segmentId", "contactId"]);
        let filter = RecordFilter::equals("segmentId", json!("s1"))
            .and(RecordFilter::one_of("contactId", vec![json!("c1"), json!("c2")]));

        let (query, params) =
            build_page_query(&PageRequest::new(&entity, 0, 10).with_filter(Some(&filter)));

        assert_eq!(
            query,
            "SELECT row_to_json(item) FROM \"segment_contacts\" AS item \
             WHERE (to_jsonb(item.\"segmentId\") = $1::jsonb AND \
             to_jsonb(item.\"contactId\") IN (SELECT jsonb_array_elements($2::jsonb))) \
             ORDER BY item.\"segmentId\" ASC, item.\"contactId\" ASC LIMIT 10 OFFSET 0"
        );
        assert_eq!(params, vec![json!("s1"), json!(["c1", "c2"])]);
    }

    #[test]
    fn test_empty_all_filter() {
        let entity = EntityDescriptor::new("Contact", "contact", ["id"]);
        let filter = RecordFilter::All(vec![]);
        let (query, _) =
            build_page_query(&PageRequest::new(&entity, 0, 1).with_filter(Some(&filter)));

        assert!(query.contains(" WHERE TRUE "));
    }
}
