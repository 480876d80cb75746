//! DumpSink trait definition.

use anon_core::{EntityDescriptor, Record};
use anyhow::Result;

/// Trait for writing anonymised records to a dump.
///
/// The driver is generic over the sink, so the CLI branches once on the
/// output format and everything after that is statically dispatched:
///
/// ```ignore
/// pub async fn run_profile<S: RecordSource, K: DumpSink>(
///     source: &S,
///     sink: &mut K,
/// ) -> Result<ExportSummary> {
///     sink.clear(order.as_slice()).await?;
///     sink.write_records(entity, &page).await?;
/// }
/// ```
#[async_trait::async_trait]
pub trait DumpSink: Send {
    /// Emit whatever removes every existing row of `entity`'s table.
    async fn clear_table(&mut self, entity: &EntityDescriptor) -> Result<()>;

    /// Emit one batch of records for `entity`.
    ///
    /// An empty batch writes nothing.
    async fn write_records(&mut self, entity: &EntityDescriptor, records: &[Record]) -> Result<()>;

    /// Flush buffered output. Called once, after the last write.
    async fn finish(&mut self) -> Result<()>;

    /// Clear every table, dependents first.
    ///
    /// `entities` is in forward dependency order (referenced before
    /// referencing); tables are cleared in the reverse of that order.
    async fn clear(&mut self, entities: &[EntityDescriptor]) -> Result<()> {
        for entity in entities.iter().rev() {
            self.clear_table(entity).await?;
        }
        Ok(())
    }
}
