//! Paginated batch driver.
//!
//! An [`ExportRun`] owns the run's substitution cache and RNG and walks a list
//! of [`ExportStep`]s in dependency order. Every step reads its entity page by
//! page, anonymises each record and forwards the page to the sink before
//! fetching the next one.
//!
//! ```text
//! RecordSource ──page──► apply(spec, cache, rng) ──page──► DumpSink
//!      ▲                                                       │
//!      └──────────── offset += page_size ◄────────────────────┘
//! ```

mod schema_driven;

pub use schema_driven::SchemaDrivenExport;

use anon_core::{apply, CopyMode, DependencyOrder, EntityDescriptor, Record, Spec, ValueCache};
use anon_generator::Synthesizer;
use anyhow::{Context, Result};
use dump_sink::DumpSink;
use rand::rngs::StdRng;
use rand::SeedableRng;
use record_source::{PageRequest, RecordFilter, RecordSource};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// Records requested per page.
pub const PAGE_SIZE: usize = 1000;

/// Export one entity with a static spec.
#[derive(Debug, Clone)]
pub struct ModelExport {
    /// Entity to read and write
    pub entity: EntityDescriptor,
    /// Spec applied to every record
    pub spec: Spec,
    /// What happens to fields the spec does not mention
    pub copy_mode: CopyMode,
    /// Optional restriction on the rows read
    pub filter: Option<RecordFilter>,
}

impl ModelExport {
    /// Export every row of `entity` through `spec`, keeping unspecified fields.
    pub fn new(entity: EntityDescriptor, spec: Spec) -> Self {
        Self {
            entity,
            spec,
            copy_mode: CopyMode::KeepUnspecified,
            filter: None,
        }
    }

    /// Builder: copy mode.
    pub fn with_copy_mode(mut self, copy_mode: CopyMode) -> Self {
        self.copy_mode = copy_mode;
        self
    }

    /// Builder: only export rows matching `filter`.
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// One unit of work in a profile.
#[derive(Debug, Clone)]
pub enum ExportStep {
    /// Plain paged export with a static spec
    Model(ModelExport),
    /// Dependent records grouped by a schema-bearing owner
    SchemaDriven(SchemaDrivenExport),
}

impl ExportStep {
    /// The entity this step writes.
    pub fn entity(&self) -> &EntityDescriptor {
        match self {
            ExportStep::Model(step) => &step.entity,
            ExportStep::SchemaDriven(step) => &step.dependent,
        }
    }
}

impl From<ModelExport> for ExportStep {
    fn from(step: ModelExport) -> Self {
        ExportStep::Model(step)
    }
}

impl From<SchemaDrivenExport> for ExportStep {
    fn from(step: SchemaDrivenExport) -> Self {
        ExportStep::SchemaDriven(step)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportSummary {
    /// Records written per entity, in the order entities were exported
    pub entities: Vec<(String, u64)>,
    /// Number of payload specs synthesised from form schemas
    pub schemas_synthesized: u64,
    /// Distinct original values substituted
    pub substitutions: usize,
}

impl ExportSummary {
    /// Records written for one entity.
    pub fn records_for(&self, entity: &str) -> Option<u64> {
        self.entities
            .iter()
            .find(|(name, _)| name == entity)
            .map(|(_, count)| *count)
    }

    /// Records written across all entities.
    pub fn total_records(&self) -> u64 {
        self.entities.iter().map(|(_, count)| count).sum()
    }

    fn record(&mut self, entity: &str, count: u64) {
        match self.entities.iter_mut().find(|(name, _)| name == entity) {
            Some((_, total)) => *total += count,
            None => self.entities.push((entity.to_string(), count)),
        }
    }
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records across {} entities ({} schemas synthesised, {} substitutions)",
            self.total_records(),
            self.entities.len(),
            self.schemas_synthesized,
            self.substitutions
        )
    }
}

/// A single export run.
///
/// The substitution cache lives exactly as long as the run, so every step of
/// the run shares it and two runs never do.
pub struct ExportRun<'a, S, K> {
    source: &'a S,
    sink: &'a mut K,
    cache: ValueCache,
    rng: StdRng,
    page_size: usize,
    synthesizer: Synthesizer,
    summary: ExportSummary,
}

impl<'a, S: RecordSource, K: DumpSink> ExportRun<'a, S, K> {
    /// Create a run reading from `source` and writing to `sink`.
    pub fn new(source: &'a S, sink: &'a mut K) -> Self {
        Self {
            source,
            sink,
            cache: ValueCache::new(),
            rng: StdRng::from_os_rng(),
            page_size: PAGE_SIZE,
            synthesizer: Synthesizer::default(),
            summary: ExportSummary::default(),
        }
    }

    /// Builder: seed the RNG for a reproducible run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Builder: records requested per page (at least 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Builder: synthesizer used for schema-driven payloads.
    pub fn with_synthesizer(mut self, synthesizer: Synthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    /// The run's substitution cache.
    pub fn cache(&self) -> &ValueCache {
        &self.cache
    }

    /// Clear every table of `order`, then run `steps` and finish the sink.
    pub async fn run(
        mut self,
        order: &DependencyOrder,
        steps: &[ExportStep],
    ) -> Result<ExportSummary> {
        let started = Instant::now();

        self.sink
            .clear(order.as_slice())
            .await
            .context("Failed to clear tables")?;

        for step in steps {
            self.run_step(step).await?;
        }

        self.sink.finish().await.context("Failed to finish dump")?;

        let mut summary = self.summary;
        summary.substitutions = self.cache.len();
        info!("Export completed in {:?}: {summary}", started.elapsed());
        Ok(summary)
    }

    /// Run one step, recording its count in the summary.
    pub async fn run_step(&mut self, step: &ExportStep) -> Result<u64> {
        let entity = step.entity();
        info!("Exporting {} ({})", entity.name, entity.table);

        let written = match step {
            ExportStep::Model(step) => self.export_model(step).await,
            ExportStep::SchemaDriven(step) => self.export_schema_driven(step).await,
        }
        .with_context(|| format!("Failed to export {}", entity.name))?;

        self.summary.record(&entity.name, written);
        info!("Exported {written} {} records", entity.name);
        Ok(written)
    }

    /// Page through one entity, applying its static spec.
    pub async fn export_model(&mut self, step: &ModelExport) -> Result<u64> {
        let mut offset = 0;
        let mut written = 0;

        loop {
            let request = PageRequest::new(&step.entity, offset, self.page_size)
                .with_filter(step.filter.as_ref());
            let page = self.fetch(&request).await?;
            if page.is_empty() {
                break;
            }

            let out = self
                .anonymise_page(&page, &step.spec, step.copy_mode)
                .with_context(|| format!("Failed to anonymise page at offset {offset}"))?;
            self.write(&step.entity, &out, offset).await?;

            written += out.len() as u64;
            offset += self.page_size;
        }

        Ok(written)
    }

    async fn fetch(&self, request: &PageRequest<'_>) -> Result<Vec<Record>> {
        let page = self.source.fetch_page(request).await.with_context(|| {
            format!(
                "Failed to fetch {} page at offset {}",
                request.entity.name, request.offset
            )
        })?;
        debug!(
            "Fetched {} {} records at offset {}",
            page.len(),
            request.entity.name,
            request.offset
        );
        Ok(page)
    }

    async fn write(
        &mut self,
        entity: &EntityDescriptor,
        records: &[Record],
        offset: usize,
    ) -> Result<()> {
        self.sink
            .write_records(entity, records)
            .await
            .with_context(|| format!("Failed to write {} page at offset {offset}", entity.name))
    }

    fn anonymise_page(
        &mut self,
        page: &[Record],
        spec: &Spec,
        mode: CopyMode,
    ) -> Result<Vec<Record>> {
        page.iter()
            .map(|record| {
                apply(record, spec, &mut self.cache, &mut self.rng, mode)
                    .map_err(anyhow::Error::from)
            })
            .collect()
    }
}
