//! anon-export library
//!
//! Exports an anonymised, replayable copy of the membership database.
//!
//! # Features
//!
//! - Consistent substitution: an original value reused across tables gets the
//!   same substitute everywhere within one run
//! - Schema-driven payloads: callout answers are anonymised with a spec built
//!   from the callout's own form schema
//! - Bounded memory: every table is read page by page
//! - Replayable output: SQL statements or a single JSON document
//!
//! # CLI Usage
//!
//! ```bash
//! # Full SQL dump from the live database
//! anon-export export --profile full --format sql \
//!   --source-uri postgresql://localhost/membership --output dump.sql
//!
//! # Demo JSON dump, reproducible, from an earlier JSON dump
//! anon-export export --profile demo --format json \
//!   --source-json full.json --seed 42 --output demo.json
//! ```

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use dump_sink::{DumpSink, JsonDumpSink, SqlDumpSink};
use record_source::RecordSource;
use std::path::PathBuf;
use tokio::io::AsyncWrite;
use tracing::info;

pub mod config;
pub mod export;
pub mod models;
pub mod profiles;

pub use config::{ConfigError, ExportConfig};
pub use export::{ExportRun, ExportStep, ExportSummary, ModelExport, SchemaDrivenExport, PAGE_SIZE};
pub use models::Catalogue;
pub use profiles::{ExportProfile, ProfileKind, ProfileOptions, Treatment};

/// Where records are read from.
#[derive(Args, Clone, Debug)]
#[group(required = true, multiple = false)]
pub struct SourceOpts {
    /// PostgreSQL connection string of the live database
    #[arg(long, env = "ANON_EXPORT_SOURCE_URI")]
    pub source_uri: Option<String>,

    /// JSON dump written by an earlier export
    #[arg(long)]
    pub source_json: Option<PathBuf>,
}

/// Output format of the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    /// `(statement, parameters)` line pairs
    Sql,
    /// One JSON document mapping tables to rows
    Json,
}

/// Build the requested profile and run it into `writer`.
pub async fn run_export<S, W>(
    source: &S,
    writer: W,
    format: DumpFormat,
    profile: ProfileKind,
    config: &ExportConfig,
) -> Result<ExportSummary>
where
    S: RecordSource,
    W: AsyncWrite + Unpin + Send,
{
    let catalogue = Catalogue::crm(&config.email_domain).context("Invalid model catalogue")?;
    let profile = profiles::build(profile, &catalogue, &config.profile_options(), source)
        .await
        .context("Failed to build export profile")?;
    info!(
        "Running {} profile: {} steps, {} tables",
        profile.name,
        profile.steps.len(),
        profile.clear_order.len()
    );

    match format {
        DumpFormat::Sql => execute(source, &mut SqlDumpSink::new(writer), &profile, config).await,
        DumpFormat::Json => execute(source, &mut JsonDumpSink::new(writer), &profile, config).await,
    }
}

async fn execute<S: RecordSource, K: DumpSink>(
    source: &S,
    sink: &mut K,
    profile: &ExportProfile,
    config: &ExportConfig,
) -> Result<ExportSummary> {
    let mut run = ExportRun::new(source, sink)
        .with_page_size(config.page_size)
        .with_synthesizer(config.synthesizer());
    if let Some(seed) = config.seed {
        run = run.with_seed(seed);
    }
    run.run(&profile.clear_order, &profile.steps).await
}
