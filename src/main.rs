//! Command-line interface for anon-export
//!
//! # Usage Examples
//!
//! ```bash
//! # Full SQL dump of the live database to stdout
//! anon-export export --profile full --format sql \
//!   --source-uri postgresql://localhost/membership
//!
//! # Demo JSON dump with a config file and a pinned seed
//! anon-export export --profile demo --format json \
//!   --source-uri postgresql://localhost/membership \
//!   --config anon-export.yaml --seed 42 --output demo.json
//!
//! # List exported tables in dependency order
//! anon-export tables
//! ```
//!
//! Logs go to stderr (`RUST_LOG=info`), so stdout can carry the dump.

use anon_export::{
    run_export, Catalogue, DumpFormat, ExportConfig, ProfileKind, SourceOpts,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use record_source::{MemorySource, PostgresSource};
use std::path::PathBuf;
use tokio::io::{AsyncWrite, BufWriter};

#[derive(Parser)]
#[command(name = "anon-export")]
#[command(about = "Export an anonymised, replayable dump of the membership database")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export an anonymised dump
    Export {
        /// Which rows to export
        #[arg(long, value_enum, default_value = "full")]
        profile: ProfileKind,

        /// Dump format
        #[arg(long, value_enum, default_value = "sql")]
        format: DumpFormat,

        /// Source options
        #[command(flatten)]
        source: SourceOpts,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// YAML config file
        #[arg(long, env = "ANON_EXPORT_CONFIG")]
        config: Option<PathBuf>,

        /// Records per page (overrides the config file)
        #[arg(long)]
        page_size: Option<usize>,

        /// RNG seed for a reproducible dump (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List exported tables in dependency order
    Tables,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            profile,
            format,
            source,
            output,
            config,
            page_size,
            seed,
        } => {
            let mut config = match config {
                Some(path) => ExportConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config from {path:?}"))?,
                None => ExportConfig::default(),
            };
            if let Some(page_size) = page_size {
                config.page_size = page_size;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            config.validate()?;

            let writer = open_output(output.as_ref()).await?;

            let summary = if let Some(uri) = source.source_uri {
                let source = PostgresSource::connect(&uri).await?;
                run_export(&source, writer, format, profile, &config).await?
            } else if let Some(path) = source.source_json {
                let source = MemorySource::from_json_file(&path).await?;
                run_export(&source, writer, format, profile, &config).await?
            } else {
                anyhow::bail!("Either --source-uri or --source-json is required");
            };

            tracing::info!("Export summary: {summary}");
        }
        Commands::Tables => {
            let catalogue = Catalogue::crm(anon_generator::FAKE_EMAIL_DOMAIN)?;
            for entity in catalogue.order().forward() {
                println!(
                    "{}\t{}\t{}",
                    entity.name,
                    entity.table,
                    entity.primary_key.join(",")
                );
            }
        }
    }

    Ok(())
}

async fn open_output(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn AsyncWrite + Unpin + Send>> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create output file {path:?}"))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(tokio::io::stdout()))),
    }
}
