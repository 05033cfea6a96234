//! # EPG Harness CLI (`epg`)
//!
//! Front-end for the guide-ingestion engine. The CLI owns all file I/O:
//! it reads an XMLTV feed from disk, runs the conversion for a guide
//! source, and reports the resulting store as a summary or a JSON dump.
//!
//! ## Usage
//!
//! ```bash
//! epg convert guide.xml --source-id 1
//! epg convert guide.xml --source-id 1 --json > store.json
//! epg inspect guide.xml
//! ```
//!
//! A missing feed file is not an error: the source is skipped and nothing
//! is produced, mirroring how a refresh run treats an absent upstream.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use epg_harness::config::{self, Config};
use epg_harness::convert;
use epg_harness::store::StoreRegistry;
use epg_harness::xmltv;

/// EPG Harness — a guide-feed ingestion and normalization engine for IPTV
/// lineups and EPGs.
#[derive(Parser)]
#[command(
    name = "epg",
    about = "EPG Harness — guide-feed ingestion and normalization for IPTV lineups and EPGs",
    version,
    long_about = "EPG Harness converts XMLTV guide feeds into a normalized, de-duplicated \
    guide data store: one lineup of channel bindings, services with ordered schedule entries, \
    fill-once program records, and a bounded keyword taxonomy, keyed by guide-source id."
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply if absent.
    #[arg(long, global = true, default_value = "./config/epg.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an XMLTV feed into a guide data store.
    ///
    /// Runs the full transform — lineup and channel services, programs and
    /// schedule entries, keyword taxonomy — and prints a summary of the
    /// published store.
    Convert {
        /// Path to the XMLTV feed file.
        file: PathBuf,

        /// Numeric guide-source id the run is keyed by.
        #[arg(long, default_value_t = 1)]
        source_id: i32,

        /// Override the configured lineup label for this run.
        #[arg(long)]
        lineup_name: Option<String>,

        /// Dump the full store as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Parse an XMLTV feed and report document counts without converting.
    Inspect {
        /// Path to the XMLTV feed file.
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Convert {
            file,
            source_id,
            lineup_name,
            json,
        } => cmd_convert(&file, source_id, lineup_name, json, config),
        Commands::Inspect { file } => cmd_inspect(&file),
    }
}

fn cmd_convert(
    file: &PathBuf,
    source_id: i32,
    lineup_name: Option<String>,
    json: bool,
    mut config: Config,
) -> Result<()> {
    if let Some(name) = lineup_name {
        config.lineup.name = name;
    }

    if !file.exists() {
        println!("feed {} not found, skipping source {}", file.display(), source_id);
        return Ok(());
    }
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read feed: {}", file.display()))?;

    let registry = StoreRegistry::new();
    let published = convert::ingest(&raw, source_id, &config, &registry)
        .with_context(|| format!("Conversion failed for source {}", source_id))?;

    let Some(store) = published else {
        println!("feed {} unreadable, skipping source {}", file.display(), source_id);
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&*store)?);
        return Ok(());
    }

    println!("convert source {}", source_id);
    for lineup in store.lineups() {
        println!("  lineup: {} ({} channels)", lineup.name, lineup.channels.len());
    }
    println!("  services: {}", store.service_count());
    let entries: usize = store.services().map(|s| s.schedule.len()).sum();
    println!("  schedule entries: {}", entries);
    println!("  programs: {}", store.program_count());
    println!("  persons: {}", store.person_count());
    println!("  guide images: {}", store.image_count());
    println!(
        "  keyword groups: {} ({} keywords)",
        store.keyword_groups.group_count(),
        store.keyword_groups.keywords.len()
    );
    println!("ok");
    Ok(())
}

fn cmd_inspect(file: &PathBuf) -> Result<()> {
    if !file.exists() {
        println!("feed {} not found", file.display());
        return Ok(());
    }
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read feed: {}", file.display()))?;

    match xmltv::parse_document(&raw) {
        Ok(doc) => {
            println!("inspect {}", file.display());
            println!("  channels: {}", doc.channels.len());
            println!("  programmes: {}", doc.programmes.len());
            println!("ok");
        }
        Err(err) => {
            println!("feed {} unreadable: {}", file.display(), err);
        }
    }
    Ok(())
}
