use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use directory_sync::app::{SyncBatch, SyncUseCase};
use directory_sync::config::Config;
use directory_sync::constants::{REPORT_FILE, SNAPSHOT_FILE};
use directory_sync::domain::{EntityKind, EntityRef};
use directory_sync::logging;
use directory_sync::metrics;
use directory_sync::pipeline::normalize::{NormalizationRegistry, NormalizedEntity};
use directory_sync::pipeline::processing::lookup::LookupTable;
use directory_sync::pipeline::processing::lookup::KeyPolicy;
use directory_sync::pipeline::storage::InMemoryStore;

#[derive(Parser)]
#[command(name = "directory_sync")]
#[command(about = "Healthcare directory synchronization: raw API records to canonical entities")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full batch through every configured stage
    Sync {
        /// Batch JSON with specialties, hospitals, symptoms, services and doctors arrays
        #[arg(long)]
        input: PathBuf,
        /// TOML config file (defaults to $DIRECTORY_SYNC_CONFIG or directory_sync.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the Prometheus exposition after the run
        #[arg(long)]
        print_metrics: bool,
    },
    /// Transform a JSON array of raw records of one kind and print the result
    Transform {
        /// specialty, hospital, symptom, service or doctor
        #[arg(long)]
        kind: EntityKind,
        #[arg(long)]
        input: PathBuf,
        /// JSON object of specialty slug to reference, used for doctors
        #[arg(long)]
        specialties: Option<PathBuf>,
        /// JSON object of hospital name to reference, used for doctors
        #[arg(long)]
        hospitals: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::from_env().context("Failed to load config"),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn read_lookup<K: KeyPolicy>(path: Option<&Path>) -> Result<LookupTable<K>> {
    let Some(path) = path else {
        return Ok(LookupTable::empty());
    };
    let entries: HashMap<String, String> = read_json(path)?;
    Ok(entries
        .into_iter()
        .map(|(key, id)| (key, EntityRef::new(id)))
        .collect())
}

fn write_json<T: serde::Serialize>(dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(file_name);
    let content = serde_json::to_string_pretty(value)?;
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

async fn run_sync(input: &Path, config: &Config, print_metrics: bool) -> Result<()> {
    let batch = SyncBatch::load(input)
        .with_context(|| format!("Failed to load batch from {}", input.display()))?;
    let store = Arc::new(InMemoryStore::new());
    let use_case = SyncUseCase::with_config(store.clone(), &config.sync);

    let report = use_case.run(&batch, &config.sync.stages).await?;

    let output_dir = Path::new(&config.sync.output_dir);
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let report_path = write_json(output_dir, REPORT_FILE, &report)?;
    let snapshot_path = write_json(output_dir, SNAPSHOT_FILE, &store.snapshot()?)?;
    info!(
        "Wrote {} and {}",
        report_path.display(),
        snapshot_path.display()
    );

    println!("📊 Sync results:");
    for stage in &report.stages {
        println!(
            "   {:<10} received {:>5}  created {:>5}  updated {:>5}  unchanged {:>5}  rejected {:>4}  failed {:>4}",
            stage.kind,
            stage.received,
            stage.created,
            stage.updated,
            stage.unchanged,
            stage.rejected,
            stage.failed
        );
    }

    if report.total_failed() > 0 {
        warn!("{} records failed to commit", report.total_failed());
    }

    if print_metrics {
        match metrics::render() {
            Some(text) => println!("{}", text),
            None => warn!("No metrics recorder installed"),
        }
    }

    Ok(())
}

fn run_transform(
    kind: EntityKind,
    input: &Path,
    specialties: Option<&Path>,
    hospitals: Option<&Path>,
) -> Result<()> {
    let records: Vec<serde_json::Value> = read_json(input)?;
    let registry = NormalizationRegistry::with_lookups(
        Arc::new(read_lookup(specialties)?),
        Arc::new(read_lookup(hospitals)?),
    );

    let mut entities: Vec<NormalizedEntity> = Vec::with_capacity(records.len());
    for (index, raw) in records.iter().enumerate() {
        let record_path = format!("$[{}]", index);
        let record = registry.normalize(kind, raw, &record_path)?;
        for warning in &record.normalization.warnings {
            warn!("{}: {}", record_path, warning);
        }
        entities.push(record.entity);
    }

    println!("{}", serde_json::to_string_pretty(&entities)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            input,
            config,
            print_metrics,
        } => {
            let config = load_config(config.as_deref())?;
            let _guard = logging::init_logging(&config.logging);
            metrics::init_metrics();

            println!("🔄 Running directory sync...");
            run_sync(&input, &config, print_metrics).await?;
            println!("✅ Sync completed");
        }
        Commands::Transform {
            kind,
            input,
            specialties,
            hospitals,
        } => {
            let config = load_config(None)?;
            let _guard = logging::init_logging(&config.logging);
            run_transform(kind, &input, specialties.as_deref(), hospitals.as_deref())?;
        }
    }

    Ok(())
}
