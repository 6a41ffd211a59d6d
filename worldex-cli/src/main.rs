//! `worldex`: run one reconciliation over the selected sources and print what each added.
//!
//! Enable logs with `RUST_LOG`, e.g. `RUST_LOG=worldex=debug,worldex_sources=info`.

mod config;
mod sources;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use worldex::{FetchMode, JsonFileStore, MergePolicy, Reconciler, RunReport, SourceStatus};
use worldex_sources::{HttpFetch, ReqwestFetcher};

use crate::config::{DEFAULT_STORE, FileConfig};
use crate::sources::{KNOWN, SourceSettings};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    FillOnly,
    Overwrite,
}

impl From<PolicyArg> for MergePolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::FillOnly => Self::FillOnly,
            PolicyArg::Overwrite => Self::Overwrite,
        }
    }
}

/// Reconcile country indicators from public statistical sources into one JSON store.
#[derive(Parser, Debug)]
#[command(name = "worldex", version, about)]
struct Cli {
    /// Canonical store to load and update.
    #[arg(long)]
    store: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, env = "WORLDEX_CONFIG")]
    config: Option<PathBuf>,

    /// Sources to run, comma-separated, in precedence order.
    #[arg(long, value_delimiter = ',')]
    sources: Option<Vec<String>>,

    /// Directory holding the UN population workbooks.
    #[arg(long)]
    un_dir: Option<PathBuf>,

    /// Cache fetched payloads in this directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Fetch all sources at once. Merge order is unchanged.
    #[arg(long)]
    concurrent: bool,

    /// Merge policy for sources that do not declare one.
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Latest acceptable observation year.
    #[arg(long)]
    cutoff_year: Option<i32>,

    /// UNESCO UIS API key; enables the unesco-api source.
    #[arg(long, env = "UNESCO_API_KEY", hide_env_values = true)]
    unesco_api_key: Option<String>,

    /// Print the known sources and exit.
    #[arg(long)]
    list_sources: bool,

    /// Print the run report as JSON.
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_report(report: &RunReport) {
    for s in &report.sources {
        match &s.status {
            SourceStatus::Merged => println!(
                "{:<14} merged   +{} fields ({} extracted, {} countries, {} unresolved)",
                s.source,
                s.fields_added,
                s.fields_extracted,
                s.entities,
                s.unresolved.len()
            ),
            SourceStatus::Skipped { reason } => {
                println!("{:<14} skipped  {reason}", s.source);
            }
        }
        for w in &s.warnings {
            println!("{:<14}   warning: {w}", "");
        }
    }
    println!(
        "countries: {} -> {}, fields added: {}, unresolved: {}, skipped sources: {}",
        report.countries_before,
        report.countries_after,
        report.fields_added(),
        report.unresolved(),
        report.skipped().count()
    );
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.list_sources {
        for (name, about) in KNOWN {
            println!("{name:<14} {about}");
        }
        return Ok(());
    }

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    let settings = SourceSettings {
        un_dir: cli.un_dir.clone().or_else(|| file.un_dir.clone()),
        unesco_api_key: cli.unesco_api_key.clone().or_else(|| file.unesco_api_key.clone()),
        cache_dir: cli.cache_dir.clone().or_else(|| file.cache_dir.clone()),
        cache_max_age: file.cache_max_age_secs.map(Duration::from_secs),
        throttle: Duration::from_millis(file.throttle_ms.unwrap_or(0)),
    };
    let names = cli
        .sources
        .clone()
        .or_else(|| file.sources.clone())
        .unwrap_or_else(|| settings.default_selection());

    let http_timeout = Duration::from_secs(file.http_timeout_secs.unwrap_or(120));
    let http: Arc<dyn HttpFetch> = Arc::new(ReqwestFetcher::new(http_timeout)?);
    let built = settings.build_all(&names, &http)?;

    let mut cfg = file.run_config();
    if let Some(p) = cli.policy {
        cfg.merge_policy = p.into();
    }
    if let Some(y) = cli.cutoff_year {
        cfg.cutoff_year = Some(y);
    }
    if cli.concurrent {
        cfg.fetch_mode = FetchMode::Concurrent;
    }

    let mut builder = Reconciler::builder()
        .config(cfg)
        .overrides(file.override_table()?);
    for source in built {
        builder = builder.with_source(source);
    }
    let reconciler = builder.build()?;

    let store_path = cli
        .store
        .or(file.store)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));
    tracing::info!(
        store = %store_path.display(),
        sources = ?reconciler.source_names(),
        "starting run"
    );
    let report = reconciler.run(&JsonFileStore::new(store_path)).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}
