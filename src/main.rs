//! Sumi-Index main entry point
//!
//! Crawls outward from the seed URLs given on the command line while an
//! interactive prompt answers keyword queries against the pages indexed so far.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use sumi_index::config::{load_config_with_hash, validate, Config};
use sumi_index::crawler::{spawn_coordinator, HttpPageSource};
use sumi_index::output::print_statistics;
use sumi_index::session::spawn_console_session;
use tracing_subscriber::EnvFilter;

/// Sumi-Index: a bounded crawler with an interactive keyword index
///
/// Pages are fetched by a small worker pool until the page budget is spent or
/// no unvisited links remain. Enter space-separated terms at the prompt to see
/// what share of the indexed pages contain all of them; a blank line quits.
#[derive(Parser, Debug)]
#[command(name = "sumi-index")]
#[command(version)]
#[command(about = "A bounded crawler with an interactive keyword index", long_about = None)]
struct Cli {
    /// Seed URLs (http, https or file)
    #[arg(value_name = "SEED", required = true)]
    seeds: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of pages to visit (overrides the config file)
    #[arg(long)]
    max_pages: Option<usize>,

    /// Number of fetch workers (overrides the config file)
    ///
    /// A worker that finds no pending URL goes idle and is not woken for links
    /// found later, so a single seed may keep only one worker busy.
    #[arg(long)]
    workers: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;
    tracing::info!(
        "Page budget {}, {} workers, {} seed URLs",
        config.crawler.max_pages,
        config.crawler.workers,
        cli.seeds.len()
    );

    let source = HttpPageSource::new(&config.user_agent, &config.crawler)
        .context("Failed to build HTTP client")?;
    let (coordinator, coordinator_task) = spawn_coordinator(&config.crawler, Arc::new(source));

    let accepted = coordinator
        .start_indexing(cli.seeds.clone())
        .await
        .context("Failed to start indexing")?;
    if accepted == 0 {
        tracing::warn!("No usable seed URLs; every query will see an empty index");
    }

    let session = spawn_console_session(coordinator.clone(), config.session.prompt.clone());
    match session.await {
        Ok(Ok(answered)) => tracing::info!("Session finished after {} queries", answered),
        Ok(Err(e)) => {
            tracing::error!("Query session failed: {}", e);
            shutdown(&coordinator).await;
        }
        Err(e) => {
            tracing::error!("Query session panicked: {}", e);
            shutdown(&coordinator).await;
        }
    }

    let stats = coordinator_task
        .await
        .context("Coordinator task failed")?;

    if !cli.quiet {
        print_statistics(&stats);
    }

    Ok(())
}

/// Loads the config file if one was given, then applies command-line overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Ends the session on the coordinator after the console loop died early
async fn shutdown(coordinator: &sumi_index::CoordinatorHandle) {
    if let Err(e) = coordinator.terminate().await {
        tracing::debug!("Coordinator already stopped: {}", e);
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so they do not interleave with the query prompt.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_index=warn"),
            1 => EnvFilter::new("sumi_index=info,warn"),
            2 => EnvFilter::new("sumi_index=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
