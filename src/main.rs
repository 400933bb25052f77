//! Trawl main entry point
//!
//! This is the command-line interface for the Trawl search crawler.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use trawl::config::{load_config, validate, Config};
use trawl::crawler::{run_search, ProxyPolicy};
use trawl::output::{write_results, SearchSummary};
use trawl::Category;
use tracing_subscriber::EnvFilter;

/// Trawl: a keyword search crawler
///
/// Trawl searches a code hosting site for keywords and saves the result URLs.
/// For repository searches it also visits every result to record the owner
/// and language composition.
#[derive(Parser, Debug)]
#[command(name = "trawl")]
#[command(version)]
#[command(about = "A keyword search crawler", long_about = None)]
struct Cli {
    /// Search keywords
    #[arg(short, long, num_args = 1.., required = true)]
    keywords: Vec<String>,

    /// Proxy servers (ip:port); one is chosen for the whole session
    #[arg(short, long, num_args = 1..)]
    proxies: Vec<String>,

    /// Type of search
    #[arg(
        short = 't',
        long = "type",
        default_value = "Repositories",
        value_parser = ["Repositories", "Issues", "Wikis"]
    )]
    category: String,

    /// Output file path [default: search_results.json]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Try every proxy in turn when a fetch fails
    #[arg(long)]
    rotate_proxies: bool,

    /// Retries per request after the first attempt
    #[arg(long)]
    max_retries: Option<u32>,

    /// Initial backoff delay in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Repository pages fetched at once (0 = unbounded)
    #[arg(long)]
    max_concurrent_fetches: Option<usize>,

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

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let category: Category = cli.category.parse()?;

    let started_at = Utc::now();
    let results = run_search(&config, &cli.keywords, category.as_str()).await?;

    let output_path = Path::new(&config.output.results_path);
    write_results(output_path, &results)
        .with_context(|| format!("Failed to save results to {}", output_path.display()))?;

    println!();
    SearchSummary::new(category, results.len(), output_path, started_at).print();

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawl=info,warn"),
            1 => EnvFilter::new("trawl=debug,info"),
            2 => EnvFilter::new("trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if !cli.proxies.is_empty() {
        config.proxy.endpoints = cli.proxies.clone();
    }
    if cli.rotate_proxies {
        config.proxy.policy = ProxyPolicy::Rotate;
    }
    if let Some(output) = &cli.output {
        config.output.results_path = output.to_string_lossy().into_owned();
    }
    if let Some(max_retries) = cli.max_retries {
        config.crawler.max_retries = max_retries;
    }
    if let Some(retry_delay_ms) = cli.retry_delay_ms {
        config.crawler.retry_delay_ms = retry_delay_ms;
    }
    if let Some(max_concurrent) = cli.max_concurrent_fetches {
        config.crawler.max_concurrent_fetches = max_concurrent;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}
