//! Crawler module for search fetching and processing
//!
//! This module contains the core search logic, including:
//! - HTTP fetching with retry, backoff and proxy routing
//! - HTML parsing of result lists and repository pages
//! - Bounded fan-out over repository pages
//! - Overall search coordination

mod coordinator;
mod fetcher;
mod parser;
mod proxy;
mod retry;
mod scheduler;

pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, FetchFailure, FetchOutcome, FetchSettings, HttpFetcher, PageFetcher,
};
pub use parser::{extract_repo_details, extract_result_links};
pub use proxy::{normalize_proxy_endpoint, ProxyConfig, ProxyPolicy};
pub use retry::{
    parse_retry_after, AttemptError, RetryPhase, RetryPolicy, RetryState, RETRYABLE_STATUS_CODES,
};
pub use scheduler::Scheduler;

use crate::config::Config;
use crate::search::SearchResult;

/// Runs a complete search session
///
/// This is the main entry point for a search. It will:
/// 1. Select the session's proxy and prepare the fetcher
/// 2. Validate the category
/// 3. Fetch the search page, opening the HTTP session
/// 4. Fetch and parse every repository page, for repository searches
/// 5. Close the session
///
/// # Arguments
///
/// * `config` - A validated configuration
/// * `keywords` - Search keywords
/// * `category` - One of `Repositories`, `Issues` or `Wikis`
///
/// # Returns
///
/// * `Ok(results)` - Results in discovery order
/// * `Err(TrawlError)` - Unsupported category or unusable base URL
///
/// # Example
///
/// ```no_run
/// use trawl::config::load_config;
/// use trawl::crawler::run_search;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("trawl.toml"))?;
/// let results = run_search(&config, &["rust".to_string()], "Repositories").await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_search(
    config: &Config,
    keywords: &[String],
    category: &str,
) -> crate::Result<Vec<SearchResult>> {
    let coordinator = Coordinator::new(config)?;
    let results = coordinator.search(keywords, category).await;
    coordinator.close();
    results
}
