//! Search coordinator - main search orchestration logic
//!
//! This module ties the crawler together:
//! - Validating the category and building the search URL
//! - Fetching the search-results page and extracting result links
//! - Fanning out to every repository page and extracting its details
//! - Assembling the results in discovery order

use crate::config::Config;
use crate::crawler::fetcher::{FetchOutcome, HttpFetcher, PageFetcher};
use crate::crawler::parser::{extract_repo_details, extract_result_links};
use crate::crawler::scheduler::Scheduler;
use crate::search::{Category, RepositoryResult, SearchRequest, SearchResult, SimpleResult};
use crate::url::{parse_origin, UrlBuilder};
use std::sync::Arc;
use url::Url;

/// Path of the site's search endpoint
const SEARCH_PATH: &str = "search";

/// Main search coordinator structure
///
/// Owns the fetcher, and through it the connection session, for the lifetime
/// of a crawl. Dropping the coordinator (or calling [`Coordinator::close`])
/// releases the session.
pub struct Coordinator<F = HttpFetcher> {
    fetcher: Arc<F>,
    urls: UrlBuilder,
    scheduler: Scheduler,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to search; no connection is opened yet
    /// * `Err(TrawlError)` - The configured base URL is not a usable origin
    pub fn new(config: &Config) -> crate::Result<Self> {
        let origin = parse_origin(&config.crawler.base_url)?;

        Ok(Self::with_fetcher(
            HttpFetcher::from_config(config),
            origin,
            config.crawler.max_concurrent_fetches,
        ))
    }

    /// Returns true once the HTTP session has been opened
    pub fn is_open(&self) -> bool {
        self.fetcher.is_open()
    }
}

impl<F: PageFetcher + 'static> Coordinator<F> {
    /// Creates a coordinator over any page source
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Source of page markup
    /// * `origin` - Site origin for search and result URLs
    /// * `max_concurrent` - Detail fetches in flight at once; 0 means unbounded
    pub fn with_fetcher(fetcher: F, origin: Url, max_concurrent: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            urls: UrlBuilder::new(origin),
            scheduler: Scheduler::new(max_concurrent),
        }
    }

    /// Returns the page source
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns the site origin
    pub fn origin(&self) -> &Url {
        self.urls.origin()
    }

    /// Searches for keywords in a category
    ///
    /// # Arguments
    ///
    /// * `keywords` - Search keywords; empty yields no results and no requests
    /// * `category` - One of `Repositories`, `Issues` or `Wikis`
    ///
    /// # Returns
    ///
    /// * `Ok(results)` - Results in discovery order; empty if the search page was unreachable
    /// * `Err(TrawlError::UnsupportedCategory)` - The category is not recognized
    ///
    /// # Example
    ///
    /// ```no_run
    /// use trawl::{Config, Coordinator};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let coordinator = Coordinator::new(&Config::default())?;
    /// let results = coordinator
    ///     .search(&["rust".to_string(), "crawler".to_string()], "Repositories")
    ///     .await?;
    /// coordinator.close();
    /// println!("{} results", results.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search(
        &self,
        keywords: &[String],
        category: &str,
    ) -> crate::Result<Vec<SearchResult>> {
        let category: Category = category.parse()?;
        let request = SearchRequest::new(keywords.to_vec(), category);
        Ok(self.execute(&request).await)
    }

    /// Executes a validated search request
    pub async fn execute(&self, request: &SearchRequest) -> Vec<SearchResult> {
        if request.is_empty() {
            tracing::info!("No keywords given, skipping search");
            return Vec::new();
        }

        let search_url = self.search_url(request);
        tracing::info!("Searching {} for '{}'", request.category(), request.query());

        let markup = match self.fetcher.fetch(search_url.as_str()).await {
            FetchOutcome::Content(markup) => markup,
            FetchOutcome::Failure(reason) => {
                tracing::warn!("Search page {} unavailable: {}", search_url, reason);
                return Vec::new();
            }
        };

        let links = extract_result_links(&markup, self.urls.origin());
        tracing::info!("Found {} {} results", links.len(), request.category());

        if !request.category().fetches_details() {
            return links
                .into_iter()
                .map(|url| SearchResult::Link(SimpleResult { url }))
                .collect();
        }

        self.fetch_repositories(links)
            .await
            .into_iter()
            .map(SearchResult::Repository)
            .collect()
    }

    /// Builds the search URL for a request
    pub fn search_url(&self, request: &SearchRequest) -> Url {
        let query = request.query();
        self.urls.build(
            SEARCH_PATH,
            &[("q", query.as_str()), ("type", request.category().query_value())],
        )
    }

    /// Releases the session
    pub fn close(self) {
        tracing::info!("Closing search session for {}", self.urls.origin());
    }

    /// Fetches every repository page concurrently, keeping link order
    async fn fetch_repositories(&self, links: Vec<String>) -> Vec<RepositoryResult> {
        if let Some(limit) = self.scheduler.limit() {
            tracing::debug!("Fetching {} repositories, {} at a time", links.len(), limit);
        }

        let fetcher = Arc::clone(&self.fetcher);
        let slots = self
            .scheduler
            .fan_out(links.clone(), move |url| {
                let fetcher = Arc::clone(&fetcher);
                async move { fetch_repository(fetcher.as_ref(), url).await }
            })
            .await;

        links
            .into_iter()
            .zip(slots)
            .map(|(url, slot)| slot.unwrap_or_else(|| RepositoryResult::degraded(url)))
            .collect()
    }
}

/// Fetches one repository page and extracts its details
async fn fetch_repository<F: PageFetcher>(fetcher: &F, url: String) -> RepositoryResult {
    match fetcher.fetch(&url).await {
        FetchOutcome::Content(markup) => {
            let details = extract_repo_details(&markup);
            tracing::debug!(
                "Extracted {} (owner '{}', {} languages)",
                url,
                details.owner,
                details.language_stats.len()
            );
            RepositoryResult::new(url, details)
        }
        FetchOutcome::Failure(reason) => {
            tracing::warn!("Using empty details for {}: {}", url, reason);
            RepositoryResult::degraded(url)
        }
    }
}
