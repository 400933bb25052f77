//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the identifying user agent and optional proxy
//! - Opening one shared session lazily, on the first fetch
//! - Retrying transient failures with exponential backoff and jitter
//! - Honoring `Retry-After` on rate limiting
//! - Rotating through proxies when configured to
//!
//! A fetch never returns an error: every failure becomes [`FetchOutcome::Failure`].

use crate::config::Config;
use crate::crawler::proxy::ProxyConfig;
use crate::crawler::retry::{parse_retry_after, AttemptError, RetryPhase, RetryPolicy, RetryState};
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Proxy};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The full response body of a 2xx response
    Content(String),

    /// No content; the reason is kept for logs only
    Failure(FetchFailure),
}

impl FetchOutcome {
    /// Returns true if the fetch produced content
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Content(_))
    }

    /// Returns the body, discarding the failure reason
    pub fn into_content(self) -> Option<String> {
        match self {
            Self::Content(body) => Some(body),
            Self::Failure(_) => None,
        }
    }
}

/// Why a fetch produced no content
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// `attempts` counts every route tried
    #[error("gave up after {attempts} attempts, last error: {last}")]
    Exhausted { attempts: u32, last: String },

    #[error("non-retryable HTTP status {status}")]
    NonRetryable { status: u16 },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Settings applied to every request of a session
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// User-Agent header value
    pub user_agent: String,

    /// Whole-request timeout
    pub request_timeout: Duration,

    /// Connection establishment timeout
    pub connect_timeout: Duration,

    /// Retry budget and initial backoff
    pub retry: RetryPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl FetchSettings {
    /// Builds fetch settings from the crawler and user-agent configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            user_agent: config.user_agent.value.clone(),
            request_timeout: Duration::from_secs(config.crawler.request_timeout_secs),
            connect_timeout: Duration::from_secs(config.crawler.connect_timeout_secs),
            retry: RetryPolicy::new(
                config.crawler.max_retries,
                Duration::from_millis(config.crawler.retry_delay_ms),
            ),
        }
    }
}

/// Source of page markup
///
/// Implemented by [`HttpFetcher`]; the coordinator is generic over it so that
/// searches can run against any source.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches a URL, never failing with an error
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// One way out to the network: a client, possibly bound to a proxy
struct Route {
    proxy: Option<String>,
    client: Client,
}

impl Route {
    fn label(&self) -> &str {
        self.proxy.as_deref().unwrap_or("direct")
    }
}

/// The connection session shared by every fetch of a crawl
struct Session {
    routes: Vec<Route>,
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::info!("Closed HTTP session ({} route(s))", self.routes.len());
    }
}

/// Fetches pages over HTTP with retry, backoff and optional proxy routing
///
/// The underlying session is opened on the first call to [`PageFetcher::fetch`]
/// and released when the fetcher is dropped. Concurrent fetches share it
/// through `&self`.
pub struct HttpFetcher {
    settings: FetchSettings,
    proxies: ProxyConfig,
    session: OnceCell<Session>,
}

impl HttpFetcher {
    /// Creates a fetcher; no connection is made until the first fetch
    pub fn new(settings: FetchSettings, proxies: ProxyConfig) -> Self {
        Self {
            settings,
            proxies,
            session: OnceCell::new(),
        }
    }

    /// Creates a fetcher from configuration, selecting the session's proxy
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            FetchSettings::from_config(config),
            ProxyConfig::new(config.proxy.endpoints.clone(), config.proxy.policy),
        )
    }

    /// Returns the fetch settings
    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Returns the proxy configuration
    pub fn proxies(&self) -> &ProxyConfig {
        &self.proxies
    }

    /// Returns true once the session has been opened
    pub fn is_open(&self) -> bool {
        self.session.initialized()
    }

    async fn session(&self) -> Result<&Session, reqwest::Error> {
        self.session
            .get_or_try_init(|| async { self.open_session() })
            .await
    }

    fn open_session(&self) -> Result<Session, reqwest::Error> {
        let routes = self
            .proxies
            .routes()
            .into_iter()
            .map(|proxy| {
                let client = build_http_client(&self.settings, proxy.as_deref())?;
                Ok(Route { proxy, client })
            })
            .collect::<Result<Vec<_>, reqwest::Error>>()?;

        tracing::info!(
            "Opened HTTP session ({} route(s), worst-case backoff {:.2}s per route)",
            routes.len(),
            self.settings.retry.worst_case_backoff().as_secs_f64()
        );
        Ok(Session { routes })
    }

    /// Fetches a URL over one route, retrying per the retry policy
    ///
    /// Also returns the number of failed attempts made on the route.
    async fn fetch_via(&self, route: &Route, url: &str) -> (FetchOutcome, u32) {
        let max_retries = self.settings.retry.max_retries;
        let mut retry = RetryState::new(self.settings.retry.clone());

        loop {
            let error = match attempt(&route.client, url).await {
                Ok(body) => {
                    retry.on_success();
                    return (FetchOutcome::Content(body), retry.failures());
                }
                Err(error) => error,
            };

            let phase = retry.on_failure(&error);

            if let Some(wait) = phase.wait() {
                if matches!(phase, RetryPhase::RateLimitWait(_)) {
                    tracing::warn!(
                        "Rate limited fetching {} via {}. Waiting {:.2}s (attempt {}/{})",
                        url,
                        route.label(),
                        wait.as_secs_f64(),
                        retry.failures(),
                        max_retries + 1
                    );
                } else {
                    tracing::warn!(
                        "Retry {}/{} for {} via {} after {:.2}s: {}",
                        retry.failures(),
                        max_retries,
                        url,
                        route.label(),
                        wait.as_secs_f64(),
                        error
                    );
                }

                tokio::time::sleep(wait).await;
                retry.resume();
                continue;
            }

            let failure = match (phase, error) {
                (RetryPhase::Exhausted, error) => FetchFailure::Exhausted {
                    attempts: retry.failures(),
                    last: error.to_string(),
                },
                (_, AttemptError::NonRetryable(status)) => FetchFailure::NonRetryable { status },
                (_, error) => FetchFailure::Unexpected(error.to_string()),
            };

            tracing::error!("Failed to fetch {} via {}: {}", url, route.label(), failure);
            return (FetchOutcome::Failure(failure), retry.failures());
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let session = match self.session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to open HTTP session: {}", e);
                return FetchOutcome::Failure(FetchFailure::Unexpected(e.to_string()));
            }
        };

        let mut outcome = FetchOutcome::Failure(FetchFailure::Unexpected(
            "no route available".to_string(),
        ));

        let mut total_attempts = 0;

        for (index, route) in session.routes.iter().enumerate() {
            let (route_outcome, attempts) = self.fetch_via(route, url).await;
            if route_outcome.is_content() {
                return route_outcome;
            }
            outcome = route_outcome;
            total_attempts += attempts;

            if let Some(next) = session.routes.get(index + 1) {
                tracing::warn!(
                    "Fetch of {} via {} failed, rotating to {}",
                    url,
                    route.label(),
                    next.label()
                );
            }
        }

        // Exhausted reports the attempts made across every route tried
        match outcome {
            FetchOutcome::Failure(FetchFailure::Exhausted { last, .. }) => {
                FetchOutcome::Failure(FetchFailure::Exhausted {
                    attempts: total_attempts,
                    last,
                })
            }
            outcome => outcome,
        }
    }
}

/// Builds an HTTP client with the session's settings
///
/// # Arguments
///
/// * `settings` - User agent and timeouts
/// * `proxy` - Normalized proxy URL, or None to go direct
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - The proxy URL was rejected or the client could not be built
///
/// # Example
///
/// ```
/// use trawl::crawler::{build_http_client, FetchSettings};
///
/// let settings = FetchSettings::default();
/// let client = build_http_client(&settings, Some("http://127.0.0.1:8080")).unwrap();
/// ```
pub fn build_http_client(
    settings: &FetchSettings,
    proxy: Option<&str>,
) -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.request_timeout)
        .connect_timeout(settings.connect_timeout)
        .gzip(true)
        .brotli(true);

    // Direct routes ignore proxy environment variables
    let builder = match proxy {
        Some(proxy) => builder.proxy(Proxy::all(proxy)?),
        None => builder.no_proxy(),
    };

    builder.build()
}

/// Sends one GET and classifies the result
async fn attempt(client: &Client, url: &str) -> Result<String, AttemptError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(&e))?;

    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        return Err(AttemptError::from_status(status.as_u16(), retry_after));
    }

    response.text().await.map_err(|e| classify_error(&e))
}

/// Classifies a client error as transient or not worth retrying
fn classify_error(error: &reqwest::Error) -> AttemptError {
    if error.is_builder() || error.is_redirect() {
        AttemptError::Unexpected(error.to_string())
    } else {
        AttemptError::Transient(error.to_string())
    }
}
