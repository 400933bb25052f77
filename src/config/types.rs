use crate::crawler::ProxyPolicy;
use serde::Deserialize;

/// Default site origin searched by the crawler
pub const DEFAULT_BASE_URL: &str = "https://github.com";

/// Default identifying User-Agent header
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default results file
pub const DEFAULT_RESULTS_PATH: &str = "search_results.json";

/// Main configuration structure for Trawl
///
/// Every section and key is optional in the TOML file; missing values take
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub proxy: ProxySection,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Origin of the searched site
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Retries allowed after the first failed attempt
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Initial backoff delay (milliseconds), doubled after every backoff
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum concurrent detail fetches; 0 means unbounded
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: 3,
            retry_delay_ms: 1000,
            request_timeout_secs: 60,
            connect_timeout_secs: 30,
            max_concurrent_fetches: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Proxy configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProxySection {
    /// Proxy endpoints, `host:port` or full URLs
    pub endpoints: Vec<String>,

    /// How endpoints are used across requests
    pub policy: ProxyPolicy,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSON results file
    #[serde(rename = "results-path")]
    pub results_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: DEFAULT_RESULTS_PATH.to_string(),
        }
    }
}
