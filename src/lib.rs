//! Trawl: a targeted search crawler
//!
//! This crate issues a keyword search against a single known site, extracts the
//! result links from the returned page and, for repository searches, fans out to
//! every result page to collect its owner and language composition.

pub mod config;
pub mod crawler;
pub mod output;
pub mod search;
pub mod url;

use thiserror::Error;

/// Main error type for Trawl operations
///
/// Fetch failures never surface here: they degrade to empty results inside the
/// crawler. Only configuration problems and an unsupported category abort a search;
/// output errors arise after it, when results are written.
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unsupported search category '{0}': expected one of Repositories, Issues, Wikis")]
    UnsupportedCategory(String),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid proxy endpoint: {0}")]
    InvalidProxy(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_search, Coordinator, FetchOutcome, HttpFetcher, PageFetcher};
pub use search::{Category, RepositoryResult, SearchRequest, SearchResult, SimpleResult};
