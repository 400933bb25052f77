//! Configuration module for Trawl
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, so an empty file (or no file
//! at all) yields a working configuration.
//!
//! # Example
//!
//! ```no_run
//! use trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawl.toml")).unwrap();
//! println!("Searching {}", config.crawler.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, ProxySection, UserAgentConfig, DEFAULT_BASE_URL,
    DEFAULT_RESULTS_PATH, DEFAULT_USER_AGENT,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
