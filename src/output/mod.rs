//! Output module for search results and summaries
//!
//! This module handles:
//! - Writing the results file as a JSON array
//! - Printing a short summary of a finished search

mod json;
mod summary;

pub use json::{format_results, write_results};
pub use summary::SearchSummary;

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
