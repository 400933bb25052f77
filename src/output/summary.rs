//! Search summary printed after results are written

use crate::search::Category;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Summary of a finished search
#[derive(Debug, Clone)]
pub struct SearchSummary {
    pub category: Category,
    pub total_results: usize,
    pub output_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SearchSummary {
    /// Creates a summary for a search that started at `started_at` and finished now
    pub fn new(
        category: Category,
        total_results: usize,
        output_path: &Path,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            category,
            total_results,
            output_path: output_path.to_path_buf(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Elapsed time in seconds, never negative
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Renders the summary lines shown to the user
    pub fn render(&self) -> String {
        format!(
            "Search completed:\nType: {}\nTotal URLs found: {}\nResults saved to: {}",
            self.category,
            self.total_results,
            self.output_path.display()
        )
    }

    /// Prints the summary to stdout and logs the timing
    pub fn print(&self) {
        println!("{}", self.render());
        tracing::info!(
            "Search started {} and took {:.2}s",
            self.started_at.to_rfc3339(),
            self.duration_seconds()
        );
    }
}
