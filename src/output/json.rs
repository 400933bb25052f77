//! JSON results file

use crate::output::OutputResult;
use crate::search::SearchResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes search results to a file as a pretty-printed JSON array
///
/// The file is created or truncated. Text is written as UTF-8 without
/// escaping non-ASCII characters.
///
/// # Arguments
///
/// * `path` - Path where the results file should be written
/// * `results` - Results in the order they should appear
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the results
/// * `Err(OutputError)` - Failed to create, serialize or flush the file
pub fn write_results(path: &Path, results: &[SearchResult]) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, results)?;
    writer.flush()?;

    tracing::info!("Wrote {} results to {}", results.len(), path.display());
    Ok(())
}

/// Formats search results as a pretty-printed JSON array
pub fn format_results(results: &[SearchResult]) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(results)?)
}
