//! URL handling module for Trawl
//!
//! This module provides origin validation, search/target URL construction,
//! and resolution of result-page hrefs against the configured origin.

mod builder;
mod resolve;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main types and functions
pub use builder::UrlBuilder;
pub use resolve::resolve_link;

/// Parses and validates a site origin
///
/// The origin must be an absolute http(s) URL with a host. Any path, query or
/// fragment is tolerated here and discarded later by [`UrlBuilder::build`].
///
/// # Arguments
///
/// * `origin` - The origin string, e.g. `https://github.com`
///
/// # Returns
///
/// * `Ok(Url)` - The parsed origin
/// * `Err(UrlError)` - The origin is malformed, has an unsupported scheme, or has no host
///
/// # Examples
///
/// ```
/// use trawl::url::parse_origin;
///
/// let origin = parse_origin("https://github.com").unwrap();
/// assert_eq!(origin.host_str(), Some("github.com"));
/// ```
pub fn parse_origin(origin: &str) -> UrlResult<Url> {
    let url = Url::parse(origin).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
