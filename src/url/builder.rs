use url::Url;

/// Builds fully qualified URLs below a fixed origin
///
/// Only the scheme, host and port of the origin are kept; the path comes from
/// the caller, the query is form-encoded from key/value pairs, and the fragment
/// is always empty.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    origin: Url,
}

impl UrlBuilder {
    /// Creates a builder for the given origin
    ///
    /// The origin is assumed valid; see [`crate::url::parse_origin`].
    pub fn new(origin: Url) -> Self {
        Self { origin }
    }

    /// Returns the origin this builder resolves against
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Builds a URL from a path and query parameters
    ///
    /// A leading slash on `path` is stripped before it is set. Percent escapes
    /// already present in the path are kept as-is, so an encoded segment is never
    /// encoded twice. Query parameters are serialized with form encoding in the
    /// order given (a space becomes `+`, a literal `+` becomes `%2B`).
    ///
    /// # Arguments
    ///
    /// * `path` - Path below the origin, with or without a leading slash
    /// * `query_params` - Key/value pairs for the query string; empty means no query
    ///
    /// # Examples
    ///
    /// ```
    /// use trawl::url::{parse_origin, UrlBuilder};
    ///
    /// let builder = UrlBuilder::new(parse_origin("https://github.com").unwrap());
    /// let url = builder.build("/search", &[("q", "rust+async"), ("type", "repositories")]);
    /// assert_eq!(url.as_str(), "https://github.com/search?q=rust%2Basync&type=repositories");
    /// ```
    pub fn build(&self, path: &str, query_params: &[(&str, &str)]) -> Url {
        let mut url = self.origin.clone();

        url.set_path(path.trim_start_matches('/'));
        url.set_fragment(None);

        if query_params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(query_params.iter().copied());
        }

        url
    }
}
