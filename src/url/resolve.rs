use url::Url;

/// Resolves a result href against the origin
///
/// Handles absolute hrefs and root-relative hrefs alike. Returns None for an
/// empty href or one that cannot be joined onto the origin; callers skip those.
///
/// # Arguments
///
/// * `href` - The raw `href` attribute value
/// * `origin` - The site origin
///
/// # Examples
///
/// ```
/// use trawl::url::{parse_origin, resolve_link};
///
/// let origin = parse_origin("https://github.com").unwrap();
/// assert_eq!(
///     resolve_link("/user/repo", &origin).as_deref(),
///     Some("https://github.com/user/repo")
/// );
/// ```
pub fn resolve_link(href: &str, origin: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    origin.join(href).ok().map(|url| url.to_string())
}
