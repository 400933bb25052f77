//! HTML parser for search results and repository pages
//!
//! This module handles parsing HTML content to extract:
//! - Result links from a search-results page
//! - Owner and language composition from a repository page
//!
//! Extraction never fails. A selector that matches nothing yields an empty
//! value for that field and the remaining fields are still extracted.
//! Each field is read by an ordered list of strategies; the first one that
//! produces a non-empty value wins.

use crate::search::RepositoryDetails;
use crate::url::resolve_link;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Anchors of the search results list
const RESULT_LINK_SELECTOR: &str = r#"div[data-testid="results-list"] a[class^="prc-Link-Link"]"#;

/// Owner selectors, in priority order
const OWNER_SELECTORS: [&str; 3] = [
    r#"span[itemprop="author"]"#,
    r#"a[data-hovercard-type="user"]"#,
    r#"a[data-hovercard-type="organization"]"#,
];

/// Heading text that introduces the language list
const LANGUAGES_HEADING_PATTERN: &str = r"(?i)\bLanguages\b";

type LanguageStats = BTreeMap<String, f64>;

/// A way of reading language stats from a repository page
type LanguageStrategy = fn(&Html) -> Option<LanguageStats>;

/// Language strategies, in priority order
const LANGUAGE_STRATEGIES: [(&str, LanguageStrategy); 2] = [
    ("languages heading", languages_from_heading),
    ("language list items", languages_from_items),
];

/// Extracts result links from a search-results page
///
/// Each matched anchor with an `href` is resolved against the origin. Document
/// order is preserved and duplicates are kept.
///
/// # Arguments
///
/// * `markup` - The search-results page HTML
/// * `origin` - The site origin used to resolve relative hrefs
///
/// # Example
///
/// ```
/// use trawl::crawler::extract_result_links;
/// use url::Url;
///
/// let html = r#"<div data-testid="results-list"><a class="prc-Link-Link" href="/user/repo">Repo</a></div>"#;
/// let origin = Url::parse("https://github.com").unwrap();
/// assert_eq!(extract_result_links(html, &origin), vec!["https://github.com/user/repo"]);
/// ```
pub fn extract_result_links(markup: &str, origin: &Url) -> Vec<String> {
    let Some(selector) = selector(RESULT_LINK_SELECTOR) else {
        return Vec::new();
    };

    let document = Html::parse_document(markup);
    let links: Vec<String> = document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_link(href, origin))
        .collect();

    tracing::debug!("Extracted {} result links", links.len());
    links
}

/// Extracts owner and language stats from a repository page
///
/// Empty or unrecognized markup yields empty details.
///
/// # Example
///
/// ```
/// use trawl::crawler::extract_repo_details;
///
/// let details = extract_repo_details(r#"<span itemprop="author"> alice </span>"#);
/// assert_eq!(details.owner, "alice");
/// assert!(details.language_stats.is_empty());
/// ```
pub fn extract_repo_details(markup: &str) -> RepositoryDetails {
    if markup.trim().is_empty() {
        return RepositoryDetails::default();
    }

    let document = Html::parse_document(markup);

    RepositoryDetails {
        owner: extract_owner(&document),
        language_stats: extract_language_stats(&document),
    }
}

fn extract_owner(document: &Html) -> String {
    OWNER_SELECTORS
        .iter()
        .find_map(|css| {
            let selector = selector(css)?;
            let owner = element_text(document.select(&selector).next()?);
            if owner.is_empty() {
                tracing::trace!("Owner selector '{}' matched empty text", css);
                None
            } else {
                Some(owner)
            }
        })
        .unwrap_or_default()
}

fn extract_language_stats(document: &Html) -> LanguageStats {
    LANGUAGE_STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let stats = strategy(document).filter(|stats| !stats.is_empty());
            if stats.is_none() {
                tracing::trace!("Language strategy '{}' found nothing", name);
            }
            stats
        })
        .unwrap_or_default()
}

/// Reads the list that follows a "Languages" heading
fn languages_from_heading(document: &Html) -> Option<LanguageStats> {
    let pattern = Regex::new(LANGUAGES_HEADING_PATTERN).ok()?;
    let heading_selector = selector("h2")?;
    let item_selector = selector("li.d-inline")?;

    let heading = document
        .select(&heading_selector)
        .find(|h2| pattern.is_match(&element_text(*h2)))?;

    let list = following_elements(heading).find(|el| el.value().name() == "ul")?;

    Some(language_pairs(list.select(&item_selector)))
}

/// Reads list items whose class mentions "language" anywhere on the page
fn languages_from_items(document: &Html) -> Option<LanguageStats> {
    let item_selector = selector(r#"li[class*="language"]"#)?;
    Some(language_pairs(document.select(&item_selector)))
}

/// Collects name/percentage pairs, skipping items that do not parse
fn language_pairs<'a>(items: impl Iterator<Item = ElementRef<'a>>) -> LanguageStats {
    let Some(name_selector) = selector("span.text-bold") else {
        return LanguageStats::new();
    };

    items
        .filter_map(|item| {
            let name_span = item.select(&name_selector).next()?;
            let percent_span =
                following_elements(name_span).find(|el| el.value().name() == "span")?;

            let name = element_text(name_span);
            let raw = element_text(percent_span);
            match parse_percentage(&raw) {
                Some(percent) if !name.is_empty() => Some((name, percent)),
                _ => {
                    tracing::trace!("Skipping language entry '{}' with value '{}'", name, raw);
                    None
                }
            }
        })
        .collect()
}

/// Parses text such as `75.5%` into a percentage in 0.0 - 100.0
fn parse_percentage(text: &str) -> Option<f64> {
    let value: f64 = text.trim().trim_matches('%').trim().parse().ok()?;
    (value.is_finite() && (0.0..=100.0).contains(&value)).then_some(value)
}

/// Elements after `element` in document order, starting with its own descendants
fn following_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let node = *element;
    let inside = node.descendants().skip(1);
    let after = std::iter::once(node)
        .chain(node.ancestors())
        .flat_map(|n| n.next_siblings())
        .flat_map(|sibling| sibling.descendants());

    inside.chain(after).filter_map(ElementRef::wrap)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!("Invalid selector '{}': {:?}", css, e);
            None
        }
    }
}
