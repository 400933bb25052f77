use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Details extracted from a repository page
///
/// Both fields default to empty; an all-empty value is the degraded result for
/// a page that could not be fetched or was not recognized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryDetails {
    /// Owner login or organization name
    pub owner: String,

    /// Language name to percentage (0.0 - 100.0), ordered by name
    pub language_stats: BTreeMap<String, f64>,
}

impl RepositoryDetails {
    /// Returns true if neither owner nor language stats were found
    pub fn is_empty(&self) -> bool {
        self.owner.is_empty() && self.language_stats.is_empty()
    }
}

/// A repository search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryResult {
    /// Absolute URL of the repository page
    pub url: String,

    /// Extracted details, serialized under `extra`
    #[serde(rename = "extra")]
    pub details: RepositoryDetails,
}

impl RepositoryResult {
    /// Creates a result from a URL and its extracted details
    pub fn new(url: impl Into<String>, details: RepositoryDetails) -> Self {
        Self {
            url: url.into(),
            details,
        }
    }

    /// Creates a degraded result with empty owner and language stats
    pub fn degraded(url: impl Into<String>) -> Self {
        Self::new(url, RepositoryDetails::default())
    }
}

/// An issue or wiki search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleResult {
    /// Absolute URL of the result
    pub url: String,
}

/// One record of a search's output
///
/// Serialized without a tag: repositories as `{url, extra: {owner, language_stats}}`,
/// everything else as `{url}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResult {
    Repository(RepositoryResult),
    Link(SimpleResult),
}

impl SearchResult {
    /// Returns the result URL
    pub fn url(&self) -> &str {
        match self {
            Self::Repository(repo) => &repo.url,
            Self::Link(link) => &link.url,
        }
    }

    /// Returns the repository details, if this is a repository result
    pub fn as_repository(&self) -> Option<&RepositoryResult> {
        match self {
            Self::Repository(repo) => Some(repo),
            Self::Link(_) => None,
        }
    }
}
