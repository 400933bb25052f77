//! Search categories supported by the crawler
//!
//! Each category maps to one `type` value of the site's search endpoint.

use crate::TrawlError;
use std::fmt;
use std::str::FromStr;

/// The scope of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Repository search; every result page is fetched for details
    #[default]
    Repositories,

    /// Issue search; result links only
    Issues,

    /// Wiki search; result links only
    Wikis,
}

impl Category {
    /// Returns all supported categories
    pub const ALL: [Category; 3] = [Self::Repositories, Self::Issues, Self::Wikis];

    /// Returns the display name, as accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repositories => "Repositories",
            Self::Issues => "Issues",
            Self::Wikis => "Wikis",
        }
    }

    /// Returns the value sent as the search `type` query parameter
    pub fn query_value(&self) -> &'static str {
        match self {
            Self::Repositories => "repositories",
            Self::Issues => "issues",
            Self::Wikis => "wikis",
        }
    }

    /// Returns true if results of this category are fetched for details
    pub fn fetches_details(&self) -> bool {
        matches!(self, Self::Repositories)
    }
}

impl FromStr for Category {
    type Err = TrawlError;

    /// Parses a category from its display name
    ///
    /// Matching is exact: `"repositories"` is rejected just like `"NotACategory"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| TrawlError::UnsupportedCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
