use crate::search::Category;

/// An immutable search over one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    keywords: Vec<String>,
    category: Category,
}

impl SearchRequest {
    /// Creates a new search request
    pub fn new(keywords: Vec<String>, category: Category) -> Self {
        Self { keywords, category }
    }

    /// Returns the keywords in order
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns the search category
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns true if there is nothing to search for
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Returns the `q` query value: keywords joined with `+`
    pub fn query(&self) -> String {
        self.keywords.join("+")
    }
}
