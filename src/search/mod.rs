//! Search domain types
//!
//! This module defines what a search asks for (a [`SearchRequest`] over a
//! [`Category`]) and what it produces ([`SearchResult`] records).

mod category;
mod request;
mod result;

pub use category::Category;
pub use request::SearchRequest;
pub use result::{RepositoryDetails, RepositoryResult, SearchResult, SimpleResult};
