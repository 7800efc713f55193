//! Adapter interfaces for external book catalogs.
//!
//! The library only depends on the [`SearchProvider`] trait; the Google
//! Books client is the one concrete catalog.

pub mod google_books;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::CatalogEntry;

// Re-export the Google Books adapter
pub use google_books::GoogleBooksClient;

/// Result ordering requested from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    /// Catalog's own relevance ranking
    #[default]
    Relevance,

    /// Most recently published first
    Newest,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Relevance => "relevance",
            OrderBy::Newest => "newest",
        }
    }
}

/// A catalog query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text or field-qualified query ("dune", "subject:fantasy", "isbn:...")
    pub query: String,

    /// Upper bound on returned entries (provider default when unset)
    pub max_results: Option<u32>,

    pub order_by: OrderBy,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: None,
            order_by: OrderBy::Relevance,
        }
    }

    /// Bound the number of results
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Ask for the newest publications first
    pub fn newest_first(mut self) -> Self {
        self.order_by = OrderBy::Newest;
        self
    }
}

/// Errors a catalog lookup can fail with
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search query is empty")]
    EmptyQuery,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed catalog response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A book catalog that can be searched
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Run a query. An empty result set is `Ok(vec![])`, not an error.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<CatalogEntry>, SearchError>;
}
