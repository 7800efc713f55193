//! Test doubles shared by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::adapters::{SearchError, SearchProvider, SearchRequest};
use crate::domain::CatalogEntry;

/// Search provider with a canned answer that records every request
pub struct StubProvider {
    results: Option<Vec<CatalogEntry>>,
    requests: Arc<Mutex<Vec<SearchRequest>>>,
}

impl StubProvider {
    pub fn returning(results: Vec<CatalogEntry>) -> Self {
        Self {
            results: Some(results),
            requests: Arc::default(),
        }
    }

    /// Every search fails with a 503
    pub fn failing() -> Self {
        Self {
            results: None,
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<SearchRequest>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl SearchProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CatalogEntry>, SearchError> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.results {
            Some(results) => Ok(results.clone()),
            None => Err(SearchError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
        }
    }
}
