//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shelf::config::{LibrarySettings, RecommendationSettings};
use shelf::{
    CatalogEntry, KeyValueStore, LibraryStore, RecommendationCache, SearchError, SearchProvider,
    SearchRequest,
};

/// Catalog with a switchable canned answer
pub struct FakeCatalog {
    results: Mutex<Option<Vec<CatalogEntry>>>,
    pub requests: Mutex<Vec<SearchRequest>>,
}

impl FakeCatalog {
    pub fn returning(results: Vec<CatalogEntry>) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(Some(results)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set_results(&self, results: Option<Vec<CatalogEntry>>) {
        *self.results.lock().unwrap() = results;
    }
}

#[async_trait]
impl SearchProvider for FakeCatalog {
    fn name(&self) -> &str {
        "fake"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CatalogEntry>, SearchError> {
        self.requests.lock().unwrap().push(request.clone());

        match &*self.results.lock().unwrap() {
            Some(results) => Ok(results.clone()),
            None => Err(SearchError::Status {
                status: 500,
                body: "simulated outage".to_string(),
            }),
        }
    }
}

pub fn dune() -> CatalogEntry {
    CatalogEntry::new("Dune")
        .with_id("b1")
        .with_authors(["Frank Herbert"])
}

pub fn recommendation_settings() -> RecommendationSettings {
    RecommendationSettings {
        subjects: vec!["fantasy".to_string()],
        max_results: 10,
        delay_ms: 10,
    }
}

/// Store over the given backend and catalog, not yet loaded
pub fn build_store(
    storage: Arc<dyn KeyValueStore>,
    catalog: Arc<FakeCatalog>,
) -> LibraryStore {
    let recommendations = Arc::new(RecommendationCache::new(
        catalog,
        storage.clone(),
        recommendation_settings(),
    ));
    LibraryStore::new(storage, recommendations, LibrarySettings::default())
}
