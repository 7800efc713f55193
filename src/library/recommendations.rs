//! Catalog suggestions drawn from a random subject.
//!
//! The list is fetched once per session, replaced wholesale on success and
//! left untouched on failure. It is persisted under its own key so the last
//! good set survives restarts.

use std::sync::{Arc, PoisonError, RwLock};

use rand::seq::SliceRandom;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::adapters::{SearchProvider, SearchRequest};
use crate::config::RecommendationSettings;
use crate::domain::CatalogEntry;
use crate::storage::{KeyValueStore, RECOMMENDATIONS_KEY};

/// What a refresh did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The list was replaced
    Refreshed { subject: String, count: usize },

    /// The fetch failed; the previous list is kept
    Failed { subject: String, error: String },

    /// No subjects configured, nothing fetched
    NoSubjects,
}

impl RefreshOutcome {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, Self::Refreshed { .. })
    }
}

/// Session-scoped recommendation list
pub struct RecommendationCache {
    provider: Arc<dyn SearchProvider>,
    storage: Arc<dyn KeyValueStore>,
    settings: RecommendationSettings,
    entries: RwLock<Arc<Vec<CatalogEntry>>>,
}

impl RecommendationCache {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        storage: Arc<dyn KeyValueStore>,
        settings: RecommendationSettings,
    ) -> Self {
        Self {
            provider,
            storage,
            settings,
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn settings(&self) -> &RecommendationSettings {
        &self.settings
    }

    /// Restore the last persisted list. Failures leave the list empty.
    pub async fn load(&self) {
        let raw = match self.storage.get(RECOMMENDATIONS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No saved recommendations");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read saved recommendations");
                return;
            }
        };

        match serde_json::from_str::<Vec<CatalogEntry>>(&raw) {
            Ok(entries) => {
                debug!(count = entries.len(), "Loaded saved recommendations");
                self.replace(entries);
            }
            Err(e) => warn!(error = %e, "Saved recommendations are not valid JSON, ignoring"),
        }
    }

    /// Current snapshot
    pub fn entries(&self) -> Arc<Vec<CatalogEntry>> {
        Arc::clone(&self.entries.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Find a recommendation by catalog ID
    pub fn find(&self, id: &str) -> Option<CatalogEntry> {
        self.entries()
            .iter()
            .find(|entry| entry.catalog_id() == Some(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Pick one configured subject at random
    pub fn pick_subject(&self) -> Option<String> {
        self.settings
            .subjects
            .choose(&mut rand::thread_rng())
            .cloned()
    }

    /// Fetch suggestions for a random subject
    pub async fn refresh(&self) -> RefreshOutcome {
        match self.pick_subject() {
            Some(subject) => self.refresh_subject(&subject).await,
            None => {
                warn!("No recommendation subjects configured");
                RefreshOutcome::NoSubjects
            }
        }
    }

    /// Fetch suggestions for one subject, newest first
    pub async fn refresh_subject(&self, subject: &str) -> RefreshOutcome {
        let request = SearchRequest::new(format!("subject:{}", subject))
            .with_max_results(self.settings.max_results)
            .newest_first();

        match self.provider.search(&request).await {
            Ok(entries) => {
                let count = entries.len();
                let snapshot = self.replace(entries);
                self.persist(&snapshot).await;

                info!(subject, count, "Recommendations refreshed");
                RefreshOutcome::Refreshed {
                    subject: subject.to_string(),
                    count,
                }
            }
            Err(e) => {
                warn!(
                    subject,
                    provider = self.provider.name(),
                    error = %e,
                    "Could not fetch recommendations, keeping previous list"
                );
                RefreshOutcome::Failed {
                    subject: subject.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Run one refresh after the configured startup delay
    pub fn spawn_initial_refresh(self: &Arc<Self>) -> JoinHandle<RefreshOutcome> {
        let cache = Arc::clone(self);
        let delay = self.settings.delay();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            cache.refresh().await
        })
    }

    fn replace(&self, entries: Vec<CatalogEntry>) -> Arc<Vec<CatalogEntry>> {
        let snapshot = Arc::new(entries);
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        snapshot
    }

    async fn persist(&self, entries: &[CatalogEntry]) {
        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize recommendations");
                return;
            }
        };

        if let Err(e) = self.storage.set(RECOMMENDATIONS_KEY, &json).await {
            warn!(error = %e, "Failed to save recommendations");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::StubProvider;

    fn cache_with(provider: StubProvider, subjects: &[&str]) -> RecommendationCache {
        RecommendationCache::new(
            Arc::new(provider),
            Arc::new(MemoryStore::new()),
            RecommendationSettings {
                subjects: subjects.iter().map(|s| s.to_string()).collect(),
                max_results: 10,
                delay_ms: 0,
            },
        )
    }

    #[tokio::test]
    async fn test_refresh_sends_subject_query() {
        let provider = StubProvider::returning(vec![CatalogEntry::new("Poems").with_id("p1")]);
        let requests = provider.requests();
        let cache = cache_with(provider, &["poetry"]);

        let outcome = cache.refresh().await;

        assert_eq!(
            outcome,
            RefreshOutcome::Refreshed {
                subject: "poetry".to_string(),
                count: 1
            }
        );
        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].query, "subject:poetry");
        assert_eq!(sent[0].max_results, Some(10));
        assert_eq!(sent[0].order_by, crate::adapters::OrderBy::Newest);
    }

    #[tokio::test]
    async fn test_no_subjects() {
        let cache = cache_with(StubProvider::returning(Vec::new()), &[]);
        assert_eq!(cache.refresh().await, RefreshOutcome::NoSubjects);
    }

    #[tokio::test]
    async fn test_find_ignores_entries_without_ids() {
        let cache = cache_with(
            StubProvider::returning(vec![
                CatalogEntry::new("No id"),
                CatalogEntry::new("Has id").with_id("r2"),
            ]),
            &["fiction"],
        );
        cache.refresh().await;

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.find("r2").unwrap().title(), "Has id");
        assert!(cache.find("").is_none());
    }
}
