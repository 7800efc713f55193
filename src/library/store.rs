//! Canonical library list with reading status and ownership.
//!
//! The store is the single owner of the list. Every mutation replaces the
//! whole list and writes it to the `books` key; persistence failures are
//! logged and the in-memory list stays authoritative for the session.

use std::sync::{Arc, PoisonError, RwLock};

use rand::Rng;
use tracing::{debug, info, warn};

use super::recommendations::RecommendationCache;
use crate::config::LibrarySettings;
use crate::domain::{now_millis, CatalogEntry, LibraryEntry, Ownership, ReadingStatus};
use crate::storage::{KeyValueStore, BOOKS_KEY};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// ID for a book the catalog did not assign one to: `<millis>-<7 base36 chars>`
pub fn synthesize_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..7)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();

    format!("{}-{}", now_millis(), suffix)
}

/// The user's library
pub struct LibraryStore {
    storage: Arc<dyn KeyValueStore>,
    recommendations: Arc<RecommendationCache>,
    settings: LibrarySettings,
    books: RwLock<Arc<Vec<LibraryEntry>>>,
}

impl LibraryStore {
    /// Create an empty store; call [`LibraryStore::load_on_startup`] next
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        recommendations: Arc<RecommendationCache>,
        settings: LibrarySettings,
    ) -> Self {
        Self {
            storage,
            recommendations,
            settings,
            books: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Load the saved library and recommendations.
    ///
    /// A missing, unreadable or corrupt library starts out empty.
    pub async fn load_on_startup(&self) {
        let books = match self.storage.get(BOOKS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<LibraryEntry>>(&raw) {
                Ok(books) => books,
                Err(e) => {
                    warn!(error = %e, "Saved library is not valid JSON, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("No saved library, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read saved library, starting empty");
                Vec::new()
            }
        };

        info!(count = books.len(), "Library loaded");
        *self.books.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(books);

        self.recommendations.load().await;
    }

    /// Write the current list again (shutdown hook)
    pub async fn flush(&self) {
        let snapshot = self.entries();
        self.persist(&snapshot).await;
    }

    /// Recommendation list this store promotes entries from
    pub fn recommendations(&self) -> &Arc<RecommendationCache> {
        &self.recommendations
    }

    /// Current snapshot of every entry
    pub fn entries(&self) -> Arc<Vec<LibraryEntry>> {
        Arc::clone(&self.books.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Get an entry by ID
    pub fn get(&self, id: &str) -> Option<LibraryEntry> {
        self.entries().iter().find(|b| b.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Entries with the given reading status
    pub fn with_status(&self, status: ReadingStatus) -> Vec<LibraryEntry> {
        self.filtered(|b| b.status == status)
    }

    pub fn currently_reading(&self) -> Vec<LibraryEntry> {
        self.with_status(ReadingStatus::Reading)
    }

    pub fn read_books(&self) -> Vec<LibraryEntry> {
        self.with_status(ReadingStatus::Read)
    }

    pub fn want_to_read(&self) -> Vec<LibraryEntry> {
        self.with_status(ReadingStatus::WantToRead)
    }

    pub fn wishlist(&self) -> Vec<LibraryEntry> {
        self.filtered(LibraryEntry::is_wishlisted)
    }

    /// Reading status of an entry, `None` if it is not in the library
    pub fn get_status(&self, id: &str) -> Option<ReadingStatus> {
        self.entries().iter().find(|b| b.id == id).map(|b| b.status)
    }

    pub fn is_wishlisted(&self, id: &str) -> bool {
        self.entries()
            .iter()
            .any(|b| b.id == id && b.is_wishlisted())
    }

    /// Shelve a catalog book with a status, returning the ID it is stored under.
    ///
    /// A shelved book with the same title and author list only has its
    /// status updated. Otherwise an entry with the same ID is refreshed in
    /// place (keeping a wishlist marking), or a new owned entry is added.
    pub async fn add_or_update(&self, book: &CatalogEntry, status: ReadingStatus) -> String {
        let id = book
            .catalog_id()
            .map(str::to_string)
            .unwrap_or_else(synthesize_id);
        let merge_by_title = self.settings.merge_by_title;

        let changed = self.apply(|books| {
            if merge_by_title {
                if let Some(existing) = books.iter_mut().find(|b| b.details.same_work_as(&book.details)) {
                    existing.status = status;
                    return Some(existing.id.clone());
                }
            }

            if let Some(existing) = books.iter_mut().find(|b| b.id == id) {
                existing.details = book.details.clone();
                existing.status = status;
                if !existing.is_wishlisted() {
                    existing.mark_owned();
                }
                return Some(id.clone());
            }

            books.push(LibraryEntry::from_catalog(
                book,
                id.clone(),
                status,
                Some(Ownership::Owned),
            ));
            Some(id.clone())
        });

        match changed {
            Some((stored_id, snapshot)) => {
                info!(id = %stored_id, title = %book.title(), %status, "Book shelved");
                self.persist(&snapshot).await;
                stored_id
            }
            None => id,
        }
    }

    /// Remove an entry. Returns false if it was not in the library.
    pub async fn remove(&self, id: &str) -> bool {
        let changed = self.apply(|books| {
            let before = books.len();
            books.retain(|b| b.id != id);
            (books.len() != before).then_some(())
        });

        self.commit(changed, id, "Book removed").await
    }

    /// Change an entry's status and mark it owned.
    ///
    /// Unknown IDs that match a recommendation shelve that recommendation.
    pub async fn update_status(&self, id: &str, status: ReadingStatus) -> bool {
        if id.is_empty() {
            return false;
        }
        let recommended = self.recommendations.find(id);

        let changed = self.apply(|books| {
            if let Some(existing) = books.iter_mut().find(|b| b.id == id) {
                existing.status = status;
                existing.mark_owned();
                return Some(());
            }

            let book = recommended?;
            books.push(LibraryEntry::from_catalog(
                &book,
                id,
                status,
                Some(Ownership::Owned),
            ));
            Some(())
        });

        self.commit(changed, id, "Status updated").await
    }

    /// Flip an entry's wishlist marking without touching its status.
    ///
    /// Unknown IDs that match a recommendation are added as wishlisted
    /// want-to-read entries.
    pub async fn toggle_wishlist(&self, id: &str) -> bool {
        if id.is_empty() {
            return false;
        }
        let recommended = self.recommendations.find(id);

        let changed = self.apply(|books| {
            if let Some(existing) = books.iter_mut().find(|b| b.id == id) {
                existing.toggle_wishlist();
                return Some(());
            }

            let book = recommended?;
            books.push(LibraryEntry::from_catalog(
                &book,
                id,
                ReadingStatus::WantToRead,
                Some(Ownership::Wishlist),
            ));
            Some(())
        });

        self.commit(changed, id, "Wishlist toggled").await
    }

    fn filtered(&self, keep: impl Fn(&LibraryEntry) -> bool) -> Vec<LibraryEntry> {
        self.entries().iter().filter(|b| keep(b)).cloned().collect()
    }

    /// Apply a change to a copy of the list and swap it in.
    ///
    /// `change` returns `None` to leave the list as it was.
    fn apply<R>(
        &self,
        change: impl FnOnce(&mut Vec<LibraryEntry>) -> Option<R>,
    ) -> Option<(R, Arc<Vec<LibraryEntry>>)> {
        let mut current = self.books.write().unwrap_or_else(PoisonError::into_inner);

        let mut next = current.as_ref().clone();
        let result = change(&mut next)?;

        let next = Arc::new(next);
        *current = Arc::clone(&next);
        Some((result, next))
    }

    async fn commit(&self, changed: Option<((), Arc<Vec<LibraryEntry>>)>, id: &str, what: &str) -> bool {
        match changed {
            Some((_, snapshot)) => {
                info!(id, "{}", what);
                self.persist(&snapshot).await;
                true
            }
            None => {
                debug!(id, "No matching book, nothing to do");
                false
            }
        }
    }

    async fn persist(&self, books: &[LibraryEntry]) {
        let json = match serde_json::to_string(books) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize library");
                return;
            }
        };

        if let Err(e) = self.storage.set(BOOKS_KEY, &json).await {
            warn!(error = %e, "Failed to save library, keeping changes in memory");
        }
    }
}
