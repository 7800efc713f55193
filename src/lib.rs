//! shelf - Personal book tracker
//!
//! Search a public book catalog, give books a reading status and keep
//! them on shelves: currently reading, read, want to read and wishlist.
//!
//! # Architecture
//!
//! The library is one owned store object:
//! - The canonical list of library entries lives in [`LibraryStore`]
//! - Every change replaces the list and writes it to a key-value store
//! - Shelves are filters over the list, recomputed on every read
//! - Recommendations are a separate list fetched by random subject
//!
//! # Modules
//!
//! - `adapters`: Book catalog integrations (Google Books)
//! - `storage`: Key-value persistence (files, memory)
//! - `library`: Library store, recommendations, shelf queries
//! - `domain`: Data structures (CatalogEntry, LibraryEntry)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Find a book and shelve the first hit
//! shelf search "dune"
//! shelf add "dune frank herbert" --status want
//!
//! # Move it along
//! shelf set-status <id> reading
//! shelf wishlist <id>
//!
//! # Browse
//! shelf list --shelf reading --by author
//! shelf recommend --subject poetry
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod library;
pub mod storage;

#[cfg(test)]
mod testing;

// Re-export main types at crate root for convenience
pub use adapters::{GoogleBooksClient, SearchError, SearchProvider, SearchRequest};
pub use domain::{BookDetails, CatalogEntry, LibraryEntry, Ownership, ReadingStatus};
pub use library::{LibraryStore, RecommendationCache, RefreshOutcome, ShelfQuery};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
