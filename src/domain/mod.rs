//! Domain types for the book tracker.
//!
//! - Book: catalog records returned by the search provider
//! - Entry: library entries with reading status and ownership

pub mod book;
pub mod entry;

// Re-export commonly used types
pub use book::{BookDetails, CatalogEntry};
pub use entry::{now_millis, LibraryEntry, Ownership, ReadingStatus};
