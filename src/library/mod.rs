//! The user's book library.
//!
//! - `store`: canonical list of library entries and the operations on it
//! - `recommendations`: suggestions fetched from the catalog by subject
//! - `query`: shelf filtering, sorting and facet listing
//!
//! Both lists are held as `Arc<Vec<_>>` snapshots. A mutation builds a new
//! vector, swaps it in, then writes the whole list to the key-value store,
//! so readers never observe a half-applied change.

pub mod query;
pub mod recommendations;
pub mod store;

pub use query::{facet_values, FilterField, ShelfQuery, SortOrder};
pub use recommendations::{RecommendationCache, RefreshOutcome};
pub use store::LibraryStore;
