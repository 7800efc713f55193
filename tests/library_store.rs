//! Library Store Integration Tests
//!
//! Reconciliation rules for shelving, status changes, wishlist toggling
//! and removal.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{build_store, dune, FakeCatalog};
use shelf::{CatalogEntry, LibraryStore, MemoryStore, Ownership, ReadingStatus};

async fn empty_store() -> LibraryStore {
    let store = build_store(Arc::new(MemoryStore::new()), FakeCatalog::returning(Vec::new()));
    store.load_on_startup().await;
    store
}

/// Store whose recommendation list holds `books`
async fn store_with_recommendations(books: Vec<CatalogEntry>) -> LibraryStore {
    let store = build_store(Arc::new(MemoryStore::new()), FakeCatalog::returning(books));
    store.load_on_startup().await;
    assert!(store.recommendations().refresh().await.is_refreshed());
    store
}

fn assert_unique_ids(store: &LibraryStore) {
    let entries = store.entries();
    let ids: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), entries.len(), "duplicate IDs in {:?}", entries);
}

#[tokio::test]
async fn test_dune_wishlist_scenario() {
    let store = empty_store().await;

    store.add_or_update(&dune(), ReadingStatus::WantToRead).await;
    assert_eq!(store.get_status("b1"), Some(ReadingStatus::WantToRead));
    assert!(!store.is_wishlisted("b1"));

    store.toggle_wishlist("b1").await;
    assert!(store.is_wishlisted("b1"));
    assert_eq!(store.get_status("b1"), Some(ReadingStatus::WantToRead));

    // Changing status forces ownership back to owned
    store.update_status("b1", ReadingStatus::Read).await;
    assert_eq!(store.get_status("b1"), Some(ReadingStatus::Read));
    assert!(!store.is_wishlisted("b1"));
    assert_eq!(store.get("b1").unwrap().ownership, Some(Ownership::Owned));
}

#[tokio::test]
async fn test_toggle_wishlist_twice_restores_ownership() {
    let store = empty_store().await;
    store.add_or_update(&dune(), ReadingStatus::Reading).await;
    let original = store.get("b1").unwrap().ownership;

    assert!(store.toggle_wishlist("b1").await);
    assert!(store.is_wishlisted("b1"));

    assert!(store.toggle_wishlist("b1").await);
    assert!(!store.is_wishlisted("b1"));
    assert_eq!(store.get("b1").unwrap().ownership, original);
    assert_eq!(store.get_status("b1"), Some(ReadingStatus::Reading));
}

#[tokio::test]
async fn test_get_status_after_update_status() {
    let store = empty_store().await;
    store.add_or_update(&dune(), ReadingStatus::WantToRead).await;

    for status in ReadingStatus::ALL {
        assert!(store.update_status("b1", status).await);
        assert_eq!(store.get_status("b1"), Some(status));
    }
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let store = empty_store().await;
    store.add_or_update(&dune(), ReadingStatus::Reading).await;

    assert!(store.remove("b1").await);
    assert_eq!(store.get_status("b1"), None);

    assert!(!store.remove("b1").await);
    assert!(!store.remove("never-added").await);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_same_title_and_authors_only_updates_status() {
    let store = empty_store().await;
    store.add_or_update(&dune(), ReadingStatus::WantToRead).await;
    store.toggle_wishlist("b1").await;
    let before = store.get("b1").unwrap();

    // Another edition with no catalog ID
    let reprint = CatalogEntry::new("Dune").with_authors(["Frank Herbert"]);
    let id = store.add_or_update(&reprint, ReadingStatus::Reading).await;

    assert_eq!(id, "b1");
    assert_eq!(store.len(), 1);
    let after = store.get("b1").unwrap();
    assert_eq!(after.status, ReadingStatus::Reading);
    assert_eq!(after.ownership, before.ownership);
    assert_eq!(after.added_at, before.added_at);
}

#[tokio::test]
async fn test_different_author_list_is_a_different_book() {
    let store = empty_store().await;
    store.add_or_update(&dune(), ReadingStatus::Read).await;

    let sequel = CatalogEntry::new("Dune")
        .with_id("b9")
        .with_authors(["Frank Herbert", "Brian Herbert"]);
    store.add_or_update(&sequel, ReadingStatus::WantToRead).await;

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("b9").unwrap().ownership, Some(Ownership::Owned));
}

#[tokio::test]
async fn test_update_status_promotes_recommendation() {
    let pick = CatalogEntry::new("The Name of the Wind")
        .with_id("r1")
        .with_authors(["Patrick Rothfuss"]);
    let store = store_with_recommendations(vec![pick.clone()]).await;

    assert!(store.update_status("r1", ReadingStatus::Reading).await);

    let entry = store.get("r1").unwrap();
    assert_eq!(entry.details, pick.details);
    assert_eq!(entry.status, ReadingStatus::Reading);
    assert_eq!(entry.ownership, Some(Ownership::Owned));
    assert!(entry.added_at > 0);

    // The recommendation itself is left alone
    assert_eq!(store.recommendations().find("r1"), Some(pick));
}

#[tokio::test]
async fn test_toggle_wishlist_promotes_recommendation() {
    let store = store_with_recommendations(vec![CatalogEntry::new("Mistborn").with_id("r2")]).await;

    assert!(store.toggle_wishlist("r2").await);

    let entry = store.get("r2").unwrap();
    assert_eq!(entry.status, ReadingStatus::WantToRead);
    assert_eq!(entry.ownership, Some(Ownership::Wishlist));

    // Second toggle acts on the library entry, leaving ownership unset
    assert!(store.toggle_wishlist("r2").await);
    assert_eq!(store.get("r2").unwrap().ownership, None);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_unknown_ids_are_no_ops() {
    let store = store_with_recommendations(vec![CatalogEntry::new("Mistborn").with_id("r2")]).await;

    assert!(!store.update_status("nope", ReadingStatus::Read).await);
    assert!(!store.toggle_wishlist("nope").await);
    assert!(!store.is_wishlisted("nope"));
    assert_eq!(store.get_status("nope"), None);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_derived_shelves() {
    let store = empty_store().await;

    store
        .add_or_update(&CatalogEntry::new("A").with_id("a"), ReadingStatus::Reading)
        .await;
    store
        .add_or_update(&CatalogEntry::new("B").with_id("b"), ReadingStatus::Read)
        .await;
    store
        .add_or_update(&CatalogEntry::new("C").with_id("c"), ReadingStatus::WantToRead)
        .await;
    store
        .add_or_update(&CatalogEntry::new("D").with_id("d"), ReadingStatus::WantToRead)
        .await;
    store.toggle_wishlist("d").await;

    let ids = |entries: Vec<shelf::LibraryEntry>| -> Vec<String> {
        entries.into_iter().map(|e| e.id).collect()
    };

    assert_eq!(ids(store.currently_reading()), vec!["a"]);
    assert_eq!(ids(store.read_books()), vec!["b"]);
    assert_eq!(ids(store.want_to_read()), vec!["c", "d"]);
    assert_eq!(ids(store.wishlist()), vec!["d"]);
}

#[tokio::test]
async fn test_ids_stay_unique_across_mixed_operations() {
    let store = store_with_recommendations(vec![
        CatalogEntry::new("Rec A").with_id("id-1"),
        CatalogEntry::new("Rec B").with_id("id-4"),
    ])
    .await;

    let titles = ["Dune", "Emma", "Dune"];
    let authors = [vec!["Frank Herbert"], vec!["Jane Austen"], vec!["Someone Else"]];

    // Small LCG so the sequence is varied but reproducible
    let mut seed: u64 = 42;
    let mut next = |bound: u64| {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) % bound
    };

    for _ in 0..300 {
        let id = format!("id-{}", next(6));
        let status = ReadingStatus::ALL[next(3) as usize];

        match next(5) {
            0 | 1 => {
                let which = next(3) as usize;
                let mut book = CatalogEntry::new(titles[which]).with_authors(authors[which].clone());
                if next(4) != 0 {
                    book = book.with_id(id);
                }
                store.add_or_update(&book, status).await;
            }
            2 => {
                store.update_status(&id, status).await;
            }
            3 => {
                store.toggle_wishlist(&id).await;
            }
            _ => {
                store.remove(&id).await;
            }
        }

        assert_unique_ids(&store);
    }
}
