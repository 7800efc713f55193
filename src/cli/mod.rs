//! Command-line interface for shelf.
//!
//! Provides commands for searching the catalog, shelving books, changing
//! reading status, managing the wishlist, listing shelves and browsing
//! recommendations.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::adapters::{GoogleBooksClient, SearchProvider, SearchRequest};
use crate::config::{self, ResolvedConfig};
use crate::domain::{CatalogEntry, LibraryEntry, ReadingStatus};
use crate::library::{
    facet_values, FilterField, LibraryStore, RecommendationCache, RefreshOutcome, ShelfQuery,
};
use crate::storage::FileStore;

/// shelf - personal book tracker
#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the book catalog
    Search {
        /// Title, author or free text
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Look up a book by ISBN
    Isbn {
        /// ISBN-10 or ISBN-13 (separators allowed)
        isbn: String,

        /// Shelve the book with this status
        #[arg(short, long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Search the catalog and shelve a result
    Add {
        /// Search query
        query: String,

        /// Reading status to assign
        #[arg(short, long, value_enum)]
        status: StatusArg,

        /// Which search result to shelve (1-based)
        #[arg(short, long, default_value = "1")]
        pick: usize,
    },

    /// Remove a book from the library
    Remove {
        /// Book ID
        id: String,
    },

    /// Show the reading status of a book
    Status {
        /// Book ID
        id: String,
    },

    /// Change the reading status of a book (marks it owned)
    SetStatus {
        /// Book ID (library entry or recommendation)
        id: String,

        /// New reading status
        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Put a book on the wishlist or take it off
    Wishlist {
        /// Book ID (library entry or recommendation)
        id: String,
    },

    /// Show details of a library book
    Show {
        /// Book ID
        id: String,
    },

    /// List shelves
    List {
        /// Which shelf to show
        #[arg(short, long, value_enum, default_value = "all")]
        shelf: ShelfArg,

        /// Field to filter and sort by
        #[arg(short, long, value_enum)]
        by: Option<FieldArg>,

        /// Value the field must match
        #[arg(short, long, requires = "by")]
        value: Option<String>,

        /// Sort Z-A
        #[arg(long)]
        desc: bool,
    },

    /// List the distinct values of a field across the library
    Facets {
        #[arg(value_enum)]
        field: FieldArg,
    },

    /// Show book recommendations (fetches a fresh set each run)
    Recommend {
        /// Show the saved list without fetching
        #[arg(short, long)]
        cached: bool,

        /// Fetch for this subject instead of a random one
        #[arg(long)]
        subject: Option<String>,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Reading status for CLI (maps to ReadingStatus)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    /// Currently reading
    Reading,

    /// Finished
    Read,

    /// Want to read
    Want,
}

impl From<StatusArg> for ReadingStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Reading => ReadingStatus::Reading,
            StatusArg::Read => ReadingStatus::Read,
            StatusArg::Want => ReadingStatus::WantToRead,
        }
    }
}

/// Shelf selection for `list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShelfArg {
    All,
    Reading,
    Want,
    Wishlist,
    Read,
}

/// Filter field for CLI (maps to FilterField)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FieldArg {
    Genre,
    Author,
    Title,
    Year,
}

impl From<FieldArg> for FilterField {
    fn from(f: FieldArg) -> Self {
        match f {
            FieldArg::Genre => FilterField::Genre,
            FieldArg::Author => FilterField::Author,
            FieldArg::Title => FilterField::Title,
            FieldArg::Year => FilterField::ReleaseYear,
        }
    }
}

/// Store and catalog client wired from configuration
struct Session {
    store: Arc<LibraryStore>,
    catalog: Arc<GoogleBooksClient>,
}

impl Session {
    async fn open(cfg: &ResolvedConfig) -> Result<Self> {
        let storage = Arc::new(FileStore::new(&cfg.data));
        let catalog = Arc::new(GoogleBooksClient::from_settings(&cfg.search)?);

        let recommendations = Arc::new(RecommendationCache::new(
            catalog.clone(),
            storage.clone(),
            cfg.recommendations.clone(),
        ));
        let store = Arc::new(LibraryStore::new(
            storage,
            recommendations,
            cfg.library.clone(),
        ));
        store.load_on_startup().await;

        Ok(Self { store, catalog })
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::config()?;

        match self.command {
            Commands::Config => show_config(cfg),
            command => {
                let session = Session::open(cfg).await?;
                run(&session, command).await
            }
        }
    }
}

/// Run a command that needs the library
async fn run(session: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::Search { query, limit } => search(session, &query, limit).await,
        Commands::Isbn { isbn, status } => lookup_isbn(session, &isbn, status).await,
        Commands::Add {
            query,
            status,
            pick,
        } => add_book(session, &query, status.into(), pick).await,
        Commands::Remove { id } => remove_book(session, &id).await,
        Commands::Status { id } => show_status(session, &id),
        Commands::SetStatus { id, status } => set_status(session, &id, status.into()).await,
        Commands::Wishlist { id } => toggle_wishlist(session, &id).await,
        Commands::Show { id } => show_book(session, &id),
        Commands::List {
            shelf,
            by,
            value,
            desc,
        } => {
            let mut query = ShelfQuery::new();
            if let Some(field) = by {
                query = match value {
                    Some(value) => query.filter_by(field.into(), value),
                    None => query.sort_by(field.into()),
                };
            }
            if desc {
                query = query.descending();
            }
            list_shelves(session, shelf, &query);
            Ok(())
        }
        Commands::Facets { field } => {
            list_facets(session, field.into());
            Ok(())
        }
        Commands::Recommend { cached, subject } => recommend(session, cached, subject).await,
        Commands::Config => show_config(config::config()?),
    }
}

/// Truncate for table display without splitting characters
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Status column for a catalog entry
fn status_label(store: &LibraryStore, id: Option<&str>) -> String {
    let Some(id) = id else {
        return "-".to_string();
    };

    let status = store
        .get_status(id)
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());

    if store.is_wishlisted(id) {
        format!("{} *", status)
    } else {
        status
    }
}

fn print_catalog_table(store: &LibraryStore, entries: &[CatalogEntry]) {
    println!("{:<14} {:<15} {:<40} {:<25}", "ID", "STATUS", "TITLE", "AUTHOR");
    println!("{}", "-".repeat(96));

    for entry in entries {
        println!(
            "{:<14} {:<15} {:<40} {:<25}",
            entry.catalog_id().unwrap_or("-"),
            status_label(store, entry.catalog_id()),
            truncate(entry.title(), 40),
            truncate(&entry.details.author_line(), 25)
        );
    }
}

fn print_library_table(entries: &[LibraryEntry]) {
    for entry in entries {
        let marker = if entry.is_wishlisted() { "*" } else { " " };
        println!(
            "  {} {:<22} {:<40} {:<25}",
            marker,
            truncate(&entry.id, 22),
            truncate(entry.title(), 40),
            truncate(&entry.details.author_line(), 25)
        );
    }
}

/// Search the catalog
async fn search(session: &Session, query: &str, limit: Option<u32>) -> Result<()> {
    let results = match limit {
        Some(limit) => {
            let query = query.trim();
            if query.is_empty() {
                anyhow::bail!("Please enter a search term");
            }
            session
                .catalog
                .search(&SearchRequest::new(query).with_max_results(limit))
                .await
        }
        None => session.catalog.search_text(query).await,
    }
    .context("Search failed")?;

    if results.is_empty() {
        println!("No books found for: {}", query.trim());
        return Ok(());
    }

    println!("Found {} book(s) for \"{}\":\n", results.len(), query.trim());
    print_catalog_table(&session.store, &results);

    Ok(())
}

/// Look up a book by ISBN and optionally shelve it
async fn lookup_isbn(session: &Session, isbn: &str, status: Option<StatusArg>) -> Result<()> {
    let book = session
        .catalog
        .lookup_isbn(isbn)
        .await
        .context("ISBN lookup failed")?
        .ok_or_else(|| anyhow::anyhow!("No book found for ISBN {}", isbn))?;

    print_catalog_table(&session.store, std::slice::from_ref(&book));

    if let Some(status) = status {
        let status: ReadingStatus = status.into();
        let id = session.store.add_or_update(&book, status).await;
        eprintln!("\nShelved \"{}\" as {} ({})", book.title(), status, id);
    }

    Ok(())
}

/// Search and shelve the N-th result
async fn add_book(session: &Session, query: &str, status: ReadingStatus, pick: usize) -> Result<()> {
    let results = session
        .catalog
        .search_text(query)
        .await
        .context("Search failed")?;

    let book = pick
        .checked_sub(1)
        .and_then(|index| results.get(index))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Result #{} not available ({} result(s) for \"{}\")",
                pick,
                results.len(),
                query.trim()
            )
        })?;

    let id = session.store.add_or_update(book, status).await;

    eprintln!("Shelved \"{}\" as {}", book.title(), status);
    eprintln!("   ID: {}", id);
    eprintln!("   Author: {}", book.details.author_line());

    Ok(())
}

async fn remove_book(session: &Session, id: &str) -> Result<()> {
    if session.store.remove(id).await {
        eprintln!("Removed {}", id);
    } else {
        eprintln!("{} is not in the library", id);
    }
    Ok(())
}

fn show_status(session: &Session, id: &str) -> Result<()> {
    match session.store.get_status(id) {
        Some(status) => {
            let wish = if session.store.is_wishlisted(id) {
                " (wishlist)"
            } else {
                ""
            };
            println!("{}{}", status, wish);
        }
        None => println!("none"),
    }
    Ok(())
}

async fn set_status(session: &Session, id: &str, status: ReadingStatus) -> Result<()> {
    if session.store.update_status(id, status).await {
        eprintln!("{} is now {}", id, status);
        Ok(())
    } else {
        anyhow::bail!("{} is neither in the library nor a current recommendation", id)
    }
}

async fn toggle_wishlist(session: &Session, id: &str) -> Result<()> {
    if !session.store.toggle_wishlist(id).await {
        anyhow::bail!("{} is neither in the library nor a current recommendation", id);
    }

    if session.store.is_wishlisted(id) {
        eprintln!("Added {} to the wishlist", id);
    } else {
        eprintln!("Removed {} from the wishlist", id);
    }
    Ok(())
}

/// Show details of a library book
fn show_book(session: &Session, id: &str) -> Result<()> {
    let entry = session
        .store
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Book not found: {}", id))?;
    let details = &entry.details;

    println!("{}", "=".repeat(60));
    println!("  ID: {}", entry.id);
    println!("  Title: {}", details.title);
    println!("  Author: {}", details.author_line());
    println!("  Status: {}", entry.status);
    if let Some(ownership) = entry.ownership {
        println!("  Ownership: {}", ownership);
    }
    if let Some(added) = entry.added_at_utc() {
        println!("  Added: {}", added.format("%Y-%m-%d %H:%M"));
    }
    let published: Vec<&str> = [details.publisher.as_deref(), details.published_date.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !published.is_empty() {
        println!("  Published: {}", published.join(", "));
    }
    if let Some(pages) = details.page_count {
        println!("  Pages: {}", pages);
    }
    if let Some(categories) = &details.categories {
        println!("  Genres: {}", categories.join(", "));
    }
    if let Some(rating) = details.average_rating {
        println!("  Rating: {:.1}", rating);
    }
    println!("{}", "=".repeat(60));

    if let Some(description) = &details.description {
        println!("\n{}", description);
    }

    Ok(())
}

/// List shelves in display order
fn list_shelves(session: &Session, shelf: ShelfArg, query: &ShelfQuery) {
    let store = &session.store;

    if store.is_empty() {
        println!("Library is empty. Use 'shelf add <query> --status <status>' to add books.");
        return;
    }

    let shelves = [
        (ShelfArg::Reading, "Currently reading", store.currently_reading()),
        (ShelfArg::Want, "Want to read", store.want_to_read()),
        (ShelfArg::Wishlist, "Wishlist", store.wishlist()),
        (ShelfArg::Read, "Read", store.read_books()),
    ];

    for (kind, title, entries) in shelves {
        if shelf != ShelfArg::All && shelf != kind {
            continue;
        }

        let entries = query.apply(&entries);
        println!("{} ({})", title, entries.len());
        print_library_table(&entries);
        println!();
    }

    println!("Total: {} books (* = wishlist)", store.len());
}

fn list_facets(session: &Session, field: FilterField) {
    let values = facet_values(field, &session.store.entries());

    if values.is_empty() {
        println!("No {} values in the library", field);
        return;
    }

    for value in values {
        println!("{}", value);
    }
}

/// The session's one recommendation fetch.
///
/// A failed fetch leaves the saved list in place, so callers always have
/// something to show.
async fn refresh_for_session(
    cache: &RecommendationCache,
    subject: Option<&str>,
    cached: bool,
) -> Option<RefreshOutcome> {
    if cached {
        return None;
    }

    let outcome = match subject {
        Some(subject) => cache.refresh_subject(subject).await,
        None => cache.refresh().await,
    };
    Some(outcome)
}

/// Fetch recommendations for this run, then show the current list
async fn recommend(session: &Session, cached: bool, subject: Option<String>) -> Result<()> {
    let cache = session.store.recommendations();
    let outcome = refresh_for_session(cache, subject.as_deref(), cached).await;

    match outcome {
        Some(RefreshOutcome::Refreshed { subject, count }) => {
            eprintln!("Fetched {} recommendation(s) for \"{}\"\n", count, subject);
        }
        Some(RefreshOutcome::Failed { subject, error }) => {
            eprintln!(
                "Could not fetch recommendations for \"{}\": {} (showing saved list)\n",
                subject, error
            );
        }
        Some(RefreshOutcome::NoSubjects) => {
            eprintln!("No recommendation subjects configured\n");
        }
        None => {}
    }

    let entries = cache.entries();
    if entries.is_empty() {
        println!("No recommendations available.");
        return Ok(());
    }

    print_catalog_table(&session.store, &entries);
    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("{}", "=".repeat(60));
    println!("  Shelf Configuration");
    println!("{}", "=".repeat(60));
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:            {}", cfg.home.display());
    println!("  Data:            {}", cfg.data.display());
    println!();
    println!("Search:");
    println!("  API:             {}", cfg.search.base_url);
    println!(
        "  API key:         {}",
        if cfg.search.api_key.is_some() { "(set)" } else { "(none)" }
    );
    println!("  Page size:       {}", cfg.search.max_results);
    println!("  Timeout:         {}s", cfg.search.timeout_seconds);
    println!();
    println!("Recommendations:");
    println!("  Subjects:        {}", cfg.recommendations.subjects.join(", "));
    println!("  Max results:     {}", cfg.recommendations.max_results);
    println!("  Startup delay:   {}ms", cfg.recommendations.delay_ms);
    println!();
    println!("Library:");
    println!("  Merge by title:  {}", cfg.library.merge_by_title);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecommendationSettings;
    use crate::storage::MemoryStore;
    use crate::testing::StubProvider;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Dune", 10), "Dune");
        assert_eq!(truncate("The Left Hand of Darkness", 10), "The Lef...");
        assert_eq!(truncate("Érdekes könyv", 8), "Érdek...");
    }

    #[test]
    fn test_cli_parses_list_filters() {
        let cli = Cli::parse_from([
            "shelf", "list", "--shelf", "read", "--by", "author", "--value", "Jane Austen", "--desc",
        ]);

        match cli.command {
            Commands::List {
                shelf,
                by,
                value,
                desc,
            } => {
                assert_eq!(shelf, ShelfArg::Read);
                assert!(matches!(by, Some(FieldArg::Author)));
                assert_eq!(value.as_deref(), Some("Jane Austen"));
                assert!(desc);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn cache_over(storage: Arc<MemoryStore>, provider: StubProvider) -> RecommendationCache {
        RecommendationCache::new(
            Arc::new(provider),
            storage,
            RecommendationSettings {
                subjects: vec!["history".to_string()],
                max_results: 10,
                delay_ms: 0,
            },
        )
    }

    #[tokio::test]
    async fn test_every_session_fetches_even_with_saved_list() {
        let storage = Arc::new(MemoryStore::new());

        let first = cache_over(
            storage.clone(),
            StubProvider::returning(vec![CatalogEntry::new("SPQR").with_id("h1")]),
        );
        first.load().await;
        assert!(refresh_for_session(&first, None, false).await.unwrap().is_refreshed());

        let provider = StubProvider::returning(vec![CatalogEntry::new("The Guns of August").with_id("h2")]);
        let requests = provider.requests();
        let second = cache_over(storage, provider);
        second.load().await;
        assert!(second.find("h1").is_some());

        let outcome = refresh_for_session(&second, None, false).await;

        assert!(outcome.unwrap().is_refreshed());
        assert_eq!(requests.lock().unwrap().len(), 1);
        assert!(second.find("h1").is_none());
        assert!(second.find("h2").is_some());
    }

    #[tokio::test]
    async fn test_session_fetch_failure_keeps_saved_list() {
        let storage = Arc::new(MemoryStore::new());
        let first = cache_over(
            storage.clone(),
            StubProvider::returning(vec![CatalogEntry::new("SPQR").with_id("h1")]),
        );
        first.refresh().await;

        let second = cache_over(storage, StubProvider::failing());
        second.load().await;

        let outcome = refresh_for_session(&second, Some("war"), false).await;

        assert!(matches!(outcome, Some(RefreshOutcome::Failed { ref subject, .. }) if subject == "war"));
        assert_eq!(second.len(), 1);
        assert!(second.find("h1").is_some());
    }

    #[tokio::test]
    async fn test_cached_flag_skips_fetch() {
        let provider = StubProvider::returning(Vec::new());
        let requests = provider.requests();
        let cache = cache_over(Arc::new(MemoryStore::new()), provider);

        assert_eq!(refresh_for_session(&cache, None, true).await, None);
        assert!(requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_status_arg_mapping() {
        let cli = Cli::parse_from(["shelf", "set-status", "b1", "want"]);
        match cli.command {
            Commands::SetStatus { id, status } => {
                assert_eq!(id, "b1");
                assert_eq!(ReadingStatus::from(status), ReadingStatus::WantToRead);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
