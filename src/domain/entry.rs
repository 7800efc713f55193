//! Library entries: catalog records with the user's reading state attached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::book::{BookDetails, CatalogEntry};

/// Reading status of a library entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadingStatus {
    /// Currently reading
    Reading,

    /// Finished
    Read,

    /// On the to-read pile
    WantToRead,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 3] = [
        ReadingStatus::Reading,
        ReadingStatus::Read,
        ReadingStatus::WantToRead,
    ];
}

impl std::fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadingStatus::Reading => write!(f, "reading"),
            ReadingStatus::Read => write!(f, "read"),
            ReadingStatus::WantToRead => write!(f, "want-to-read"),
        }
    }
}

impl std::str::FromStr for ReadingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "reading" | "current" => Ok(ReadingStatus::Reading),
            "read" | "done" | "finished" => Ok(ReadingStatus::Read),
            "wanttoread" | "want" | "toread" => Ok(ReadingStatus::WantToRead),
            _ => anyhow::bail!("Unknown reading status: {}", s),
        }
    }
}

/// Whether a book is owned or only wanted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    Owned,
    Wishlist,
}

impl std::fmt::Display for Ownership {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ownership::Owned => write!(f, "owned"),
            Ownership::Wishlist => write!(f, "wishlist"),
        }
    }
}

/// A book in the user's library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    /// Unique key within the library
    pub id: String,

    #[serde(flatten)]
    pub details: BookDetails,

    pub status: ReadingStatus,

    /// `None` when neither owned nor wishlisted
    pub ownership: Option<Ownership>,

    /// Ownership to restore when the entry leaves the wishlist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership_before_wishlist: Option<Ownership>,

    /// Milliseconds since the Unix epoch
    pub added_at: i64,
}

impl LibraryEntry {
    /// Build an entry from a catalog record.
    ///
    /// `id` wins over whatever ID the catalog record carries.
    pub fn from_catalog(
        book: &CatalogEntry,
        id: impl Into<String>,
        status: ReadingStatus,
        ownership: Option<Ownership>,
    ) -> Self {
        Self {
            id: id.into(),
            details: book.details.clone(),
            status,
            ownership,
            ownership_before_wishlist: None,
            added_at: now_millis(),
        }
    }

    pub fn is_wishlisted(&self) -> bool {
        self.ownership == Some(Ownership::Wishlist)
    }

    /// Put the entry on the wishlist, or take it off again.
    ///
    /// Leaving the wishlist restores whatever ownership the entry had
    /// before it was wishlisted (unset for entries created as wishes).
    pub fn toggle_wishlist(&mut self) {
        if self.is_wishlisted() {
            self.ownership = self.ownership_before_wishlist.take();
        } else {
            self.ownership_before_wishlist = self.ownership;
            self.ownership = Some(Ownership::Wishlist);
        }
    }

    /// Mark as owned, dropping any wishlist marking
    pub fn mark_owned(&mut self) {
        self.ownership = Some(Ownership::Owned);
        self.ownership_before_wishlist = None;
    }

    /// When the entry was added
    pub fn added_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.added_at)
    }

    pub fn title(&self) -> &str {
        &self.details.title
    }
}

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
