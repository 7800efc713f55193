//! Shelf filtering and sorting.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::domain::LibraryEntry;

/// Field a shelf can be filtered and sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterField {
    /// No filter, sort by title
    #[default]
    All,
    Genre,
    Author,
    Title,
    /// Year prefix of the publication date
    ReleaseYear,
}

impl std::fmt::Display for FilterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterField::All => write!(f, "all"),
            FilterField::Genre => write!(f, "genre"),
            FilterField::Author => write!(f, "author"),
            FilterField::Title => write!(f, "title"),
            FilterField::ReleaseYear => write!(f, "year"),
        }
    }
}

impl std::str::FromStr for FilterField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(FilterField::All),
            "genre" | "category" => Ok(FilterField::Genre),
            "author" => Ok(FilterField::Author),
            "title" => Ok(FilterField::Title),
            "year" | "release" | "release-year" => Ok(FilterField::ReleaseYear),
            _ => anyhow::bail!("Unknown filter field: {}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// A-Z
    #[default]
    Ascending,
    /// Z-A
    Descending,
}

/// Filter + sort applied to a shelf
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShelfQuery {
    pub field: FilterField,

    /// Value to match; no filtering when unset
    pub value: Option<String>,

    pub order: SortOrder,
}

impl ShelfQuery {
    /// All entries, A-Z by title
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep entries whose `field` matches `value`
    pub fn filter_by(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.field = field;
        self.value = Some(value.into());
        self
    }

    /// Sort by `field` without filtering
    pub fn sort_by(mut self, field: FilterField) -> Self {
        self.field = field;
        self
    }

    pub fn descending(mut self) -> Self {
        self.order = SortOrder::Descending;
        self
    }

    /// Whether an entry passes the filter
    pub fn matches(&self, entry: &LibraryEntry) -> bool {
        let value = match (&self.field, &self.value) {
            (FilterField::All, _) | (_, None) => return true,
            (_, Some(value)) => value.as_str(),
        };
        let details = &entry.details;

        match self.field {
            FilterField::All => true,
            FilterField::Genre => contains(&details.categories, value),
            FilterField::Author => contains(&details.authors, value),
            FilterField::Title => details.title == value,
            FilterField::ReleaseYear => details
                .published_date
                .as_deref()
                .is_some_and(|date| date.starts_with(value)),
        }
    }

    fn sort_key<'a>(&self, entry: &'a LibraryEntry) -> &'a str {
        let details = &entry.details;
        match self.field {
            FilterField::All | FilterField::Title => &details.title,
            FilterField::Genre => details.first_category().unwrap_or(""),
            FilterField::Author => details.first_author().unwrap_or(""),
            FilterField::ReleaseYear => details.published_date.as_deref().unwrap_or(""),
        }
    }

    fn compare(&self, a: &LibraryEntry, b: &LibraryEntry) -> Ordering {
        let ordering = compare_text(self.sort_key(a), self.sort_key(b));
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }

    /// Filter then sort a shelf
    pub fn apply(&self, entries: &[LibraryEntry]) -> Vec<LibraryEntry> {
        let mut shelf: Vec<LibraryEntry> = entries
            .iter()
            .filter(|entry| self.matches(entry))
            .cloned()
            .collect();

        shelf.sort_by(|a, b| self.compare(a, b));
        shelf
    }
}

fn contains(list: &Option<Vec<String>>, value: &str) -> bool {
    list.as_ref().is_some_and(|items| items.iter().any(|item| item == value))
}

/// Case-insensitive, falling back to exact order for ties
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Distinct values a shelf can be filtered by, sorted
pub fn facet_values(field: FilterField, entries: &[LibraryEntry]) -> Vec<String> {
    let mut values = BTreeSet::new();

    for entry in entries {
        let details = &entry.details;
        match field {
            FilterField::All => {}
            FilterField::Genre => values.extend(details.categories.iter().flatten().cloned()),
            FilterField::Author => values.extend(details.authors.iter().flatten().cloned()),
            FilterField::Title => {
                values.insert(details.title.clone());
            }
            FilterField::ReleaseYear => {
                if let Some(year) = details.published_year() {
                    values.insert(year.to_string());
                }
            }
        }
    }

    values.into_iter().collect()
}
