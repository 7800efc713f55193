//! Catalog records as returned by the search provider.

use serde::{Deserialize, Serialize};

/// Bibliographic fields shared by catalog and library entries
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    /// Book title (the only required field)
    pub title: String,

    /// Authors in catalog order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Cover thumbnail URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Publication date, year first ("1965", "1965-08", "1965-08-01")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,

    /// Genres / subject headings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
}

impl BookDetails {
    /// Create details with just a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// First listed author, if any
    pub fn first_author(&self) -> Option<&str> {
        self.authors.as_ref()?.first().map(String::as_str)
    }

    /// First listed category, if any
    pub fn first_category(&self) -> Option<&str> {
        self.categories.as_ref()?.first().map(String::as_str)
    }

    /// Four-digit year prefix of the publication date
    pub fn published_year(&self) -> Option<&str> {
        let date = self.published_date.as_deref()?;
        date.get(..4).or(Some(date)).filter(|y| !y.is_empty())
    }

    /// Authors joined for display ("Unknown author" when missing)
    pub fn author_line(&self) -> String {
        match &self.authors {
            Some(authors) if !authors.is_empty() => authors.join(", "),
            _ => "Unknown author".to_string(),
        }
    }

    /// Whether another record has the same title and the same author list.
    ///
    /// A missing author list only matches another missing list.
    pub fn same_work_as(&self, other: &BookDetails) -> bool {
        self.title == other.title && self.authors == other.authors
    }
}

/// A book as found in the catalog, before any reading status is attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog volume ID (absent for hand-entered books)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub details: BookDetails,
}

impl CatalogEntry {
    /// Create a new catalog entry with a title and no ID
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            details: BookDetails::new(title),
        }
    }

    /// Set the catalog ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the author list
    pub fn with_authors(mut self, authors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.details.authors = Some(authors.into_iter().map(Into::into).collect());
        self
    }

    /// Set the category list
    pub fn with_categories(
        mut self,
        categories: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.details.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Set the publication date
    pub fn with_published_date(mut self, date: impl Into<String>) -> Self {
        self.details.published_date = Some(date.into());
        self
    }

    /// The catalog ID when it is present and non-empty
    pub fn catalog_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn title(&self) -> &str {
        &self.details.title
    }
}
