//! Google Books volumes API client.
//!
//! Only the `GET /volumes` search endpoint is used. Volume records are
//! mapped onto [`CatalogEntry`]; fields the library does not track are
//! dropped.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{SearchError, SearchProvider, SearchRequest};
use crate::config::SearchSettings;
use crate::domain::{BookDetails, CatalogEntry};

/// Public Google Books endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";

/// Page size for free-text searches
pub const DEFAULT_MAX_RESULTS: u32 = 20;

/// Google Books API client
pub struct GoogleBooksClient {
    /// API root, without trailing slash
    base_url: String,
    /// Optional API key (anonymous quota when unset)
    api_key: Option<String>,
    /// Page size used when a request does not set one
    default_max_results: u32,
    /// HTTP client
    client: reqwest::Client,
}

/// Response from `GET /volumes`
#[derive(Debug, Deserialize)]
struct VolumesResponse {
    /// Absent when nothing matched
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    id: Option<String>,
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    description: Option<String>,
    image_links: Option<ImageLinks>,
    published_date: Option<String>,
    publisher: Option<String>,
    page_count: Option<u32>,
    categories: Option<Vec<String>>,
    average_rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

impl Volume {
    /// Volumes without a title are not usable as books
    fn into_catalog_entry(self) -> Option<CatalogEntry> {
        let info = self.volume_info?;
        let title = info.title.filter(|t| !t.trim().is_empty())?;

        Some(CatalogEntry {
            id: self.id,
            details: BookDetails {
                title,
                authors: info.authors,
                description: info.description,
                thumbnail_url: info
                    .image_links
                    .and_then(|links| links.thumbnail.or(links.small_thumbnail)),
                published_date: info.published_date,
                publisher: info.publisher,
                page_count: info.page_count,
                categories: info.categories,
                average_rating: info.average_rating,
            },
        })
    }
}

/// Parse a `/volumes` response body
pub fn parse_volumes(body: &str) -> Result<Vec<CatalogEntry>, SearchError> {
    let response: VolumesResponse = serde_json::from_str(body)?;

    Ok(response
        .items
        .into_iter()
        .filter_map(Volume::into_catalog_entry)
        .collect())
}

/// Strip separators from an ISBN as typed or scanned
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

impl GoogleBooksClient {
    /// Create a new client
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            default_max_results: DEFAULT_MAX_RESULTS,
            client: reqwest::Client::new(),
        }
    }

    /// Create from config
    pub fn from_settings(settings: &SearchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            default_max_results: settings.max_results,
            client,
        })
    }

    /// Build the volumes endpoint URL
    fn volumes_url(&self) -> String {
        format!("{}/volumes", self.base_url)
    }

    /// Query-string parameters for a request
    fn query_params(&self, request: &SearchRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", request.query.clone()),
            (
                "maxResults",
                request
                    .max_results
                    .unwrap_or(self.default_max_results)
                    .to_string(),
            ),
            ("orderBy", request.order_by.as_str().to_string()),
        ];

        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }

        params
    }

    /// Free-text search with the default page size
    pub async fn search_text(&self, query: &str) -> Result<Vec<CatalogEntry>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        self.search(&SearchRequest::new(query)).await
    }

    /// Look up a single book by ISBN-10 or ISBN-13
    pub async fn lookup_isbn(&self, isbn: &str) -> Result<Option<CatalogEntry>, SearchError> {
        let isbn = normalize_isbn(isbn);
        if isbn.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let request = SearchRequest::new(format!("isbn:{}", isbn)).with_max_results(1);
        let mut results = self.search(&request).await?;

        Ok(if results.is_empty() {
            None
        } else {
            Some(results.swap_remove(0))
        })
    }
}

#[async_trait]
impl SearchProvider for GoogleBooksClient {
    fn name(&self) -> &str {
        "google-books"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CatalogEntry>, SearchError> {
        debug!(query = %request.query, "Searching Google Books");

        let response = self
            .client
            .get(self.volumes_url())
            .query(&self.query_params(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let entries = parse_volumes(&body)?;
        debug!(query = %request.query, count = entries.len(), "Search finished");

        Ok(entries)
    }
}
