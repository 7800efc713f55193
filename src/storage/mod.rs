//! Key-value persistence for the library and recommendation lists.
//!
//! Each logical key holds one JSON document that is always written whole.
//!
//! # Storage Layout
//!
//! ```text
//! ~/.shelf/
//! ├── config.yaml               # Optional settings
//! └── data/
//!     ├── books.json            # Library entries
//!     ├── books.lock            # Writer lock
//!     ├── recommendations.json  # Last fetched suggestions
//!     └── recommendations.lock
//! ```

pub mod file;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the canonical library list
pub const BOOKS_KEY: &str = "books";

/// Key holding the recommendation list
pub const RECOMMENDATIONS_KEY: &str = "recommendations";

/// Errors raised by store backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// String store that survives process restarts
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value for a key, `None` if it was never written
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value for a key
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Keys become file names, so keep them to a safe alphabet
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
