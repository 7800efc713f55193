//! File-backed store: one `<key>.json` file per key.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tempfile::NamedTempFile;

use super::{validate_key, KeyValueStore, StorageError};

/// Stores each key as a JSON file inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory holding the key files
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir` (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Open the store in the configured data directory
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::new(crate::config::data_dir()?))
    }

    /// Directory holding the key files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a key
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.lock", key))
    }
}

fn read_value(path: &Path) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Replace the key file with a fully written temp file.
///
/// Writers are serialized through an exclusive lock on `<key>.lock`.
/// Readers never see a partial value: the rename swaps the whole file.
fn write_locked(dir: &Path, lock_path: &Path, path: &Path, value: &str) -> Result<(), StorageError> {
    fs::create_dir_all(dir)?;

    let lock = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(lock_path)?;
    lock.lock_exclusive()?;

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(value.as_bytes())?;
    staged.as_file().sync_data()?;
    staged.persist(path).map_err(|e| e.error)?;

    // Lock is released when `lock` is dropped
    Ok(())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let path = self.key_path(key);

        tokio::task::spawn_blocking(move || read_value(&path))
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let dir = self.dir.clone();
        let lock_path = self.lock_path(key);
        let path = self.key_path(key);
        let value = value.to_string();

        tokio::task::spawn_blocking(move || write_locked(&dir, &lock_path, &path, &value))
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
    }
}
