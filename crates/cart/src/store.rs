//! Local key-value stores for the cart snapshot.
//!
//! Stores hold raw strings; encoding is the snapshot module's job.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The key cannot be used as a record name.
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),
}

/// Named string records.
pub trait KeyValueStore {
    /// Read a record. `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the record exists but cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a record, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the record cannot be written.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Whether `key` can name a record: non-empty ASCII alphanumerics, `-` or `_`.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// --- Memory Implementation ---

/// In-process store. Contents vanish with the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, e.g. to simulate a snapshot left by a previous run.
    #[must_use]
    pub fn with_record(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.records.insert(key.into(), value.into());
        self
    }

    /// Raw record contents.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// --- File Implementation ---

/// One JSON file per key inside a data directory.
///
/// Writes go to a sibling temp file that is then renamed over the record, so
/// a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// A store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidKey` unless [`is_valid_key`] accepts the key.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    #[instrument(skip(self, value), fields(dir = %self.dir.display(), bytes = value.len()))]
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "Record written");
        Ok(())
    }
}
