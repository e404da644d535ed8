//! Durable document storage and the persistent aggregate store
//!
//! A [`Storage`] maps a fixed key to one JSON document. The
//! [`PersistentStore`] reads and writes the whole [`AppData`] aggregate under
//! [`DATA_KEY`]; every save rewrites the full document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::core::data::AppData;
use crate::core::seed::{self, DEFAULT_BOOTSTRAP_PIN};

/// Key of the aggregate document
pub const DATA_KEY: &str = "inventory_data";

/// Key of the logged-in user document
pub const SESSION_KEY: &str = "session_user";

/// Key of the inactivity lock state
pub const LOCK_KEY: &str = "idle_lock";

/// Errors from the storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access stored document '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value document storage
pub trait Storage {
    /// Read the document under `key`, `None` if it was never written
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the document under `key`
    fn write(&self, key: &str, contents: &str) -> Result<(), StorageError>;

    /// Remove the document under `key`; removing a missing key succeeds
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn io_error(key: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, contents).map_err(|e| Self::io_error(key, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| Self::io_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

/// In-memory storage. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    documents: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.documents.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.documents().get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), StorageError> {
        self.documents().insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.documents().remove(key);
        Ok(())
    }
}

/// Serialize the aggregate exactly as it is persisted
pub fn to_document(data: &AppData) -> Result<String, StorageError> {
    serde_json::to_string_pretty(data).map_err(|source| StorageError::Serialize {
        key: DATA_KEY.to_string(),
        source,
    })
}

/// Loads and saves the [`AppData`] aggregate
#[derive(Debug, Clone)]
pub struct PersistentStore<S: Storage> {
    storage: S,
    bootstrap_pin: String,
}

impl<S: Storage> PersistentStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            bootstrap_pin: DEFAULT_BOOTSTRAP_PIN.to_string(),
        }
    }

    /// PIN for the administrator of a freshly seeded dataset
    pub fn with_bootstrap_pin(mut self, pin: impl Into<String>) -> Self {
        self.bootstrap_pin = pin.into();
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the aggregate, falling back to the seeded default dataset when
    /// the document is missing, unreadable or unparsable. Never fails.
    pub fn load(&self) -> AppData {
        let contents = match self.storage.read(DATA_KEY) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                tracing::debug!("no stored inventory document, using seed data");
                return seed::default_data(&self.bootstrap_pin);
            }
            Err(e) => {
                tracing::warn!("could not read inventory document, using seed data: {}", e);
                return seed::default_data(&self.bootstrap_pin);
            }
        };

        match serde_json::from_str::<AppData>(&contents) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("stored inventory document is corrupt, using seed data: {}", e);
                seed::default_data(&self.bootstrap_pin)
            }
        }
    }

    /// Overwrite the stored document with `data`
    pub fn save(&self, data: &AppData) -> Result<(), StorageError> {
        let document = to_document(data)?;
        self.storage.write(DATA_KEY, &document)?;
        tracing::trace!(bytes = document.len(), "saved inventory document");
        Ok(())
    }
}
