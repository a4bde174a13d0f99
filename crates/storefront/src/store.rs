//! Key-value persistence behind the cart.
//!
//! A [`KeyValueStore`] exposes fallible `try_read`/`try_write`. Callers use the
//! provided `read`/`write`, which never fail: errors are logged and reads
//! come back absent, so a broken store leaves the shopper with an
//! in-memory cart for the session.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::error::StoreError;

/// String-keyed persistence, in the shape of browser local storage.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    fn try_read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store refuses the write.
    fn try_write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Read `key`, treating any failure as absence.
    fn read(&self, key: &str) -> Option<String> {
        match self.try_read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Storage read failed, continuing without persisted data");
                None
            }
        }
    }

    /// Write `key`, logging and ignoring failures. Returns whether the write landed.
    fn write(&self, key: &str, value: &str) -> bool {
        match self.try_write(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Storage write failed, cart kept in memory only");
                false
            }
        }
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn try_read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).try_read(key)
    }

    fn try_write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).try_write(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn try_read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).try_read(key)
    }

    fn try_write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).try_write(key, value)
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn try_read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn try_write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// File store
// =============================================================================

/// One JSON file per key inside a directory.
///
/// A missing file reads as absent. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidKey` for keys that are empty or could
    /// escape the store directory.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !Self::is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Whether `key` maps onto a file name inside the store directory:
    /// non-empty ASCII alphanumerics, `-`, `_` and `.`, not starting with `.`.
    #[must_use]
    pub fn is_valid_key(key: &str) -> bool {
        !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.')
    }
}

impl KeyValueStore for FileStore {
    fn try_read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No persisted value");
                Ok(None)
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn try_write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write to a sibling file and rename so readers never see a torn value.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

// =============================================================================
// Unavailable store
// =============================================================================

/// A store that refuses every operation, like local storage in a locked-down
/// private window.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn try_read(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("storage is disabled".to_string()))
    }

    fn try_write(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("storage is disabled".to_string()))
    }
}
