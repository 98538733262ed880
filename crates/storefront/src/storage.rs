//! String-keyed persistent storage backing the cart.
//!
//! [`KeyValueStore`] is the seam between the cart and wherever its bytes
//! live. [`FileStore`] keeps one file per key on disk; [`MemoryStore`] keeps
//! values in process.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key cannot be used as a storage name.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Underlying I/O failed.
    #[error("Storage I/O error for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    /// A value could not be serialized for storage.
    #[error("Failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A persisted map of string keys to string values.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be persisted.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// =============================================================================
// FileStore
// =============================================================================

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes land in a sibling temp file that is then renamed over the target,
/// so readers see either the old value or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory values are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

/// Keys become file names, so only a conservative character set is allowed.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

fn io_error(key: &str) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key)(e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(io_error(key))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_error(key))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            io_error(key)(e)
        })
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-process store, used by tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.read("cart_v1").unwrap(), None);
        store.write("cart_v1", r#"{"version":1}"#).unwrap();
        assert_eq!(
            store.read("cart_v1").unwrap().as_deref(),
            Some(r#"{"version":1}"#)
        );

        store.write("cart_v1", "{}").unwrap();
        assert_eq!(store.read("cart_v1").unwrap().as_deref(), Some("{}"));
        assert!(!dir.path().join("nested/cart_v1.json.tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        for key in ["", "../escape", "a/b", ".hidden", "with space"] {
            assert!(
                matches!(store.write(key, "x"), Err(StorageError::InvalidKey(_))),
                "{key}"
            );
        }
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.read("a").unwrap(), None);
        store.write("a", "1").unwrap();
        assert_eq!(store.read("a").unwrap().as_deref(), Some("1"));
    }
}
