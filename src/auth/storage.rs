//! Bearer token persistence.
//!
//! The token lives under one fixed key in a durable key-value file, the
//! command-line analogue of browser local storage. It is read before every
//! outbound request, written on login and refresh, removed on logout.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use thiserror::Error;

/// Errors raised by a token store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("credentials file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("credentials file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Process-wide holder of the current bearer token.
pub trait TokenStore: Send + Sync {
    /// Current token, if any.
    fn load(&self) -> Option<String>;

    /// Replace the current token.
    fn store(&self, token: &str) -> StorageResult<()>;

    /// Forget the current token.
    fn remove(&self) -> StorageResult<()>;
}

/// JSON file of `key -> value` pairs; the token is kept under `key`.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StorageResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Write-then-rename so a crash never leaves a truncated file.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        match self.read_entries() {
            Ok(mut entries) => entries.remove(&self.key),
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Unreadable credentials file, sending unauthenticated");
                None
            }
        }
    }

    fn store(&self, token: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(self.key.clone(), token.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self) -> StorageResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries().unwrap_or_default();
        if entries.remove(&self.key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// Token store that never touches disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, token: &str) -> StorageResult<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> StorageResult<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");
        let store = FileTokenStore::new(&path, "refine-auth");

        assert!(store.load().is_none());

        store.store("abc").unwrap();
        assert_eq!(store.load().as_deref(), Some("abc"));

        // Another handle on the same file sees the token.
        let reopened = FileTokenStore::new(&path, "refine-auth");
        assert_eq!(reopened.load().as_deref(), Some("abc"));

        store.remove().unwrap();
        assert!(reopened.load().is_none());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = FileTokenStore::new(&path, "refine-auth");
        store.store("t1").unwrap();
        store.remove().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("theme"));
        assert!(!content.contains("t1"));
    }

    #[test]
    fn test_corrupt_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(&path, "refine-auth");
        assert!(store.load().is_none());
        // A write replaces the corrupt content.
        store.store("fresh").unwrap();
        assert_eq!(store.load().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::with_token("a");
        assert_eq!(store.load().as_deref(), Some("a"));
        store.store("b").unwrap();
        assert_eq!(store.load().as_deref(), Some("b"));
        store.remove().unwrap();
        assert!(store.load().is_none());
    }
}
