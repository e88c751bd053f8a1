//! The [`KvStore`] trait and its two implementations.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};

/// A namespaced, async byte-level key-value store.
///
/// Backs credential storage (keyed by provider id), scheduler trigger
/// state, and the security policy file — anywhere the daemon needs
/// durable key-value state without a query engine.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the raw value for `key`, or `None` if unset.
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, overwriting any existing value.
    async fn set(&self, key: &str, value: Vec<u8>) -> StorageResult<()>;

    /// Remove `key`, if present. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// List every key currently starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> StorageResult<Vec<String>>;
}

/// An in-memory [`KvStore`], for tests and ephemeral state.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryKvStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> StorageResult<Vec<String>> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// A file-backed [`KvStore`]: one file per key, under a root directory.
///
/// Keys are sanitized to a filesystem-safe filename (non-alphanumeric
/// bytes other than `-`/`_`/`.` become `_`) so a key can't escape the
/// root directory via a path traversal segment.
#[derive(Debug)]
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    /// Open (without yet creating) a file-backed store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .bytes()
            .map(|b| {
                if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.' {
                    b as char
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(safe)
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Internal(e.to_string())),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        tokio::fs::write(self.path_for(key), value)
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) | Err(_) if !self.path_for(key).exists() => Ok(()),
            Err(e) => Err(StorageError::Internal(e.to_string())),
        }
    }

    async fn keys_with_prefix(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(keys),
            Err(e) => return Err(StorageError::Internal(e.to_string())),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?
        {
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(prefix) {
                    keys.push(name.to_owned());
                }
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_kv_roundtrip() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("a").await.unwrap(), None);

        store.set("a", b"hello".to_vec()).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(b"hello".to_vec()));

        store.delete("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_kv_prefix_scan() {
        let store = MemoryKvStore::new();
        store.set("provider:openai", vec![1]).await.unwrap();
        store.set("provider:anthropic", vec![2]).await.unwrap();
        store.set("scheduler:state", vec![3]).await.unwrap();

        let mut keys = store.keys_with_prefix("provider:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["provider:anthropic", "provider:openai"]);
    }

    #[tokio::test]
    async fn test_file_kv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path());

        assert_eq!(store.get("openai").await.unwrap(), None);
        store.set("openai", b"sk-test".to_vec()).await.unwrap();
        assert_eq!(store.get("openai").await.unwrap(), Some(b"sk-test".to_vec()));

        store.delete("openai").await.unwrap();
        assert_eq!(store.get("openai").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_kv_sanitizes_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path());
        store.set("../../etc/passwd", b"x".to_vec()).await.unwrap();

        // The write lands inside root, not at the traversed path.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_file_kv_missing_returns_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path());
        assert_eq!(store.get("absent").await.unwrap(), None);
    }
}
