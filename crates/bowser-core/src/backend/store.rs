//! The object-store capability
//!
//! The upload protocol is written against [`ObjectStore`], the minimal
//! surface it needs from a remote store: list keys under a prefix, delete
//! one key, put one object. The real S3 client implements it over HTTP;
//! [`MemoryStore`] implements it in-process for dry runs and tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Error, Result};

/// Minimal remote-store surface the upload protocol requires.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every key stored under `prefix` in `bucket`.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    /// Delete one object.
    async fn delete(&self, bucket: &str, key: &str) -> Result<()>;

    /// Store one object with its (possibly empty) URL-encoded tag set and
    /// base64 SHA-256 content checksum.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        tags: &str,
        checksum_sha256: &str,
    ) -> Result<()>;
}

/// One object held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub tags: String,
    pub checksum_sha256: String,
}

/// In-memory [`ObjectStore`] used for `--dry-run` and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All keys currently stored in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.lock_objects()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }

    /// Fetch one stored object, if present.
    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.lock_objects()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    fn lock_objects(&self) -> std::sync::MutexGuard<'_, BTreeMap<(String, String), StoredObject>> {
        // A poisoned lock means a panic mid-insert; propagating the inner
        // state is still coherent for a plain map.
        self.objects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock_objects()
            .keys()
            .filter(|(b, key)| b == bucket && key.starts_with(prefix))
            .map(|(_, key)| key.clone())
            .collect())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        self.lock_objects()
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        tags: &str,
        checksum_sha256: &str,
    ) -> Result<()> {
        if bucket.is_empty() || key.is_empty() {
            return Err(Error::store_error("bucket and key must be non-empty"));
        }
        self.lock_objects().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                tags: tags.to_string(),
                checksum_sha256: checksum_sha256.to_string(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_list_delete_round_trip() -> Result<()> {
        let store = MemoryStore::new();
        store
            .put("bucket", "root/a.txt", b"a".to_vec(), "", "checksum")
            .await?;
        store
            .put("bucket", "root/b.txt", b"b".to_vec(), "", "checksum")
            .await?;
        store
            .put("bucket", "other/c.txt", b"c".to_vec(), "", "checksum")
            .await?;

        let listed = store.list("bucket", "root/").await?;
        assert_eq!(listed, vec!["root/a.txt", "root/b.txt"]);

        store.delete("bucket", "root/a.txt").await?;
        assert_eq!(store.list("bucket", "root/").await?, vec!["root/b.txt"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_buckets_are_isolated() -> Result<()> {
        let store = MemoryStore::new();
        store
            .put("one", "key", b"1".to_vec(), "", "checksum")
            .await?;
        assert!(store.list("two", "").await?.is_empty());
        Ok(())
    }
}
