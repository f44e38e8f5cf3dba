//! Idempotent subtree upload to S3 buckets
//!
//! Given a ready subtree, make every configured bucket's object set under
//! the subtree's key prefix exactly reflect the subtree's current local
//! files. The protocol is clear-then-write so it is safely re-runnable:
//! leftovers from a partially failed earlier attempt are removed rather
//! than accumulated.
//!
//! Per bucket:
//! 1. Compute the subtree's key prefix (configured prefix + subtree path
//!    relative to the watch root).
//! 2. If the bucket's link rule matches that prefix, delete everything
//!    under the aliased prefix first, so a re-upload cannot leave stale
//!    alias objects mixed with fresh ones.
//! 3. Delete everything under the subtree's own prefix.
//! 4. Walk the subtree; skip reserved marker files and metadata sidecars;
//!    upload each remaining file with its tags and content checksum.
//! 5. Mirror any file whose key matches the link rule under the aliased
//!    key.
//!
//! A prefix-clear failure is a typed error carrying the prefix; a file
//! upload failure aborts this backend's remaining work for the subtree.
//! Neither touches sibling backends (the dispatcher owns that policy).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::config::{AwsS3Config, Bucket};
use crate::{markers, Error, Result};

use super::metadata::{encode_tags, metadata_for_file};
use super::store::ObjectStore;
use super::Backend;

/// One S3 backend instance: a set of buckets behind one store client.
pub struct S3Backend {
    watch_root: PathBuf,
    config: AwsS3Config,
    store: Arc<dyn ObjectStore>,
}

impl S3Backend {
    pub fn new(watch_root: impl Into<PathBuf>, config: AwsS3Config, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            watch_root: watch_root.into(),
            config,
            store,
        }
    }

    async fn sync_bucket(&self, bucket: &Bucket, subtree: &Path) -> Result<()> {
        let subtree_rel = subtree.strip_prefix(&self.watch_root).map_err(|_| {
            Error::invalid_config(format!(
                "subtree {} is not under watch root {}",
                subtree.display(),
                self.watch_root.display()
            ))
        })?;
        let prefix = bucket.join_prefix(subtree_rel);

        // Stale alias objects must be gone before any new object lands.
        if let Some(link) = &bucket.link {
            if link.target.matches(&prefix) {
                let alias_prefix = link.substitute(&prefix)?;
                self.clear_prefix(bucket, &alias_prefix).await?;
            }
        }
        self.clear_prefix(bucket, &prefix).await?;

        for file in collect_files(subtree)? {
            let file_rel = file.strip_prefix(&self.watch_root).map_err(|_| {
                Error::io_error(format!("{} escaped the watch root", file.display()))
            })?;
            let key = bucket.join_prefix(file_rel);
            let tags = encode_tags(&metadata_for_file(&file)?);
            let body = tokio::fs::read(&file).await?;
            let checksum = sha256_base64(&body);

            tracing::debug!("Uploading {} to s3://{}/{key}", file.display(), bucket.name);
            self.store
                .put(&bucket.name, &key, body.clone(), &tags, &checksum)
                .await?;

            if let Some(link) = &bucket.link {
                if link.target.matches(&key) {
                    let alias_key = link.substitute(&key)?;
                    self.store
                        .put(&bucket.name, &alias_key, body, &tags, &checksum)
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn clear_prefix(&self, bucket: &Bucket, prefix: &str) -> Result<()> {
        let keys = self
            .store
            .list(&bucket.name, prefix)
            .await
            .map_err(|err| Error::prefix_clear(prefix, err.to_string()))?;
        for key in keys {
            self.store
                .delete(&bucket.name, &key)
                .await
                .map_err(|err| Error::prefix_clear(prefix, err.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for S3Backend {
    fn name(&self) -> String {
        format!(
            "AWS-S3({})",
            self.config
                .buckets
                .iter()
                .map(|b| b.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }

    async fn upload(&self, subtree: &Path) -> Result<()> {
        for bucket in &self.config.buckets {
            self.sync_bucket(bucket, subtree).await?;
        }
        Ok(())
    }
}

/// Regular files under `subtree` eligible for upload, sorted for
/// deterministic order. Reserved markers and metadata sidecars are never
/// uploaded.
fn collect_files(subtree: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(subtree).sort_by_file_name() {
        let entry = entry.map_err(|err| Error::io_error(err.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_reserved(entry.path()) {
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

fn is_reserved(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return true;
    };
    name.starts_with(markers::PREFIX) || name.ends_with(&format!(".{}", markers::METADATA_EXTENSION))
}

fn sha256_base64(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    BASE64.encode(digest)
}
