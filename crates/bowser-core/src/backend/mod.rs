//! Destination backends
//!
//! A [`Backend`] receives one ready subtree at a time and makes its remote
//! destination reflect the subtree's current files. Backends are built
//! from configuration by [`provide_backends`] and run concurrently by the
//! dispatcher; each must tolerate being handed the same subtree more than
//! once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{BackendConfig, BowserConfig};
use crate::Result;

// ═══════════════════════════════════════════════════════════════════════════
// MODULE DEFINITIONS
// ═══════════════════════════════════════════════════════════════════════════

pub mod client;
pub mod metadata;
pub mod s3;
pub mod sigv4;
pub mod store;

// ═══════════════════════════════════════════════════════════════════════════
// RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use client::S3Client;
pub use metadata::{encode_tags, metadata_for_file, MAX_TAGS};
pub use s3::S3Backend;
pub use store::{MemoryStore, ObjectStore, StoredObject};

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// One sync destination.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable identity for logs and error messages.
    fn name(&self) -> String;

    /// Upload `subtree` so the destination reflects its current files.
    /// Must be idempotent across repeated calls for the same subtree.
    async fn upload(&self, subtree: &Path) -> Result<()>;
}

/// Build every configured backend rooted at `watch_root`.
///
/// With `dry_run` set, each backend writes to an in-process store instead
/// of its real destination, so the full protocol runs without touching
/// the network.
pub fn provide_backends(
    watch_root: impl Into<PathBuf>,
    config: &BowserConfig,
    dry_run: bool,
) -> Result<Vec<Arc<dyn Backend>>> {
    let watch_root = watch_root.into();
    config
        .backends
        .iter()
        .map(|backend| match backend {
            BackendConfig::AwsS3(s3_config) => {
                tracing::debug!(
                    "Constructing {} backend (dry_run: {dry_run})",
                    backend.kind()
                );
                let store: Arc<dyn ObjectStore> = if dry_run {
                    Arc::new(MemoryStore::new())
                } else {
                    Arc::new(S3Client::new(s3_config)?)
                };
                Ok(Arc::new(S3Backend::new(
                    watch_root.clone(),
                    s3_config.clone(),
                    store,
                )) as Arc<dyn Backend>)
            }
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
