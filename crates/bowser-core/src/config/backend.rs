//! Backend configuration
//!
//! Each configured backend is one entry in the `[[bowser.backends]]` array,
//! discriminated by its `kind` field. Loaded once at startup and shared
//! read-only by all dispatch operations.

use std::path::Path;

use serde::Deserialize;

use super::{link::Link, Secret};

/// One configured remote backend, discriminated by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum BackendConfig {
    /// Amazon S3 (or an S3-compatible store).
    #[serde(rename = "AWS-S3")]
    AwsS3(AwsS3Config),
}

impl BackendConfig {
    /// Label for log messages that don't want to match on the concrete type.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AwsS3(_) => "AWS-S3",
        }
    }
}

/// Configuration for an S3 backend.
#[derive(Debug, Clone, Deserialize)]
pub struct AwsS3Config {
    /// AWS region.
    pub region: String,
    /// AWS access key ID.
    pub access_key_id: Secret,
    /// AWS secret access key.
    pub secret_access_key: Secret,
    /// The target buckets to synchronize content to.
    pub buckets: Vec<Bucket>,
}

/// One target bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct Bucket {
    /// The target bucket name.
    pub name: String,
    /// The root key content goes under.
    ///
    /// Empty means content is synced directly to the top level of the bucket.
    #[serde(default)]
    pub prefix: String,
    /// Optional alias rule mirrored on matching keys.
    #[serde(default)]
    pub link: Option<Link>,
}

impl Bucket {
    /// Join `rel` onto this bucket's configured prefix.
    ///
    /// Redundant leading separators are stripped so an empty prefix yields
    /// keys relative to the bucket root.
    pub fn join_prefix(&self, rel: &Path) -> String {
        let joined = format!("{}/{}", self.prefix, rel.display());
        joined.trim_start_matches('/').to_string()
    }
}
