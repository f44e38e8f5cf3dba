//! Sidecar metadata and destination tags
//!
//! A file may carry a JSON-object sidecar at `<file>.metadata` (the
//! sidecar replaces the file's extension, so `report.json` pairs with
//! `report.metadata`). The object's string pairs become destination tags,
//! URL-encoded as `key=value` pairs and capped at [`MAX_TAGS`]; excess
//! pairs are dropped, not an error. An absent or empty sidecar yields no
//! tags.

use std::collections::BTreeMap;
use std::path::Path;

use crate::{markers, Result};

/// Maximum number of destination tags per object (the S3 object-tag limit).
pub const MAX_TAGS: usize = 10;

/// Read the optional sidecar metadata for `path`.
///
/// Pairs are returned sorted by key, which makes downstream truncation
/// deterministic. Invalid JSON in a present, non-empty sidecar is a parse
/// error.
pub fn metadata_for_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let sidecar = path.with_extension(markers::METADATA_EXTENSION);
    if !sidecar.exists() {
        return Ok(BTreeMap::new());
    }
    let contents = std::fs::read_to_string(&sidecar)?;
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&contents)?;
    Ok(object
        .into_iter()
        .map(|(key, value)| (key, stringify(value)))
        .collect())
}

/// Encode metadata pairs as a URL-style tag set, truncated to [`MAX_TAGS`].
pub fn encode_tags(metadata: &BTreeMap<String, String>) -> String {
    metadata
        .iter()
        .take(MAX_TAGS)
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn stringify(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
