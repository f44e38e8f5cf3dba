//! Reserved filesystem marker names
//!
//! Upstream producers communicate with Bowser entirely through sentinel
//! files; these are the reserved names. Files whose name starts with the
//! marker prefix (or that carry the metadata extension) are never uploaded.

/// Created in a subtree to signal the subtree is ready for dispatch.
pub const READY: &str = ".bowser.ready";

/// Created at the watch root to stop a sentinel-strategy watch; also
/// touched in each subtree by the dispatcher once all backends have been
/// attempted.
pub const COMPLETE: &str = ".bowser.complete";

/// Created anywhere under the watch root (configurable path) to stop the
/// watch unconditionally.
pub const ABORT: &str = ".bowser.abort";

/// Common prefix of all reserved marker files.
pub const PREFIX: &str = ".bowser";

/// Extension of sidecar metadata files (`<file>.metadata`).
pub const METADATA_EXTENSION: &str = "metadata";
