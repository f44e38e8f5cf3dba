//! Watch event model
//!
//! [`WatchEvent`] is the intermediate event type the rest of the pipeline
//! consumes, regardless of where upstream events come from. The event
//! source maps raw OS notifications into it; downstream stages only ever
//! read it.

use std::path::{Path, PathBuf};

use crate::markers;

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// What happened to the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A file or directory was created.
    Created,
    /// A file or directory was written to.
    Modified,
    /// A file or directory was removed.
    Deleted,
    /// Anything else the OS reports (access, metadata, renames, ...).
    Other,
}

/// One filesystem change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// Absolute path the event refers to.
    pub path: PathBuf,
    /// What happened.
    pub kind: EventKind,
    /// Whether the path is a directory.
    pub is_dir: bool,
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

impl WatchEvent {
    /// Map a raw notify event into zero or more watch events (one per path).
    pub fn from_notify(event: notify::Event) -> Vec<Self> {
        let kind = match event.kind {
            notify::EventKind::Create(_) => EventKind::Created,
            notify::EventKind::Modify(_) => EventKind::Modified,
            notify::EventKind::Remove(_) => EventKind::Deleted,
            _ => EventKind::Other,
        };
        event
            .paths
            .into_iter()
            .map(|path| {
                // Deleted paths can no longer be stat'ed; downstream only
                // cares about the flag for creation events anyway.
                let is_dir = kind != EventKind::Deleted && path.is_dir();
                Self { path, kind, is_dir }
            })
            .collect()
    }
}

/// If `event` denotes the creation of a ready marker, return the subtree
/// root it marks ready (the marker's parent directory).
pub fn ready_subtree(event: &WatchEvent) -> Option<&Path> {
    if event.kind != EventKind::Created || event.is_dir {
        return None;
    }
    if event.path.file_name()? != markers::READY {
        return None;
    }
    event.path.parent()
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
