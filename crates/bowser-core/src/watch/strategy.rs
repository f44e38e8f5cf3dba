//! Watch stop strategies
//!
//! A [`WatchStrategy`] decides when the watch should terminate. Two
//! variants ship: stop when a named completion marker appears at the watch
//! root, or stop after a fixed number of ready signals.
//!
//! State is a plain value mutated only by the single-threaded pipeline
//! task; `should_stop` is a pure query over it. `Stopped` is terminal —
//! there is no transition back to running.

use std::path::PathBuf;

use crate::markers;

use super::event::{EventKind, WatchEvent};

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Strategy state machine. Exactly one instance is active per watch
/// invocation.
#[derive(Debug, Clone)]
pub enum WatchStrategy {
    /// Stop when a creation event for `marker` (relative to `root`) is seen.
    Sentinel {
        root: PathBuf,
        marker: PathBuf,
        stopped: bool,
    },
    /// Stop after `limit` ready signals.
    Count { limit: u32, seen: u32 },
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

impl WatchStrategy {
    /// Sentinel strategy with the default completion marker name.
    pub fn sentinel(root: impl Into<PathBuf>) -> Self {
        Self::sentinel_with_marker(root, markers::COMPLETE)
    }

    /// Sentinel strategy with a custom root-relative marker path.
    pub fn sentinel_with_marker(root: impl Into<PathBuf>, marker: impl Into<PathBuf>) -> Self {
        Self::Sentinel {
            root: root.into(),
            marker: marker.into(),
            stopped: false,
        }
    }

    /// Count strategy stopping after `limit` ready signals.
    pub const fn count(limit: u32) -> Self {
        Self::Count { limit, seen: 0 }
    }

    /// Feed one (post-preemption) event through the strategy.
    ///
    /// Only the sentinel variant cares: a creation event whose path,
    /// relative to the watch root, exactly equals the configured marker
    /// moves it to its terminal stopped state.
    pub fn observe(&mut self, event: &WatchEvent) {
        if let Self::Sentinel {
            root,
            marker,
            stopped,
        } = self
        {
            if event.kind == EventKind::Created
                && event.path.strip_prefix(root.as_path()) == Ok(marker.as_path())
            {
                *stopped = true;
            }
        }
    }

    /// Record one accepted (and already dispatched) ready signal.
    ///
    /// Called after dispatch is issued, so under the count strategy the
    /// N-th subtree is still dispatched before the stop takes effect.
    pub fn note_ready(&mut self) {
        if let Self::Count { limit, seen } = self {
            if seen < limit {
                *seen += 1;
            }
        }
    }

    /// Whether the watch should terminate.
    pub fn should_stop(&self) -> bool {
        match self {
            Self::Sentinel { stopped, .. } => *stopped,
            Self::Count { limit, seen } => seen >= limit,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
