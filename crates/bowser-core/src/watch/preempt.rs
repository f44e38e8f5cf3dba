//! Preemption filter
//!
//! A pass-through stage over the event stream that watches for one
//! particular abort marker. Seeing it forces immediate, unconditional
//! termination of the pipeline, regardless of anything else observed so
//! far or still buffered. Operators get an out-of-band kill switch
//! independent of the configured stop strategy.
//!
//! This check runs before ready-signal extraction, so an abort marker
//! takes priority over any ready signal still queued behind it.

use std::path::{Path, PathBuf};

use super::event::{EventKind, WatchEvent};

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Outcome of checking one event against the abort marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Terminate the pipeline now; the event is dropped.
    Abort,
    /// Not the abort marker; forward the event unchanged.
    Forward,
}

/// The preemption stage. Compares by exact path equality against the
/// configured marker path.
#[derive(Debug, Clone)]
pub struct PreemptFilter {
    marker: PathBuf,
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

impl PreemptFilter {
    /// Create a filter for the given abort-marker path.
    pub fn new(marker: impl Into<PathBuf>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// The configured abort-marker path.
    pub fn marker(&self) -> &Path {
        &self.marker
    }

    /// Check one event.
    pub fn check(&self, event: &WatchEvent) -> Verdict {
        if event.kind == EventKind::Created && event.path == self.marker {
            Verdict::Abort
        } else {
            Verdict::Forward
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
