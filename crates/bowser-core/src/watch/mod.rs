//! Watching a directory tree for readiness signals
//!
//! Upstream producers drop files into subtrees of a watch root and mark a
//! subtree finished by creating a `.bowser.ready` file in it. This module
//! observes those creation events and drives one dispatch per ready
//! signal, until a stop strategy (or the abort marker) ends the watch.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::{Path, PathBuf};
//!
//! use bowser_core::watch::{self, WatchStrategy};
//!
//! # async fn example() -> bowser_core::Result<()> {
//! let root = Path::new("/srv/drops");
//! let (_interrupt_tx, interrupt) = tokio::sync::broadcast::channel(1);
//! let outcome = watch::execute(
//!     root,
//!     &[],
//!     WatchStrategy::sentinel(root),
//!     root.join(".bowser.abort"),
//!     interrupt,
//! )
//! .await?;
//! println!("watch ended: {outcome:?}");
//! # Ok(())
//! # }
//! ```

// ═══════════════════════════════════════════════════════════════════════════
// MODULE DEFINITIONS
// ═══════════════════════════════════════════════════════════════════════════

pub mod event;
pub mod pipeline;
pub mod preempt;
pub mod source;
pub mod strategy;

// ═══════════════════════════════════════════════════════════════════════════
// RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

// Core types and functions
pub use event::{ready_subtree, EventKind, WatchEvent};
pub use pipeline::{execute, run_pipeline, WatchOutcome};
pub use preempt::{PreemptFilter, Verdict};
pub use source::EventSource;
pub use strategy::WatchStrategy;
