//! The watch pipeline
//!
//! Wires the stages together in fixed order per event: preemption check,
//! ready-signal extraction and dispatch, then the stop strategy. The loop
//! runs on one task, so strategy state needs no locking; only the
//! dispatcher fans out.
//!
//! The caller gets a [`WatchOutcome`] back only after any in-flight
//! dispatch has finished and the OS watch resource has been released, so
//! the process never exits mid-dispatch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::backend::Backend;
use crate::dispatch;
use crate::Result;

use super::event::{ready_subtree, WatchEvent};
use super::preempt::{PreemptFilter, Verdict};
use super::source::EventSource;
use super::strategy::WatchStrategy;

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// How a watch invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The strategy signaled stop, or the upstream event stream ended.
    Completed,
    /// The abort marker was observed.
    Preempted,
    /// An OS signal (SIGINT/SIGTERM) stopped the watch.
    Interrupted,
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Watch `root` until the strategy, the abort marker, an OS signal, or an
/// upstream error stops the pipeline.
///
/// # Errors
///
/// Returns an error if the watch cannot be established (before any
/// dispatch occurs) or if the upstream OS watch reports a stream error
/// mid-run (terminal).
pub async fn execute(
    root: &Path,
    backends: &[Arc<dyn Backend>],
    mut strategy: WatchStrategy,
    abort_marker: PathBuf,
    mut interrupt: broadcast::Receiver<()>,
) -> Result<WatchOutcome> {
    let (source, mut events) = EventSource::start(root)?;
    tracing::info!("Watching {} for subtrees marked ready...", root.display());

    let filter = PreemptFilter::new(abort_marker);
    let outcome = run_pipeline(
        &mut events,
        &filter,
        &mut strategy,
        backends,
        &mut interrupt,
    )
    .await;

    let stopped = source.stop();
    let outcome = outcome?;
    stopped?;
    Ok(outcome)
}

/// The event loop itself, over an already-established event stream.
///
/// Split out from [`execute`] so tests can drive the pipeline with an
/// injected channel instead of a live OS watch.
pub async fn run_pipeline(
    events: &mut mpsc::Receiver<Result<WatchEvent>>,
    filter: &PreemptFilter,
    strategy: &mut WatchStrategy,
    backends: &[Arc<dyn Backend>],
    interrupt: &mut broadcast::Receiver<()>,
) -> Result<WatchOutcome> {
    let mut interrupt_open = true;
    loop {
        let next = tokio::select! {
            next = events.recv() => next,
            result = interrupt.recv(), if interrupt_open => {
                match result {
                    // Lagging just means more than one signal queued up
                    // before we polled; any of them is still an interrupt.
                    Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        tracing::info!("Interrupt received, stopping watch");
                        return Ok(WatchOutcome::Interrupted);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        // All signal senders dropped; stop polling this arm.
                        interrupt_open = false;
                        continue;
                    }
                }
            }
        };

        let Some(event) = next else {
            tracing::info!("Event stream ended");
            return Ok(WatchOutcome::Completed);
        };
        let event = event?;

        if filter.check(&event) == Verdict::Abort {
            tracing::info!("Abort signal detected");
            return Ok(WatchOutcome::Preempted);
        }

        if let Some(subtree) = ready_subtree(&event) {
            tracing::info!("Subtree ready: {}", subtree.display());
            dispatch::dispatch(subtree, backends, || dispatch::mark_complete(subtree)).await;
            strategy.note_ready();
        }
        strategy.observe(&event);

        if strategy.should_stop() {
            tracing::info!("All operations signaled complete.");
            return Ok(WatchOutcome::Completed);
        }
    }
}
