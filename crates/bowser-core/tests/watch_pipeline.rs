//! End-to-end pipeline tests over an injected event stream.
//!
//! These drive `run_pipeline` directly with fabricated events, so every
//! scenario is deterministic and independent of OS watch timing.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use bowser_core::watch::{run_pipeline, EventKind, PreemptFilter, WatchEvent, WatchOutcome, WatchStrategy};
use bowser_core::{markers, Backend, Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Test fixtures
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct RecordingBackend {
    subtrees: std::sync::Mutex<Vec<PathBuf>>,
    calls: AtomicUsize,
    fail: bool,
}

impl RecordingBackend {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            subtrees: std::sync::Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn seen_subtrees(&self) -> Vec<PathBuf> {
        self.subtrees
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    fn name(&self) -> String {
        "recording".into()
    }

    async fn upload(&self, subtree: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.subtrees
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(subtree.to_path_buf());
        if self.fail {
            Err(Error::backend_error("recording", subtree, "induced failure"))
        } else {
            Ok(())
        }
    }
}

fn created(path: impl Into<PathBuf>) -> WatchEvent {
    WatchEvent {
        path: path.into(),
        kind: EventKind::Created,
        is_dir: false,
    }
}

fn as_backends(backends: &[Arc<RecordingBackend>]) -> Vec<Arc<dyn Backend>> {
    backends
        .iter()
        .map(|b| Arc::clone(b) as Arc<dyn Backend>)
        .collect()
}

struct Harness {
    events: mpsc::Receiver<Result<WatchEvent>>,
    sender: mpsc::Sender<Result<WatchEvent>>,
    filter: PreemptFilter,
    interrupt_tx: broadcast::Sender<()>,
    interrupt: broadcast::Receiver<()>,
}

fn harness(root: &Path) -> Harness {
    let (sender, events) = mpsc::channel(64);
    let (interrupt_tx, interrupt) = broadcast::channel(1);
    Harness {
        events,
        sender,
        filter: PreemptFilter::new(root.join(markers::ABORT)),
        interrupt_tx,
        interrupt,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scenarios
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn test_sentinel_watch_dispatches_then_completes() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    let subtree = root.join("app1");
    std::fs::create_dir(&subtree)?;

    let mut h = harness(root);
    let backend = RecordingBackend::new(false);
    let backends = as_backends(&[Arc::clone(&backend)]);
    let mut strategy = WatchStrategy::sentinel(root);

    h.sender
        .send(Ok(created(subtree.join(markers::READY))))
        .await
        .map_err(|e| Error::io_error(e.to_string()))?;
    h.sender
        .send(Ok(created(root.join(markers::COMPLETE))))
        .await
        .map_err(|e| Error::io_error(e.to_string()))?;

    let outcome = run_pipeline(
        &mut h.events,
        &h.filter,
        &mut strategy,
        &backends,
        &mut h.interrupt,
    )
    .await?;

    assert_eq!(outcome, WatchOutcome::Completed);
    assert_eq!(backend.call_count(), 1);
    assert_eq!(backend.seen_subtrees(), vec![subtree.clone()]);
    // Dispatch marks the subtree complete after every backend ran.
    assert!(subtree.join(markers::COMPLETE).exists());
    Ok(())
}

#[tokio::test]
async fn test_count_watch_stops_after_nth_dispatch() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    for name in ["app1", "app2", "app3"] {
        std::fs::create_dir(root.join(name))?;
    }

    let mut h = harness(root);
    let backend = RecordingBackend::new(false);
    let backends = as_backends(&[Arc::clone(&backend)]);
    let mut strategy = WatchStrategy::count(2);

    // Three ready signals queued; the watch must stop at the second,
    // leaving the third unread.
    for name in ["app1", "app2", "app3"] {
        h.sender
            .send(Ok(created(root.join(name).join(markers::READY))))
            .await
            .map_err(|e| Error::io_error(e.to_string()))?;
    }

    let outcome = run_pipeline(
        &mut h.events,
        &h.filter,
        &mut strategy,
        &backends,
        &mut h.interrupt,
    )
    .await?;

    assert_eq!(outcome, WatchOutcome::Completed);
    assert_eq!(backend.call_count(), 2);
    assert_eq!(
        backend.seen_subtrees(),
        vec![root.join("app1"), root.join("app2")]
    );
    assert!(!root.join("app3").join(markers::COMPLETE).exists());
    Ok(())
}

#[tokio::test]
async fn test_abort_marker_preempts_queued_ready_signals() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    std::fs::create_dir(root.join("app1"))?;

    let mut h = harness(root);
    let backend = RecordingBackend::new(false);
    let backends = as_backends(&[Arc::clone(&backend)]);
    let mut strategy = WatchStrategy::sentinel(root);

    // The abort marker arrives ahead of a ready signal still buffered
    // behind it; the ready signal must never dispatch.
    h.sender
        .send(Ok(created(root.join(markers::ABORT))))
        .await
        .map_err(|e| Error::io_error(e.to_string()))?;
    h.sender
        .send(Ok(created(root.join("app1").join(markers::READY))))
        .await
        .map_err(|e| Error::io_error(e.to_string()))?;

    let outcome = run_pipeline(
        &mut h.events,
        &h.filter,
        &mut strategy,
        &backends,
        &mut h.interrupt,
    )
    .await?;

    assert_eq!(outcome, WatchOutcome::Preempted);
    assert_eq!(backend.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_one_backend_failure_does_not_stop_the_watch() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    let subtree = root.join("app1");
    std::fs::create_dir(&subtree)?;

    let mut h = harness(root);
    let failing = RecordingBackend::new(true);
    let healthy = RecordingBackend::new(false);
    let backends = as_backends(&[Arc::clone(&failing), Arc::clone(&healthy)]);
    let mut strategy = WatchStrategy::count(1);

    h.sender
        .send(Ok(created(subtree.join(markers::READY))))
        .await
        .map_err(|e| Error::io_error(e.to_string()))?;

    let outcome = run_pipeline(
        &mut h.events,
        &h.filter,
        &mut strategy,
        &backends,
        &mut h.interrupt,
    )
    .await?;

    assert_eq!(outcome, WatchOutcome::Completed);
    assert_eq!(failing.call_count(), 1);
    assert_eq!(healthy.call_count(), 1);
    // The subtree is still marked complete; partial failure is recovered.
    assert!(subtree.join(markers::COMPLETE).exists());
    Ok(())
}

#[tokio::test]
async fn test_repeated_ready_signal_dispatches_again() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    let subtree = root.join("app1");
    std::fs::create_dir(&subtree)?;

    let mut h = harness(root);
    let backend = RecordingBackend::new(false);
    let backends = as_backends(&[Arc::clone(&backend)]);
    let mut strategy = WatchStrategy::count(2);

    // Re-signaling the same subtree is a retry, not a duplicate to drop.
    for _ in 0..2 {
        h.sender
            .send(Ok(created(subtree.join(markers::READY))))
            .await
            .map_err(|e| Error::io_error(e.to_string()))?;
    }

    let outcome = run_pipeline(
        &mut h.events,
        &h.filter,
        &mut strategy,
        &backends,
        &mut h.interrupt,
    )
    .await?;

    assert_eq!(outcome, WatchOutcome::Completed);
    assert_eq!(backend.call_count(), 2);
    assert_eq!(backend.seen_subtrees(), vec![subtree.clone(), subtree]);
    Ok(())
}

#[tokio::test]
async fn test_closed_stream_ends_the_watch() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    let mut h = harness(root);
    let mut strategy = WatchStrategy::sentinel(root);
    drop(h.sender);

    let outcome = run_pipeline(&mut h.events, &h.filter, &mut strategy, &[], &mut h.interrupt)
        .await?;
    assert_eq!(outcome, WatchOutcome::Completed);
    Ok(())
}

#[tokio::test]
async fn test_upstream_error_is_terminal() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    let mut h = harness(root);
    let mut strategy = WatchStrategy::sentinel(root);

    h.sender
        .send(Err(Error::watch_error("watch descriptor lost")))
        .await
        .map_err(|e| Error::io_error(e.to_string()))?;

    let result = run_pipeline(&mut h.events, &h.filter, &mut strategy, &[], &mut h.interrupt)
        .await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_interrupt_stops_an_idle_watch() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    let mut h = harness(root);
    let mut strategy = WatchStrategy::sentinel(root);

    h.interrupt_tx
        .send(())
        .map_err(|e| Error::io_error(e.to_string()))?;

    let outcome = run_pipeline(&mut h.events, &h.filter, &mut strategy, &[], &mut h.interrupt)
        .await?;
    assert_eq!(outcome, WatchOutcome::Interrupted);
    Ok(())
}

#[tokio::test]
async fn test_stacked_interrupts_still_stop_the_watch() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    let mut h = harness(root);
    let mut strategy = WatchStrategy::sentinel(root);

    // Two signals land before the pipeline polls the capacity-1 channel
    // (SIGINT followed by a SIGTERM escalation); the overflow must still
    // read as an interrupt, not be dropped.
    for _ in 0..2 {
        h.interrupt_tx
            .send(())
            .map_err(|e| Error::io_error(e.to_string()))?;
    }

    let outcome = run_pipeline(&mut h.events, &h.filter, &mut strategy, &[], &mut h.interrupt)
        .await?;
    assert_eq!(outcome, WatchOutcome::Interrupted);
    Ok(())
}
