//! Filesystem event source
//!
//! One OS-level recursive watch per watch root, forwarded into a tokio
//! channel. Only events observed after subscription are delivered:
//! pre-existing ready markers are not retroactively signaled.

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::{Error, Result};

use super::event::WatchEvent;

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// A live recursive watch on one root directory.
///
/// Owns the OS watch resource; dropping or [`EventSource::stop`]-ping it
/// releases the watch. Stream errors from the OS are delivered in-band as
/// `Err` items on the receiver and are terminal for the pipeline.
pub struct EventSource {
    watcher: RecommendedWatcher,
    root: PathBuf,
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

impl EventSource {
    /// Start watching `root` recursively.
    ///
    /// # Errors
    ///
    /// Returns a watch-establishment error if the OS watch cannot be
    /// created or the root cannot be subscribed (e.g. it was deleted
    /// concurrently). This failure surfaces before any dispatch occurs.
    pub fn start(root: &Path) -> Result<(Self, mpsc::Receiver<Result<WatchEvent>>)> {
        let (tx, rx) = mpsc::channel(1024);

        let mut watcher = notify::recommended_watcher(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    WatchEvent::from_notify(event).into_iter().for_each(|event| {
                        let _ = tx.blocking_send(Ok(event));
                    });
                }
                Err(err) => {
                    let _ = tx.blocking_send(Err(Error::watch_error(err.to_string())));
                }
            },
        )?;
        watcher.watch(root, RecursiveMode::Recursive)?;

        tracing::debug!("Watching {} recursively", root.display());
        Ok((
            Self {
                watcher,
                root: root.to_path_buf(),
            },
            rx,
        ))
    }

    /// Stop watching and release the OS watch resource.
    pub fn stop(mut self) -> Result<()> {
        self.watcher.unwatch(&self.root)?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_fails_for_missing_root() {
        let result = EventSource::start(Path::new("/nonexistent/bowser/watch/root"));
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(matches!(err, Error::System(_)));
        }
    }

    #[tokio::test]
    async fn test_creation_events_are_delivered() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (source, mut rx) = EventSource::start(dir.path())?;

        let marker = dir.path().join(".bowser.ready");
        std::fs::write(&marker, b"")?;

        // The OS watch thread delivers asynchronously; wait with a cap.
        let event = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            loop {
                match rx.recv().await {
                    Some(Ok(event)) if event.path == marker => break Ok(event),
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => break Err(err),
                    None => break Err(Error::watch_error("stream ended")),
                }
            }
        })
        .await
        .map_err(|_| Error::watch_error("timed out waiting for event"))??;

        assert_eq!(event.path, marker);
        source.stop()
    }
}
