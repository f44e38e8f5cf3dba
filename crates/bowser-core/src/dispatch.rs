//! Backend fan-out
//!
//! For each ready subtree, every configured backend's upload runs as its
//! own task on the shared runtime. The dispatch waits for all of them
//! before firing the completion callback, so the subtree's complete marker
//! is only written after every backend has been attempted.
//!
//! A single backend's failure is logged with enough context to identify
//! the backend and the subtree, and does not abort the other backends'
//! attempts nor the overall watch. No retry happens here; retry safety is
//! pushed down into the backends' idempotent upload protocol.

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::backend::Backend;
use crate::markers;

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Concurrently invoke every backend's upload for `subtree`, wait for all
/// of them, then run `callback`. Zero backends is a legal no-op dispatch
/// (the callback still fires).
pub async fn dispatch<F>(subtree: &Path, backends: &[Arc<dyn Backend>], callback: F)
where
    F: FnOnce(),
{
    let mut uploads = JoinSet::new();
    for backend in backends {
        let backend = Arc::clone(backend);
        let subtree = subtree.to_path_buf();
        uploads.spawn(async move {
            let name = backend.name();
            (name, backend.upload(&subtree).await)
        });
    }

    while let Some(joined) = uploads.join_next().await {
        match joined {
            Ok((name, Ok(()))) => {
                tracing::debug!("Backend '{name}' finished syncing {}", subtree.display());
            }
            Ok((name, Err(err))) => {
                tracing::error!(
                    "Exception in backend sync operation (backend '{name}', subtree {}): {err}",
                    subtree.display()
                );
            }
            Err(err) => {
                tracing::error!("Backend sync task for {} panicked: {err}", subtree.display());
            }
        }
    }

    callback();
    tracing::debug!("Backend operation complete.");
}

/// The standard completion callback: touch `<subtree>/.bowser.complete`.
///
/// Failure to write the marker is logged, not propagated; the uploads
/// themselves have already been attempted at this point.
pub fn mark_complete(subtree: &Path) {
    let marker = subtree.join(markers::COMPLETE);
    if let Err(err) = std::fs::write(&marker, b"") {
        tracing::warn!(
            "Failed to write completion marker {}: {err}",
            marker.display()
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
