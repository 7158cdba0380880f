//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cw_preview::{PreviewController, PreviewStatus};
use tokio::sync::{broadcast, watch};

use crate::host::{BrowserHost, PreviewEvent};
use crate::live_reload::ProjectWatcher;

/// Preview controller shared between handlers and the project watcher.
pub(crate) type SharedPreview = Arc<Mutex<PreviewController<BrowserHost>>>;

/// Lock the shared preview, recovering from a poisoned lock.
pub(crate) fn lock_preview(preview: &SharedPreview) -> MutexGuard<'_, PreviewController<BrowserHost>> {
    preview.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Preview controller driving the browser host.
    pub(crate) preview: SharedPreview,
    /// Events forwarded to WebSocket clients.
    pub(crate) events: broadcast::Sender<PreviewEvent>,
    /// Preview state observer.
    pub(crate) status: watch::Receiver<PreviewStatus>,
    /// Project file watcher (if enabled). Held to keep watching alive.
    pub(crate) watcher: Option<ProjectWatcher>,
    /// Application version.
    pub(crate) version: String,
}

impl AppState {
    /// Create application state around a mounted preview.
    pub(crate) fn new(
        preview: SharedPreview,
        events: broadcast::Sender<PreviewEvent>,
        watcher: Option<ProjectWatcher>,
        version: String,
    ) -> Self {
        let status = lock_preview(&preview).subscribe();
        Self {
            preview,
            events,
            status,
            watcher,
            version,
        }
    }

    /// Lock the preview controller.
    pub(crate) fn preview(&self) -> MutexGuard<'_, PreviewController<BrowserHost>> {
        lock_preview(&self.preview)
    }

    /// Check if project files are watched.
    #[must_use]
    pub(crate) fn watching(&self) -> bool {
        self.watcher.is_some()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use cw_sandbox::{BuildOptions, SourceBuffers};

    /// Build state around the given buffers without a watcher.
    pub(crate) fn state_with(buffers: SourceBuffers) -> Arc<AppState> {
        let (events, _rx) = broadcast::channel(100);
        let host = BrowserHost::new(events.clone());
        let preview = Arc::new(Mutex::new(PreviewController::mount(
            host,
            buffers,
            BuildOptions::default(),
        )));
        Arc::new(AppState::new(preview, events, None, "test".to_owned()))
    }
}
