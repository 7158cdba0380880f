//! Project file watcher.
//!
//! Watches the three project files and pushes their content into the preview
//! controller when they change on disk.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cw_config::ProjectConfig;
use cw_sandbox::Language;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};

use super::debouncer::{BufferChange, ChangeDebouncer, FileChange};
use crate::host::PreviewEvent;
use crate::project;
use crate::state::{SharedPreview, lock_preview};

/// Default debounce duration in milliseconds.
const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// How often debounced changes are drained.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Watches project files and reloads the preview when they change.
pub(crate) struct ProjectWatcher {
    project: ProjectConfig,
    preview: SharedPreview,
    events: broadcast::Sender<PreviewEvent>,
    watcher: Option<RecommendedWatcher>,
    debounce_ms: u64,
}

impl ProjectWatcher {
    /// Create a watcher for `project` driving `preview`.
    #[must_use]
    pub(crate) fn new(
        project: ProjectConfig,
        preview: SharedPreview,
        events: broadcast::Sender<PreviewEvent>,
    ) -> Self {
        Self {
            project,
            preview,
            events,
            watcher: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }

    /// Set the debounce duration in milliseconds.
    #[must_use]
    pub(crate) fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Start watching.
    ///
    /// Spawns two background tasks: one records raw events into the
    /// debouncer, the other applies debounced changes to the preview.
    ///
    /// # Errors
    ///
    /// Returns an error if the file watcher cannot be created.
    pub(crate) fn start(&mut self) -> Result<(), notify::Error> {
        let (tx, mut rx) = mpsc::channel::<Event>(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;
        watcher.watch(&self.project.dir, RecursiveMode::NonRecursive)?;
        self.watcher = Some(watcher);

        let debouncer = Arc::new(ChangeDebouncer::new(Duration::from_millis(
            self.debounce_ms,
        )));

        let recorder = Arc::clone(&debouncer);
        let project = self.project.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                record_event(&event, &project, &recorder);
            }
        });

        let project = self.project.clone();
        let preview = Arc::clone(&self.preview);
        let events = self.events.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            loop {
                interval.tick().await;
                for change in debouncer.drain_ready() {
                    apply_change(change, &project, &preview, &events);
                }
            }
        });

        tracing::info!(dir = %self.project.dir.display(), "Watching project files");
        Ok(())
    }
}

/// Map a notify event kind to a file change.
fn classify(kind: &EventKind) -> Option<FileChange> {
    match kind {
        EventKind::Create(_) | EventKind::Modify(_) => Some(FileChange::Written),
        EventKind::Remove(_) => Some(FileChange::Removed),
        _ => None,
    }
}

/// Buffer backed by `path`, if it is one of the project files.
fn language_for_path(path: &Path, project: &ProjectConfig) -> Option<Language> {
    let name = path.file_name()?.to_str()?;
    project.language_for(name)
}

/// Record a raw filesystem event into the debouncer.
fn record_event(event: &Event, project: &ProjectConfig, debouncer: &ChangeDebouncer) {
    let Some(change) = classify(&event.kind) else {
        return;
    };

    for path in &event.paths {
        let Some(language) = language_for_path(path, project) else {
            continue;
        };
        debouncer.record(language, change);
        tracing::debug!(path = %path.display(), ?change, "Recorded filesystem event");
    }
}

/// Push a debounced change into the preview.
///
/// Renames are reported as a removal of the old name and a modification of
/// the new one, so the file is always re-read rather than trusting the kind.
fn apply_change(
    change: BufferChange,
    project: &ProjectConfig,
    preview: &SharedPreview,
    events: &broadcast::Sender<PreviewEvent>,
) {
    let start = Instant::now();
    let BufferChange { language, change } = change;

    let text = match project::read_buffer(project, language) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(%language, error = %e, "Failed to read project file");
            return;
        }
    };

    let changed = lock_preview(preview).update(language, text);
    if !changed {
        return;
    }
    let _ = events.send(PreviewEvent::Changed { language });

    tracing::info!(
        %language,
        ?change,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Project file change applied"
    );
}
