//! Event debouncing for project files.
//!
//! Editors emit several events per save (truncate, write, rename). Events are
//! coalesced per buffer so each save produces one reload.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use cw_sandbox::Language;

/// Kind of filesystem event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FileChange {
    /// File created or its content changed.
    Written,
    /// File removed or renamed away.
    Removed,
}

/// A debounced change to one project file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BufferChange {
    pub language: Language,
    pub change: FileChange,
}

/// Pending change waiting to be emitted.
struct Pending {
    change: FileChange,
    deadline: Instant,
}

/// Thread-safe event debouncer keyed by buffer.
///
/// The most recent change wins; each new event pushes the deadline back.
pub(crate) struct ChangeDebouncer {
    pending: Mutex<HashMap<Language, Pending>>,
    window: Duration,
}

impl ChangeDebouncer {
    /// Create a debouncer with the given quiet window.
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            window,
        }
    }

    /// Record a change for `language`.
    pub(crate) fn record(&self, language: Language, change: FileChange) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.insert(
            language,
            Pending {
                change,
                deadline: Instant::now() + self.window,
            },
        );
    }

    /// Drain changes whose quiet window has elapsed, in tab order.
    pub(crate) fn drain_ready(&self) -> Vec<BufferChange> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        Language::ALL
            .into_iter()
            .filter_map(|language| {
                let ready = pending.get(&language)?.deadline <= now;
                let entry = if ready { pending.remove(&language) } else { None }?;
                Some(BufferChange {
                    language,
                    change: entry.change,
                })
            })
            .collect()
    }

    /// Number of buffers with pending changes.
    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
