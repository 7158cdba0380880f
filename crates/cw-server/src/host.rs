//! Browser-backed render host.
//!
//! The actual isolated context is an `<iframe sandbox="allow-scripts">` on
//! the workspace page. [`BrowserHost`] tells connected pages which generation
//! to load; the page fetches `/preview/{generation}` and reports back over the
//! WebSocket once the iframe fires `load`.

use cw_preview::{Generation, PreviewState, RenderHost};
use cw_sandbox::{Language, SandboxDocument};
use serde::Serialize;
use tokio::sync::broadcast;

/// Event sent to connected WebSocket clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum PreviewEvent {
    /// Load the given generation into the preview iframe.
    Load { generation: Generation },
    /// Preview state changed.
    State {
        state: PreviewState,
        generation: Generation,
    },
    /// A buffer changed outside the page (project file edited on disk).
    Changed { language: Language },
}

/// Render host that forwards assignments to browser clients.
pub(crate) struct BrowserHost {
    events: broadcast::Sender<PreviewEvent>,
}

impl BrowserHost {
    /// Create a host broadcasting on `events`.
    pub(crate) fn new(events: broadcast::Sender<PreviewEvent>) -> Self {
        Self { events }
    }
}

impl RenderHost for BrowserHost {
    fn load(&mut self, generation: Generation, _document: &SandboxDocument) {
        // No subscribers just means no page is open yet.
        let _ = self.events.send(PreviewEvent::Load { generation });
    }
}
