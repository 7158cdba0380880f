//! Recording render host for testing.
//!
//! Provides [`RecordingHost`] for exercising the controller without a browser.

use cw_sandbox::SandboxDocument;

use crate::host::RenderHost;
use crate::state::Generation;

/// One content assignment observed by a [`RecordingHost`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostLoad {
    /// Generation passed with the assignment.
    pub generation: Generation,
    /// Document assigned.
    pub document: SandboxDocument,
}

/// Render host that records assignments and never executes anything.
///
/// # Example
///
/// ```ignore
/// use cw_preview::{PreviewController, RecordingHost};
/// use cw_sandbox::{BuildOptions, SourceBuffers};
///
/// let mut controller =
///     PreviewController::mount(RecordingHost::new(), SourceBuffers::default(), BuildOptions::default());
/// controller.refresh();
/// assert_eq!(controller.host().loads().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct RecordingHost {
    loads: Vec<HostLoad>,
}

impl RecordingHost {
    /// Create an empty recording host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All assignments in order.
    #[must_use]
    pub fn loads(&self) -> &[HostLoad] {
        &self.loads
    }

    /// Most recent assignment.
    #[must_use]
    pub fn last(&self) -> Option<&HostLoad> {
        self.loads.last()
    }
}

impl RenderHost for RecordingHost {
    fn load(&mut self, generation: Generation, document: &SandboxDocument) {
        self.loads.push(HostLoad {
            generation,
            document: document.clone(),
        });
    }
}
