//! The isolated context that displays preview documents.

use cw_sandbox::SandboxDocument;

use crate::state::Generation;

/// An isolated execution context for sandbox documents.
///
/// Implementations must:
///
/// - replace any previous content and global state on every [`load`](Self::load)
/// - keep user code away from the embedding application (no shared storage,
///   no navigation of the parent, no network beyond the document's scripts)
/// - report exactly once per assignment that the content finished loading, by
///   passing the assignment's generation to
///   [`PreviewController::on_load_complete`](crate::PreviewController::on_load_complete)
///
/// `load` must not block on the document's execution.
pub trait RenderHost {
    /// Assign `document` as the host's entire content.
    fn load(&mut self, generation: Generation, document: &SandboxDocument);
}

impl<H: RenderHost + ?Sized> RenderHost for Box<H> {
    fn load(&mut self, generation: Generation, document: &SandboxDocument) {
        (**self).load(generation, document);
    }
}
