//! Preview controller.
//!
//! Rebuilds the sandbox document on every buffer change, pushes it into the
//! render host and tracks the loading state.

use cw_sandbox::{BuildOptions, Language, SandboxDocument, SourceBuffers, build_document};
use tokio::sync::watch;

use crate::host::RenderHost;
use crate::state::{Generation, PreviewState, PreviewStatus};

/// Drives one render host from a set of source buffers.
///
/// There is no cancellation: a change that arrives while the previous
/// document is still loading simply replaces it. Completion signals for a
/// superseded generation are ignored.
pub struct PreviewController<H> {
    host: H,
    options: BuildOptions,
    buffers: SourceBuffers,
    document: SandboxDocument,
    generation: Generation,
    state: PreviewState,
    status: watch::Sender<PreviewStatus>,
}

impl<H: RenderHost> PreviewController<H> {
    /// Mount a preview: build the initial document and load it into `host`.
    ///
    /// The controller starts in [`PreviewState::Loading`].
    pub fn mount(host: H, buffers: SourceBuffers, options: BuildOptions) -> Self {
        let document = build_document(&buffers, &options);
        let (status, _rx) = watch::channel(PreviewStatus::default());

        let mut controller = Self {
            host,
            options,
            buffers,
            document,
            generation: Generation::default(),
            state: PreviewState::Loading,
            status,
        };
        controller.assign();
        controller
    }

    /// Apply an editor change to one buffer.
    ///
    /// Rebuilds and reloads when the text differs. Returns `true` if a reload
    /// was triggered.
    pub fn update(&mut self, language: Language, text: impl Into<String>) -> bool {
        if !self.buffers.set(language, text) {
            return false;
        }
        tracing::debug!(%language, "Buffer changed");
        self.rebuild();
        true
    }

    /// Replace all three buffers at once.
    ///
    /// Returns `true` if any buffer differed and a reload was triggered.
    pub fn replace_buffers(&mut self, buffers: SourceBuffers) -> bool {
        if self.buffers == buffers {
            return false;
        }
        self.buffers = buffers;
        self.rebuild();
        true
    }

    /// Collapse whitespace in one buffer. Returns `true` if a reload was triggered.
    pub fn format(&mut self, language: Language) -> bool {
        if !self.buffers.format(language) {
            return false;
        }
        self.rebuild();
        true
    }

    /// Empty one buffer. Returns `true` if a reload was triggered.
    pub fn clear(&mut self, language: Language) -> bool {
        if !self.buffers.clear(language) {
            return false;
        }
        self.rebuild();
        true
    }

    /// Change build options and reload.
    pub fn set_options(&mut self, options: BuildOptions) {
        self.options = options;
        self.rebuild();
    }

    /// Reload the host with the current document, unchanged.
    ///
    /// A host stuck in user code is replaced by the new assignment. Returns
    /// the generation of the new assignment.
    pub fn refresh(&mut self) -> Generation {
        tracing::debug!(generation = %self.generation, "Manual refresh");
        self.assign();
        self.generation
    }

    /// Handle the host's load-complete signal for `generation`.
    ///
    /// Moves to [`PreviewState::Ready`] when `generation` is the current one.
    /// Returns `true` if the state changed.
    pub fn on_load_complete(&mut self, generation: Generation) -> bool {
        if generation != self.generation {
            tracing::debug!(
                %generation,
                current = %self.generation,
                "Ignoring load completion for superseded generation"
            );
            return false;
        }
        if self.state == PreviewState::Ready {
            return false;
        }
        self.set_state(PreviewState::Ready);
        tracing::info!(%generation, "Preview ready");
        true
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PreviewState {
        self.state
    }

    /// Generation of the most recent assignment.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Current state and generation.
    #[must_use]
    pub fn status(&self) -> PreviewStatus {
        PreviewStatus {
            state: self.state,
            generation: self.generation,
        }
    }

    /// The document most recently assigned to the host.
    #[must_use]
    pub fn document(&self) -> &SandboxDocument {
        &self.document
    }

    /// Current buffers.
    #[must_use]
    pub fn buffers(&self) -> &SourceBuffers {
        &self.buffers
    }

    /// Current build options.
    #[must_use]
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// The render host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PreviewStatus> {
        self.status.subscribe()
    }

    /// Rebuild the document from the current buffers and assign it.
    fn rebuild(&mut self) {
        self.document = build_document(&self.buffers, &self.options);
        self.assign();
    }

    /// Assign the current document to the host under a new generation.
    fn assign(&mut self) {
        self.generation = self.generation.next();
        self.set_state(PreviewState::Loading);
        self.host.load(self.generation, &self.document);
        tracing::debug!(
            generation = %self.generation,
            bytes = self.document.len(),
            "Assigned document to render host"
        );
    }

    fn set_state(&mut self, state: PreviewState) {
        self.state = state;
        self.status.send_replace(PreviewStatus {
            state,
            generation: self.generation,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingHost;
    use pretty_assertions::assert_eq;

    fn mount(buffers: SourceBuffers) -> PreviewController<RecordingHost> {
        PreviewController::mount(RecordingHost::new(), buffers, BuildOptions::default())
    }

    #[test]
    fn test_mount_loads_initial_document() {
        let controller = mount(SourceBuffers::starter());

        assert_eq!(controller.state(), PreviewState::Loading);
        assert_eq!(controller.generation(), Generation::new(1));
        assert_eq!(controller.host().loads().len(), 1);
        assert_eq!(
            controller.host().loads()[0].document,
            build_document(&SourceBuffers::starter(), &BuildOptions::default())
        );
    }

    #[test]
    fn test_load_complete_moves_to_ready() {
        let mut controller = mount(SourceBuffers::starter());

        assert!(controller.on_load_complete(Generation::new(1)));
        assert_eq!(controller.state(), PreviewState::Ready);
    }

    #[test]
    fn test_stylesheet_edit_cycles_loading_and_ready() {
        let mut controller = mount(SourceBuffers::new("", "body{color:red}", ""));
        let mut observed = vec![controller.state()];

        controller.on_load_complete(controller.generation());
        observed.push(controller.state());

        assert!(controller.update(Language::Stylesheet, "body{color:blue}"));
        observed.push(controller.state());

        controller.on_load_complete(controller.generation());
        observed.push(controller.state());

        assert_eq!(
            observed,
            vec![
                PreviewState::Loading,
                PreviewState::Ready,
                PreviewState::Loading,
                PreviewState::Ready,
            ]
        );
        let loads = controller.host().loads();
        assert_eq!(loads.len(), 2);
        assert!(loads[0].document.as_str().contains("body{color:red}"));
        assert!(loads[1].document.as_str().contains("body{color:blue}"));
    }

    #[test]
    fn test_unchanged_text_does_not_reload() {
        let mut controller = mount(SourceBuffers::new("", "body{}", ""));
        controller.on_load_complete(controller.generation());

        assert!(!controller.update(Language::Stylesheet, "body{}"));
        assert_eq!(controller.state(), PreviewState::Ready);
        assert_eq!(controller.host().loads().len(), 1);
    }

    #[test]
    fn test_refresh_reassigns_identical_document() {
        let mut controller = mount(SourceBuffers::starter());
        controller.on_load_complete(controller.generation());

        let first = controller.refresh();
        assert_eq!(controller.state(), PreviewState::Loading);
        let second = controller.refresh();

        assert!(second > first);
        let loads = controller.host().loads();
        assert_eq!(loads.len(), 3);
        assert_eq!(loads[1].document.as_str(), loads[2].document.as_str());
        assert_eq!(loads[0].document, loads[1].document);
    }

    #[test]
    fn test_rapid_edits_collapse_to_latest() {
        let mut controller = mount(SourceBuffers::default());

        controller.update(Language::Stylesheet, "a{}");
        controller.update(Language::Stylesheet, "b{}");

        // The first two assignments were superseded before completing.
        assert!(!controller.on_load_complete(Generation::new(1)));
        assert!(!controller.on_load_complete(Generation::new(2)));
        assert_eq!(controller.state(), PreviewState::Loading);

        assert!(controller.on_load_complete(Generation::new(3)));
        assert_eq!(controller.state(), PreviewState::Ready);
        assert!(controller.document().as_str().contains("b{}"));
    }

    #[test]
    fn test_duplicate_load_complete_is_ignored() {
        let mut controller = mount(SourceBuffers::default());

        assert!(controller.on_load_complete(Generation::new(1)));
        assert!(!controller.on_load_complete(Generation::new(1)));
        assert_eq!(controller.state(), PreviewState::Ready);
    }

    #[test]
    fn test_replace_buffers() {
        let mut controller = mount(SourceBuffers::default());

        assert!(!controller.replace_buffers(SourceBuffers::default()));
        assert!(controller.replace_buffers(SourceBuffers::starter()));
        assert_eq!(controller.buffers(), &SourceBuffers::starter());
        assert_eq!(controller.host().loads().len(), 2);
    }

    #[test]
    fn test_structure_edit_reloads_identical_document() {
        let mut controller = mount(SourceBuffers::default());

        assert!(controller.update(Language::Structure, "<p>ignored</p>"));

        let loads = controller.host().loads();
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[0].document, loads[1].document);
    }

    #[test]
    fn test_clear_and_format() {
        let mut controller = mount(SourceBuffers::starter());

        assert!(controller.format(Language::Stylesheet));
        assert!(!controller.buffers().stylesheet.contains('\n'));
        assert!(controller.clear(Language::Component));
        assert!(!controller.clear(Language::Component));
        assert_eq!(controller.host().loads().len(), 3);
    }

    #[test]
    fn test_set_options_rebuilds() {
        let mut controller = mount(SourceBuffers::default());

        controller.set_options(BuildOptions {
            report_load_failures: true,
            ..BuildOptions::default()
        });

        assert!(controller.document().as_str().contains("__reportBundleFailure"));
        assert_eq!(controller.generation(), Generation::new(2));
    }

    #[test]
    fn test_subscribers_observe_transitions() {
        let mut controller = mount(SourceBuffers::default());
        let rx = controller.subscribe();

        assert_eq!(
            *rx.borrow(),
            PreviewStatus {
                state: PreviewState::Loading,
                generation: Generation::new(1),
            }
        );

        controller.on_load_complete(Generation::new(1));
        assert_eq!(rx.borrow().state, PreviewState::Ready);

        controller.refresh();
        assert_eq!(
            *rx.borrow(),
            PreviewStatus {
                state: PreviewState::Loading,
                generation: Generation::new(2),
            }
        );
    }
}
