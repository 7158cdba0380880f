//! Live preview controller for CodeWorkspace.
//!
//! The [`PreviewController`] owns one [`RenderHost`], the isolated context
//! that displays a [`SandboxDocument`](cw_sandbox::SandboxDocument). Every
//! buffer change rebuilds the document and reloads the host in full; the host
//! reports back once per assignment through
//! [`PreviewController::on_load_complete`].
//!
//! ```text
//! Loading ──(load complete)──► Ready ──(buffers change | refresh)──► Loading
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cw_preview::{PreviewController, PreviewState, RecordingHost};
//! use cw_sandbox::{BuildOptions, Language, SourceBuffers};
//!
//! let mut controller =
//!     PreviewController::mount(RecordingHost::new(), SourceBuffers::starter(), BuildOptions::default());
//! assert_eq!(controller.state(), PreviewState::Loading);
//!
//! controller.on_load_complete(controller.generation());
//! assert_eq!(controller.state(), PreviewState::Ready);
//!
//! controller.update(Language::Stylesheet, "body { color: blue; }");
//! assert_eq!(controller.state(), PreviewState::Loading);
//! ```

mod controller;
mod host;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod state;

pub use controller::PreviewController;
pub use host::RenderHost;
#[cfg(any(test, feature = "mock"))]
pub use mock::{HostLoad, RecordingHost};
pub use state::{Generation, PreviewState, PreviewStatus};
