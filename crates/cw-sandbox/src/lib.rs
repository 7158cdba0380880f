//! Sandbox document builder for CodeWorkspace live previews.
//!
//! Turns the three editable buffers of a project (component source,
//! stylesheet, structure) into one self-contained HTML document that can be
//! loaded into an isolated browsing context. The document loads a JSX
//! transpiler and a UI runtime from a pinned [`RuntimeBundle`], runs the
//! cleaned component source and mounts the result into `#root`. Failures in
//! user code are rendered as an `.error` block inside the document itself.
//!
//! # Example
//!
//! ```ignore
//! use cw_sandbox::{BuildOptions, SourceBuffers, build_document};
//!
//! let buffers = SourceBuffers::starter();
//! let document = build_document(&buffers, &BuildOptions::default());
//! assert!(document.as_str().contains("<div id=\"root\"></div>"));
//! ```
//!
//! The builder is a total function: any input produces a document. Broken
//! component code surfaces at runtime, inside the sandbox.

mod buffers;
mod bundle;
mod document;
mod transform;

pub use buffers::{Language, SourceBuffers, UnknownLanguage};
pub use bundle::RuntimeBundle;
pub use document::{BuildOptions, PLACEHOLDER_TEXT, SandboxDocument, build_document};
pub use transform::{CleanedComponent, ENTRY_BINDING, IMPORT_PLACEHOLDER, clean_component};
