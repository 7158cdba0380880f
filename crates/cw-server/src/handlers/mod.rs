//! HTTP request handlers.

pub(crate) mod buffers;
pub(crate) mod config;
pub(crate) mod preview;
