//! Project file watching and the preview WebSocket.

mod debouncer;
mod manager;
mod websocket;

pub(crate) use manager::ProjectWatcher;
pub(crate) use websocket::ws_handler;
