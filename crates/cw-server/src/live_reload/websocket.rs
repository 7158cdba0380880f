//! WebSocket handler driving the preview iframe.
//!
//! The server pushes `load` commands and `state` updates; the page answers
//! with `loaded` once the iframe has fired its `load` event.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use cw_preview::{Generation, PreviewStatus};
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::host::PreviewEvent;
use crate::state::AppState;

/// Message sent by the workspace page.
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClientMessage {
    /// The preview iframe finished loading `generation`.
    Loaded { generation: Generation },
}

/// Handle WebSocket upgrade for the preview channel.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut events = state.events.subscribe();
    let mut status = state.status.clone();

    // Bring a freshly opened page up to date.
    let current = *status.borrow_and_update();
    let greeting = [
        PreviewEvent::State {
            state: current.state,
            generation: current.generation,
        },
        PreviewEvent::Load {
            generation: current.generation,
        },
    ];
    for event in &greeting {
        if send_event(&mut socket, event).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            result = events.recv() => {
                match result {
                    Ok(event) => {
                        if send_event(&mut socket, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Preview client lagged behind");
                    }
                }
            }
            result = status.changed() => {
                if result.is_err() {
                    break;
                }
                let current = *status.borrow_and_update();
                let event = PreviewEvent::State {
                    state: current.state,
                    generation: current.generation,
                };
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        // The acknowledging page may have opened after the state
                        // settled, so it gets the current state even without a change.
                        let Some(current) = handle_client_message(&state, text.as_str()) else {
                            continue;
                        };
                        let event = PreviewEvent::State {
                            state: current.state,
                            generation: current.generation,
                        };
                        if send_event(&mut socket, &event).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }
}

/// Serialize and send one event.
async fn send_event(socket: &mut WebSocket, event: &PreviewEvent) -> Result<(), axum::Error> {
    let Ok(msg) = serde_json::to_string(event) else {
        return Ok(());
    };
    socket.send(Message::Text(msg.into())).await
}

/// Apply a message received from the page.
///
/// Returns the preview status when the page acknowledged the current
/// generation.
fn handle_client_message(state: &AppState, text: &str) -> Option<PreviewStatus> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Loaded { generation }) => {
            let mut preview = state.preview();
            preview.on_load_complete(generation);
            (preview.generation() == generation).then(|| preview.status())
        }
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed client message");
            None
        }
    }
}
