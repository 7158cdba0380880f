//! Source buffer endpoints.
//!
//! Edits from the workspace page arrive here, one request per change. Every
//! change that alters a buffer triggers a full preview reload.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use cw_preview::PreviewStatus;
use cw_sandbox::{Language, SourceBuffers};
use serde::Serialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Response for buffer mutations.
#[derive(Debug, Serialize)]
pub(crate) struct EditResponse {
    /// Whether the buffer changed (and the preview reloaded).
    changed: bool,
    /// Preview status after the edit.
    #[serde(flatten)]
    status: PreviewStatus,
}

/// Handle GET /api/buffers.
pub(crate) async fn get_buffers(State(state): State<Arc<AppState>>) -> Json<SourceBuffers> {
    Json(state.preview().buffers().clone())
}

/// Handle PUT /api/buffers/{language}.
pub(crate) async fn put_buffer(
    Path(language): Path<String>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<EditResponse>, ServerError> {
    let language: Language = language.parse()?;
    let text = String::from_utf8(body.to_vec()).map_err(|_| ServerError::InvalidBody)?;

    let mut preview = state.preview();
    let changed = preview.update(language, text);
    Ok(Json(EditResponse {
        changed,
        status: preview.status(),
    }))
}

/// Handle POST /api/buffers/{language}/format.
pub(crate) async fn format_buffer(
    Path(language): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<EditResponse>, ServerError> {
    let language: Language = language.parse()?;

    let mut preview = state.preview();
    let changed = preview.format(language);
    Ok(Json(EditResponse {
        changed,
        status: preview.status(),
    }))
}

/// Handle DELETE /api/buffers/{language}.
pub(crate) async fn clear_buffer(
    Path(language): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<EditResponse>, ServerError> {
    let language: Language = language.parse()?;

    let mut preview = state.preview();
    let changed = preview.clear(language);
    Ok(Json(EditResponse {
        changed,
        status: preview.status(),
    }))
}
