//! Preview endpoints.
//!
//! `/preview/{generation}` serves the current sandbox document to the
//! preview iframe. The generation in the path only keeps URLs unique per
//! assignment; the latest document is always served.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use cw_preview::PreviewStatus;

use crate::middleware::security;
use crate::state::AppState;

/// Handle GET /api/preview.
pub(crate) async fn get_status(State(state): State<Arc<AppState>>) -> Json<PreviewStatus> {
    Json(state.preview().status())
}

/// Handle POST /api/preview/refresh.
pub(crate) async fn refresh(State(state): State<Arc<AppState>>) -> Json<PreviewStatus> {
    let mut preview = state.preview();
    preview.refresh();
    Json(preview.status())
}

/// Handle GET /preview/{generation}.
pub(crate) async fn get_document(
    Path(generation): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let (document, csp) = {
        let preview = state.preview();
        let csp = security::preview_csp(&preview.options().bundle);
        (preview.document().as_str().to_owned(), csp)
    };

    tracing::debug!(generation, bytes = document.len(), "Serving preview document");

    let mut response = (StatusCode::OK, document).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("SAMEORIGIN"),
    );
    if let Ok(value) = HeaderValue::from_str(&csp) {
        headers.insert(header::CONTENT_SECURITY_POLICY, value);
    }
    response
}
