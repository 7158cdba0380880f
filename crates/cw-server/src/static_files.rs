//! Static file serving.
//!
//! Serves the workspace page and its assets, embedded into the binary via
//! `rust-embed`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

use crate::state::AppState;

/// Workspace page and its scripts and styles.
#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

/// Page served for `/`.
const INDEX: &str = "workspace.html";

/// Create router for static file serving.
pub(crate) fn static_router() -> Router<Arc<AppState>> {
    Router::new().fallback(serve_asset)
}

/// Serve an embedded asset, mapping `/` to the workspace page.
async fn serve_asset(req: Request<Body>) -> Response {
    let path = req.uri().path().trim_start_matches('/');
    let file_path = if path.is_empty() { INDEX } else { path };

    let Some(file) = Assets::get(file_path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let mime = mime_guess::from_path(file_path).first_or_octet_stream();
    let content_type = HeaderValue::from_str(mime.essence_str())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        Body::from(file.data.into_owned()),
    )
        .into_response()
}
