//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower::ServiceBuilder;

use crate::handlers;
use crate::live_reload;
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// Preview documents are routed outside the security layers: they carry
/// their own CSP and must be frameable by the workspace page.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/config", get(handlers::config::get_config))
        .route("/api/buffers", get(handlers::buffers::get_buffers))
        .route(
            "/api/buffers/{language}",
            put(handlers::buffers::put_buffer).delete(handlers::buffers::clear_buffer),
        )
        .route(
            "/api/buffers/{language}/format",
            post(handlers::buffers::format_buffer),
        )
        .route("/api/preview", get(handlers::preview::get_status))
        .route("/api/preview/refresh", post(handlers::preview::refresh));

    let workspace = Router::new()
        .merge(api_routes)
        .route("/ws/preview", get(live_reload::ws_handler))
        .merge(static_files::static_router())
        .layer(
            ServiceBuilder::new()
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        );

    let preview = Router::new().route(
        "/preview/{generation}",
        get(handlers::preview::get_document),
    );

    preview.merge(workspace).with_state(state)
}
