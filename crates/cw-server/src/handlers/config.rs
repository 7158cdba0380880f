//! Workspace configuration endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use cw_sandbox::Language;
use serde::Serialize;

use crate::state::AppState;

/// Response for GET /api/config.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigResponse {
    /// Application version.
    version: String,
    /// Whether project files on disk are watched.
    watching: bool,
    /// Editor tabs in order.
    languages: Vec<Language>,
    /// Whether bundle load failures are rendered in the preview.
    report_load_failures: bool,
}

/// Handle GET /api/config.
pub(crate) async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let report_load_failures = state.preview().options().report_load_failures;
    Json(ConfigResponse {
        version: state.version.clone(),
        watching: state.watching(),
        languages: Language::ALL.to_vec(),
        report_load_failures,
    })
}
