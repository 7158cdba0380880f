//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cw_sandbox::UnknownLanguage;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Language tag in the URL is not one of `jsx`, `css`, `html`.
    #[error(transparent)]
    UnknownLanguage(#[from] UnknownLanguage),

    /// Request body is not valid UTF-8 text.
    #[error("Request body must be UTF-8 text")]
    InvalidBody,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UnknownLanguage(_) => StatusCode::NOT_FOUND,
            Self::InvalidBody => StatusCode::BAD_REQUEST,
        };

        (status, axum::Json(json!({"error": self.to_string()}))).into_response()
    }
}
