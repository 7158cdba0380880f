//! Security headers middleware.
//!
//! Adds security headers to all workspace responses:
//! - Content-Security-Policy
//! - X-Content-Type-Options
//! - X-Frame-Options
//!
//! Preview documents carry their own policy, see [`preview_csp`].

use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use cw_sandbox::RuntimeBundle;
use tower_http::set_header::SetResponseHeaderLayer;

/// Content-Security-Policy header value for the workspace page and API.
const CSP: &str = "default-src 'self'; \
                   script-src 'self'; \
                   style-src 'self' 'unsafe-inline'; \
                   img-src 'self' data:; \
                   connect-src 'self' ws: wss:; \
                   frame-src 'self'; \
                   frame-ancestors 'none'";

/// Create layer that adds Content-Security-Policy header.
pub(crate) fn csp_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static(CSP),
    )
}

/// Create layer that adds X-Content-Type-Options header.
pub(crate) fn content_type_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}

/// Create layer that adds X-Frame-Options header.
pub(crate) fn frame_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    )
}

/// Content-Security-Policy for a sandbox document.
///
/// Scripts may only come from the bundle origins; inline scripts and `eval`
/// are allowed because the transpiler compiles the component in the page.
/// The document can open no connections and may only be framed by the
/// workspace.
pub(crate) fn preview_csp(bundle: &RuntimeBundle) -> String {
    let origins = bundle.origins().join(" ");
    let mut script_src = String::from("'unsafe-inline' 'unsafe-eval'");
    if !origins.is_empty() {
        script_src.push(' ');
        script_src.push_str(&origins);
    }
    format!(
        "default-src 'none'; \
         script-src {script_src}; \
         style-src 'unsafe-inline'; \
         img-src data: blob:; \
         frame-ancestors 'self'"
    )
}
