//! HTTP server for the CodeWorkspace playground.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - The workspace page (editors plus a sandboxed preview iframe)
//! - API endpoints for reading and editing the source buffers
//! - Sandbox documents for the preview iframe
//! - WebSocket endpoint that drives the preview iframe
//!
//! # Quick Start
//!
//! ```ignore
//! use cw_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         port: 7878,
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► Rust axum server (cw-server)
//!   │                    │
//!   │                    ├─► API routes ──► PreviewController (cw-preview)
//!   │                    │                        │
//!   │                    │                        └─► build_document (cw-sandbox)
//!   │                    │
//!   │                    ├─► WebSocket ◄──► BrowserHost (load / loaded)
//!   │                    │
//!   │                    └─► ProjectWatcher ◄── notify (project files)
//!   │
//!   └─ iframe sandbox="allow-scripts" ──► GET /preview/{generation}
//! ```

mod app;
mod error;
mod handlers;
mod host;
mod live_reload;
mod middleware;
pub mod project;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use cw_config::ProjectConfig;
use cw_preview::PreviewController;
use cw_sandbox::{BuildOptions, SourceBuffers};
use tokio::sync::broadcast;

use crate::host::BrowserHost;
use crate::live_reload::ProjectWatcher;
use crate::state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Project files backing the buffers (`None` serves the starter template).
    pub project: Option<ProjectConfig>,
    /// Watch project files and push changes into the preview.
    pub watch_enabled: bool,
    /// Debounce window for file events, in milliseconds.
    pub debounce_ms: u64,
    /// Sandbox document build options.
    pub build_options: BuildOptions,
    /// Application version.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7878,
            project: None,
            watch_enabled: false,
            debounce_ms: 100,
            build_options: BuildOptions::default(),
            version: String::new(),
        }
    }
}

/// Run the server.
///
/// # Errors
///
/// Returns an error if the project files cannot be read, the watcher cannot
/// be started, or the server fails to bind.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let buffers = match &config.project {
        Some(project) => project::load_buffers(project)?,
        None => SourceBuffers::starter(),
    };

    // Mount the preview; the browser host forwards loads to WebSocket clients
    let (events, _rx) = broadcast::channel(100);
    let host = BrowserHost::new(events.clone());
    let preview = Arc::new(Mutex::new(PreviewController::mount(
        host,
        buffers,
        config.build_options.clone(),
    )));

    // Watch project files if enabled
    let watcher = match &config.project {
        Some(project) if config.watch_enabled => {
            let mut watcher = ProjectWatcher::new(
                project.clone(),
                Arc::clone(&preview),
                events.clone(),
            )
            .with_debounce_ms(config.debounce_ms);
            watcher.start()?;
            Some(watcher)
        }
        _ => None,
    };

    let state = Arc::new(AppState::new(preview, events, watcher, config.version.clone()));
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from CodeWorkspace config.
///
/// The project is only used when its directory exists.
#[must_use]
pub fn server_config_from_cw_config(config: &cw_config::Config, version: String) -> ServerConfig {
    let project = config
        .project_resolved
        .dir
        .is_dir()
        .then(|| config.project_resolved.clone());

    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        project,
        watch_enabled: config.watch.enabled,
        debounce_ms: config.watch.debounce_ms,
        build_options: config.build_options(),
        version,
    }
}
