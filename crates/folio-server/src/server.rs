//! Development server implementation.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{IntoResponse, Redirect},
    routing::get,
    Router,
};
use tokio::sync::{mpsc, RwLock};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use folio_config::{load_config, ConfigError, SiteConfig};
use folio_static::{BuildError, BuildResult, StaticBuilder};

use crate::watcher::{FileWatcher, WatchEvent, WatchTargets};
use crate::websocket::{client_script, ReloadHub, ReloadMessage};

/// WebSocket endpoint for live reload.
pub const LIVE_RELOAD_PATH: &str = "/__livereload";

/// Script that connects to [`LIVE_RELOAD_PATH`].
pub const LIVE_RELOAD_SCRIPT_PATH: &str = "/__livereload.js";

/// Quiet period used to coalesce bursts of file events into one rebuild.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Path to the site config file
    pub config_path: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(folio_config::CONFIG_FILE),
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

impl DevServerConfig {
    /// Socket address to bind.
    pub fn addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ServerError::InvalidAddress(addr))
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Build task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared server state.
struct ServerState {
    config_path: PathBuf,
    site: RwLock<Arc<SiteConfig>>,
    hub: ReloadHub,
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Build the site, then serve it and rebuild whenever sources change.
    ///
    /// Build failures are reported to connected browsers; the server keeps
    /// serving the last successful output.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr = self.config.addr()?;
        let site = Arc::new(load_config(&self.config.config_path)?);

        let state = Arc::new(ServerState {
            config_path: self.config.config_path.clone(),
            site: RwLock::new(Arc::clone(&site)),
            hub: ReloadHub::new(),
        });

        if let Err(e) = rebuild(Arc::clone(&site)).await {
            tracing::error!("Initial build failed: {}", e);
        }

        let output_dir = site.output_dir();
        std::fs::create_dir_all(&output_dir)?;

        let (watcher, rx) = FileWatcher::new(&WatchTargets {
            config_file: self.config.config_path.clone(),
            content_dir: site.content_dir(),
        })
        .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            watch_loop(&state_clone, rx).await;
            // Keep watcher alive
            drop(watcher);
        });

        let app = Router::new()
            .route(LIVE_RELOAD_PATH, get(ws_handler))
            .route(LIVE_RELOAD_SCRIPT_PATH, get(script_handler))
            .with_state(state)
            .merge(static_router(&output_dir, &site.build.base_url))
            .layer(CorsLayer::permissive());

        let url = format!("http://{}{}", addr, site.build.base_url);
        tracing::info!("Starting dev server at {}", url);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        if self.config.open {
            if let Err(e) = open::that(&url) {
                tracing::warn!("Could not open browser: {}", e);
            }
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Router serving a built site from `dir`, mounted at `base_url`.
///
/// Unknown paths get the site's `404.html` with a 404 status.
pub fn static_router(dir: &Path, base_url: &str) -> Router {
    let files = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("404.html")));
    let mount = base_url.trim_end_matches('/');

    if mount.is_empty() {
        return Router::new().fallback_service(files);
    }

    let base = base_url.to_string();
    Router::new()
        .route("/", get(move || std::future::ready(Redirect::temporary(&base))))
        .nest_service(mount, files)
}

/// Rebuild the site off the async runtime.
async fn rebuild(site: Arc<SiteConfig>) -> Result<BuildResult, ServerError> {
    let result =
        tokio::task::spawn_blocking(move || StaticBuilder::new(site).live_reload(true).build())
            .await??;
    Ok(result)
}

/// Consume watch events, coalescing bursts into a single rebuild.
async fn watch_loop(state: &ServerState, mut rx: mpsc::Receiver<WatchEvent>) {
    while let Some(first) = rx.recv().await {
        let mut config_changed = first.is_config();
        tracing::debug!("Change detected: {}", first.path().display());

        tokio::time::sleep(DEBOUNCE).await;
        while let Ok(event) = rx.try_recv() {
            config_changed |= event.is_config();
        }

        handle_change(state, config_changed).await;
    }
}

/// Reload config if needed, rebuild, and notify browsers.
async fn handle_change(state: &ServerState, config_changed: bool) {
    if config_changed {
        match load_config(&state.config_path) {
            Ok(config) => {
                let mut site = state.site.write().await;
                for setting in restart_required(&site, &config) {
                    tracing::warn!("{} changed; restart the dev server to pick it up", setting);
                }
                *site = Arc::new(config);
                tracing::info!("Reloaded {}", state.config_path.display());
            }
            Err(e) => {
                tracing::error!("Config error: {}", e);
                state.hub.send(ReloadMessage::BuildFailed {
                    message: e.to_string(),
                });
                return;
            }
        }
    }

    let site = Arc::clone(&*state.site.read().await);
    match rebuild(site).await {
        Ok(result) => {
            tracing::info!("Rebuilt {} pages in {}ms", result.pages, result.duration_ms);
            state.hub.send(ReloadMessage::Reload);
        }
        Err(e) => {
            tracing::error!("Build failed: {}", e);
            state.hub.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
        }
    }
}

/// Settings the running server cannot switch to after a config reload.
fn restart_required(old: &SiteConfig, new: &SiteConfig) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if old.content_dir() != new.content_dir() {
        changed.push("Content directory");
    }
    if old.output_dir() != new.output_dir() {
        changed.push("Output directory");
    }
    if old.build.base_url != new.build.base_url {
        changed.push("Base URL");
    }
    changed
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    // Forward reload messages to the client
    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), ()> {
    let json = msg.to_json().map_err(|e| {
        tracing::warn!("Failed to encode live reload message: {}", e);
    })?;
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

/// Handler for the live reload client script.
async fn script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        client_script(LIVE_RELOAD_PATH),
    )
}
