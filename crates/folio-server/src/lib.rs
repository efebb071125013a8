//! Development server with live reload for folio docs.
//!
//! Builds the site, serves the output directory and rebuilds on every change
//! to the content directory or the config file, telling connected browsers
//! to reload over a WebSocket.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{
    static_router, DevServer, DevServerConfig, ServerError, LIVE_RELOAD_PATH,
    LIVE_RELOAD_SCRIPT_PATH,
};
pub use watcher::{FileWatcher, WatchEvent, WatchTargets};
pub use websocket::{client_script, ReloadHub, ReloadMessage};
