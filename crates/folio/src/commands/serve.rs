//! Preview server command.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Run the serve command.
///
/// Serves `dir` when given, otherwise the configured output directory, under
/// the configured base URL.
pub async fn run(config_path: &Path, port: u16, dir: Option<PathBuf>) -> Result<()> {
    let (dir, base_url) = match (dir, super::load_site(config_path)) {
        (Some(dir), Ok(config)) => (dir, config.build.base_url),
        (Some(dir), Err(e)) => {
            tracing::debug!("Serving without config: {:#}", e);
            (dir, "/".to_string())
        }
        (None, Ok(config)) => (config.output_dir(), config.build.base_url),
        (None, Err(e)) => return Err(e),
    };

    if !dir.exists() {
        anyhow::bail!(
            "Directory not found: {}. Run 'folio build' first.",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    let url = format!("http://{}{}", addr, base_url);
    tracing::info!("Serving {} at {}", dir.display(), url);

    let app = folio_server::static_router(&dir, &base_url);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    if let Err(e) = open::that(&url) {
        tracing::warn!("Could not open browser: {}", e);
    }

    axum::serve(listener, app).await?;

    Ok(())
}
