//! CLI subcommands.

use std::path::Path;

use anyhow::{Context, Result};
use folio_config::{load_config, SiteConfig};

pub mod build;
pub mod check;
pub mod dev;
pub mod init;
pub mod serve;

/// Load the site config, naming the file in the error.
pub(crate) fn load_site(config_path: &Path) -> Result<SiteConfig> {
    let config = load_config(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    tracing::debug!("Loaded config from {}", config_path.display());
    Ok(config)
}
