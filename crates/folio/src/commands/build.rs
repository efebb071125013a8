//! Static site build command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use folio_config::SiteConfig;
use folio_static::StaticBuilder;

/// Command-line settings that take precedence over `[build]`.
#[derive(Debug, Default)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub minify: Option<bool>,
    pub drafts: bool,
}

impl Overrides {
    /// Apply to a loaded config. A relative `--output` is relative to the
    /// working directory, not the config file.
    fn apply(self, config: &mut SiteConfig) -> Result<()> {
        if let Some(output) = self.output {
            config.build.output_dir = if output.is_absolute() {
                output
            } else {
                std::env::current_dir()
                    .context("Failed to read current directory")?
                    .join(output)
            };
        }
        if let Some(minify) = self.minify {
            config.build.minify = minify;
        }
        if self.drafts {
            config.build.drafts = true;
        }
        Ok(())
    }
}

/// Run the build command.
pub async fn run(config_path: &Path, overrides: Overrides) -> Result<()> {
    tracing::info!("Building static site...");

    let mut config = super::load_site(config_path)?;
    overrides.apply(&mut config)?;

    let builder = StaticBuilder::new(Arc::new(config));
    let result = tokio::task::spawn_blocking(move || builder.build())
        .await
        .context("Build task panicked")??;

    tracing::info!(
        "Built {} pages and {} assets in {}ms",
        result.pages,
        result.assets,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
