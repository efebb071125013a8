//! Site configuration for folio.
//!
//! Reads `folio.toml`, validates the declared title and integrations, and
//! produces an immutable [`SiteConfig`] that the rest of the build shares.

pub mod loader;
pub mod site;

pub use loader::{load_config, parse_config, ConfigError, CONFIG_FILE};
pub use site::{BuildSettings, IntegrationDescriptor, SiteConfig, DOCS_THEME};
