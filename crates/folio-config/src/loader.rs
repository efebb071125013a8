//! Loading `folio.toml` from disk.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::site::{BuildSettings, IntegrationDescriptor, SiteConfig, DOCS_THEME};

/// Default config file name.
pub const CONFIG_FILE: &str = "folio.toml";

/// Errors that can occur when loading the site configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing site title - set `title` in the config file")]
    MissingTitle,

    #[error("No integrations declared - at least the `docs-theme` integration is required")]
    NoIntegrations,

    #[error("Integration #{index} has no name")]
    UnnamedIntegration { index: usize },

    #[error("Integration declared more than once: {0}")]
    DuplicateIntegration(String),

    #[error("The `docs-theme` integration is required")]
    MissingTheme,
}

/// Configuration file structure as written by users.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    integrations: Vec<IntegrationEntry>,
    #[serde(default)]
    build: BuildSection,
}

/// An integration is either a bare name or a table with options.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IntegrationEntry {
    Name(String),
    Table {
        #[serde(default)]
        name: String,
        #[serde(default)]
        options: toml::Table,
    },
}

#[derive(Debug, Deserialize)]
struct BuildSection {
    #[serde(default = "default_content_dir")]
    content_dir: String,
    #[serde(default = "default_output")]
    output: String,
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_minify")]
    minify: bool,
    #[serde(default)]
    drafts: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            output: default_output(),
            base_url: default_base_url(),
            minify: default_minify(),
            drafts: false,
        }
    }
}

fn default_content_dir() -> String {
    "docs".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_minify() -> bool {
    true
}

/// Load and validate the configuration at `path`.
///
/// Relative directories in the file resolve against the file's parent.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let root = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let config = parse_config(&source, &root)?;
    tracing::debug!(
        "Loaded config from {} ({} integrations)",
        path.display(),
        config.integrations.len()
    );
    Ok(config)
}

/// Parse and validate configuration source text.
pub fn parse_config(source: &str, root: &Path) -> Result<SiteConfig, ConfigError> {
    let file: ConfigFile = toml::from_str(source)?;

    let title = file
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ConfigError::MissingTitle)?;

    let description = file
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let integrations = validate_integrations(file.integrations)?;

    let build = BuildSettings {
        content_dir: PathBuf::from(file.build.content_dir),
        output_dir: PathBuf::from(file.build.output),
        base_url: normalize_base_url(&file.build.base_url),
        minify: file.build.minify,
        drafts: file.build.drafts,
    };

    Ok(SiteConfig {
        title,
        description,
        integrations,
        build,
        root: root.to_path_buf(),
    })
}

fn validate_integrations(
    entries: Vec<IntegrationEntry>,
) -> Result<Vec<IntegrationDescriptor>, ConfigError> {
    if entries.is_empty() {
        return Err(ConfigError::NoIntegrations);
    }

    let mut seen = HashSet::new();
    let mut integrations = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let (name, options) = match entry {
            IntegrationEntry::Name(name) => (name, toml::Table::new()),
            IntegrationEntry::Table { name, options } => (name, options),
        };

        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::UnnamedIntegration { index });
        }
        if !seen.insert(name.clone()) {
            return Err(ConfigError::DuplicateIntegration(name));
        }

        integrations.push(IntegrationDescriptor { name, options });
    }

    if !seen.contains(DOCS_THEME) {
        return Err(ConfigError::MissingTheme);
    }

    Ok(integrations)
}

/// Ensure a base URL starts and ends with a slash.
fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"
title = "My Docs"
description = "Guides and reference"

[[integrations]]
name = "docs-theme"
"#;

    #[test]
    fn parses_minimal_config() {
        let config = parse_config(MINIMAL, Path::new(".")).unwrap();

        assert_eq!(config.title, "My Docs");
        assert_eq!(config.description.as_deref(), Some("Guides and reference"));
        assert_eq!(config.integrations.len(), 1);
        assert_eq!(config.integrations[0], IntegrationDescriptor::new(DOCS_THEME));
        assert_eq!(config.build, BuildSettings::default());
    }

    #[test]
    fn accepts_bare_integration_names() {
        let source = r#"
title = "Docs"
integrations = ["docs-theme", "sitemap"]
"#;

        let config = parse_config(source, Path::new(".")).unwrap();

        let names: Vec<_> = config.integrations.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["docs-theme", "sitemap"]);
    }

    #[test]
    fn keeps_integration_order_and_options() {
        let source = r#"
title = "Docs"

[[integrations]]
name = "sitemap"
options = { site = "https://example.com" }

[[integrations]]
name = "docs-theme"

[integrations.options]
table_of_contents = false
"#;

        let config = parse_config(source, Path::new(".")).unwrap();

        assert_eq!(config.integrations[0].name, "sitemap");
        assert_eq!(
            config.integrations[0].options["site"].as_str(),
            Some("https://example.com")
        );
        assert_eq!(config.integrations[1].name, "docs-theme");
        assert_eq!(
            config.integrations[1].options["table_of_contents"].as_bool(),
            Some(false)
        );
    }

    #[test]
    fn rejects_missing_or_blank_title() {
        let missing = "integrations = [\"docs-theme\"]";
        let blank = "title = \"   \"\nintegrations = [\"docs-theme\"]";

        assert!(matches!(
            parse_config(missing, Path::new(".")),
            Err(ConfigError::MissingTitle)
        ));
        assert!(matches!(
            parse_config(blank, Path::new(".")),
            Err(ConfigError::MissingTitle)
        ));
    }

    #[test]
    fn rejects_empty_integrations() {
        let result = parse_config("title = \"Docs\"", Path::new("."));

        assert!(matches!(result, Err(ConfigError::NoIntegrations)));
    }

    #[test]
    fn rejects_config_without_theme() {
        let source = "title = \"Docs\"\nintegrations = [\"sitemap\"]";

        let result = parse_config(source, Path::new("."));

        assert!(matches!(result, Err(ConfigError::MissingTheme)));
    }

    #[test]
    fn rejects_duplicate_integrations() {
        let source = "title = \"Docs\"\nintegrations = [\"docs-theme\", \"docs-theme\"]";

        let result = parse_config(source, Path::new("."));

        assert!(matches!(result, Err(ConfigError::DuplicateIntegration(name)) if name == "docs-theme"));
    }

    #[test]
    fn rejects_unnamed_integration() {
        let source = r#"
title = "Docs"

[[integrations]]
name = "docs-theme"

[[integrations]]
options = { a = 1 }
"#;

        let result = parse_config(source, Path::new("."));

        assert!(matches!(
            result,
            Err(ConfigError::UnnamedIntegration { index: 1 })
        ));
    }

    #[test]
    fn empty_description_becomes_none() {
        let source = "title = \"Docs\"\ndescription = \"\"\nintegrations = [\"docs-theme\"]";

        let config = parse_config(source, Path::new(".")).unwrap();

        assert_eq!(config.description, None);
    }

    #[test]
    fn normalizes_base_url() {
        assert_eq!(normalize_base_url(""), "/");
        assert_eq!(normalize_base_url("/"), "/");
        assert_eq!(normalize_base_url("docs"), "/docs/");
        assert_eq!(normalize_base_url("/docs"), "/docs/");
        assert_eq!(normalize_base_url("docs/v2/"), "/docs/v2/");
    }

    #[test]
    fn reports_toml_syntax_errors() {
        let result = parse_config("title = ", Path::new("."));

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn loads_from_disk_relative_to_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, MINIMAL).unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.root, temp.path());
        assert_eq!(config.content_dir(), temp.path().join("docs"));
    }

    #[test]
    fn loading_twice_yields_same_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, MINIMAL).unwrap();

        let first = load_config(&path).unwrap();
        let second = load_config(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn missing_file_is_not_found() {
        let temp = tempdir().unwrap();

        let result = load_config(&temp.path().join(CONFIG_FILE));

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
