//! The validated site configuration record.

use std::path::PathBuf;

/// Name of the documentation theme integration every site must declare.
pub const DOCS_THEME: &str = "docs-theme";

/// A validated site configuration.
///
/// Built once by the loader at the start of a build and shared read-only
/// (usually behind an `Arc`) until the build finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    /// Site title shown in the header and page titles
    pub title: String,

    /// Site description used for meta tags
    pub description: Option<String>,

    /// Integrations in initialization order
    pub integrations: Vec<IntegrationDescriptor>,

    /// Build settings
    pub build: BuildSettings,

    /// Directory that contained the config file
    pub root: PathBuf,
}

/// A named integration and its options mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationDescriptor {
    /// Integration name (e.g. "docs-theme")
    pub name: String,

    /// Integration-specific options, empty when none were given
    pub options: toml::Table,
}

impl IntegrationDescriptor {
    /// Create a descriptor with an empty options mapping.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: toml::Table::new(),
        }
    }
}

/// Settings controlling where content is read from and output written to.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSettings {
    /// Content directory, relative to the config root
    pub content_dir: PathBuf,

    /// Output directory, relative to the config root
    pub output_dir: PathBuf,

    /// Base URL, always starting and ending with `/`
    pub base_url: String,

    /// Minify generated CSS
    pub minify: bool,

    /// Include pages marked as drafts
    pub drafts: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("dist"),
            base_url: "/".to_string(),
            minify: true,
            drafts: false,
        }
    }
}

impl SiteConfig {
    /// Content directory resolved against the config root.
    pub fn content_dir(&self) -> PathBuf {
        self.root.join(&self.build.content_dir)
    }

    /// Output directory resolved against the config root.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.build.output_dir)
    }

    /// Look up an integration by name.
    pub fn integration(&self, name: &str) -> Option<&IntegrationDescriptor> {
        self.integrations.iter().find(|i| i.name == name)
    }

    /// The documentation theme descriptor.
    ///
    /// Always present on a config produced by the loader.
    pub fn theme(&self) -> Option<&IntegrationDescriptor> {
        self.integration(DOCS_THEME)
    }
}
