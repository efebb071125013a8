//! Integrations: named extensions declared in the site configuration.
//!
//! Integrations are resolved from their descriptors in declared order and
//! their hooks run in that same order, so a later integration sees (and can
//! extend) everything an earlier one registered.

use std::collections::HashMap;
use std::path::Path;

use folio_config::{IntegrationDescriptor, SiteConfig, DOCS_THEME};

use crate::assets::Asset;
use crate::navigation::SidebarEntry;
use crate::sitemap::Sitemap;
use crate::templates::TemplateEngine;
use crate::theme::{DocsTheme, ThemeSettings};

/// Everything integrations contribute before pages are rendered.
#[derive(Debug, Default)]
pub struct SiteSetup {
    /// Page templates, provided by the theme
    pub templates: Option<TemplateEngine>,

    /// Theme presentation settings
    pub theme: ThemeSettings,

    /// Explicit sidebar layout; autogenerated when `None`
    pub sidebar: Option<Vec<SidebarEntry>>,

    /// Files written to `assets/`, stylesheets linked in this order
    pub assets: Vec<Asset>,

    /// Raw tags inserted into every page's `<head>`
    pub head: Vec<String>,
}

/// A page as seen by integrations once the build has finished.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    /// Public URL path
    pub url: String,
    /// Page title
    pub title: String,
}

/// The finished site, handed to `build_done` hooks.
#[derive(Debug)]
pub struct BuiltSite<'a> {
    pub config: &'a SiteConfig,
    pub output_dir: &'a Path,
    pub pages: &'a [PageSummary],
}

/// Errors that can occur while resolving or running integrations.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("Unknown integration: {0}")]
    Unknown(String),

    #[error("Invalid options for integration `{name}`: {message}")]
    InvalidOptions { name: String, message: String },

    #[error("Integration `{name}` failed: {message}")]
    Failed { name: String, message: String },
}

impl IntegrationError {
    pub fn invalid_options(name: &str, message: impl ToString) -> Self {
        Self::InvalidOptions {
            name: name.to_string(),
            message: message.to_string(),
        }
    }

    pub fn failed(name: &str, message: impl ToString) -> Self {
        Self::Failed {
            name: name.to_string(),
            message: message.to_string(),
        }
    }
}

/// Trait for site integrations.
pub trait Integration: Send + Sync {
    /// Integration identifier as written in the config (e.g. "docs-theme")
    fn name(&self) -> &'static str;

    /// Contribute templates, assets and settings before rendering.
    fn setup(&self, _config: &SiteConfig, _setup: &mut SiteSetup) -> Result<(), IntegrationError> {
        Ok(())
    }

    /// Run after every page and asset has been written.
    fn build_done(&self, _site: &BuiltSite<'_>) -> Result<(), IntegrationError> {
        Ok(())
    }
}

/// Constructor for an integration from its options mapping.
pub type IntegrationFactory = fn(&toml::Table) -> Result<Box<dyn Integration>, IntegrationError>;

/// A registry of known integrations by name.
#[derive(Default)]
pub struct IntegrationRegistry {
    factories: HashMap<String, IntegrationFactory>,
}

impl IntegrationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in integrations.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(DOCS_THEME, |options| {
            Ok(Box::new(DocsTheme::from_options(options)?))
        });
        registry.register("sitemap", |options| {
            Ok(Box::new(Sitemap::from_options(options)?))
        });
        registry
    }

    /// Register (or replace) an integration factory.
    pub fn register(&mut self, name: impl Into<String>, factory: IntegrationFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Check if an integration is known.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate integrations in the order they are declared.
    pub fn resolve(
        &self,
        descriptors: &[IntegrationDescriptor],
    ) -> Result<Vec<Box<dyn Integration>>, IntegrationError> {
        descriptors
            .iter()
            .map(|descriptor| {
                let factory = self
                    .factories
                    .get(&descriptor.name)
                    .ok_or_else(|| IntegrationError::Unknown(descriptor.name.clone()))?;
                factory(&descriptor.options)
            })
            .collect()
    }
}

impl std::fmt::Debug for IntegrationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("IntegrationRegistry")
            .field("integrations", &names)
            .finish()
    }
}

/// Deserialize an options mapping into a typed options struct.
pub(crate) fn parse_options<T: serde::de::DeserializeOwned>(
    name: &str,
    options: &toml::Table,
) -> Result<T, IntegrationError> {
    toml::Value::Table(options.clone())
        .try_into()
        .map_err(|e: toml::de::Error| IntegrationError::invalid_options(name, e.message()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HeadTag(&'static str);

    impl Integration for HeadTag {
        fn name(&self) -> &'static str {
            "head-tag"
        }

        fn setup(&self, _config: &SiteConfig, setup: &mut SiteSetup) -> Result<(), IntegrationError> {
            setup.head.push(self.0.to_string());
            Ok(())
        }
    }

    #[test]
    fn resolves_builtins_in_declared_order() {
        let registry = IntegrationRegistry::with_builtins();
        let mut sitemap = IntegrationDescriptor::new("sitemap");
        sitemap
            .options
            .insert("site".to_string(), toml::Value::from("https://example.com"));

        let resolved = registry
            .resolve(&[sitemap, IntegrationDescriptor::new(DOCS_THEME)])
            .unwrap();

        let names: Vec<_> = resolved.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["sitemap", "docs-theme"]);
    }

    #[test]
    fn unknown_integration_is_an_error() {
        let registry = IntegrationRegistry::with_builtins();

        let result = registry.resolve(&[IntegrationDescriptor::new("analytics")]);

        assert!(matches!(result, Err(IntegrationError::Unknown(name)) if name == "analytics"));
    }

    #[test]
    fn custom_integrations_can_be_registered() {
        let mut registry = IntegrationRegistry::new();
        registry.register("head-tag", |_| Ok(Box::new(HeadTag("<meta name=\"x\">"))));

        assert!(registry.contains("head-tag"));
        assert!(!registry.contains(DOCS_THEME));

        let resolved = registry
            .resolve(&[IntegrationDescriptor::new("head-tag")])
            .unwrap();
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn parse_options_reports_type_errors() {
        #[derive(serde::Deserialize, Debug)]
        struct Options {
            #[allow(dead_code)]
            count: u32,
        }
        let mut options = toml::Table::new();
        options.insert("count".to_string(), toml::Value::from("many"));

        let result: Result<Options, _> = parse_options("counter", &options);

        assert!(matches!(result, Err(IntegrationError::InvalidOptions { name, .. }) if name == "counter"));
    }
}
