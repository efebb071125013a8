//! The built-in documentation theme integration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use folio_config::{SiteConfig, DOCS_THEME};

use crate::assets::{Asset, AssetPipeline};
use crate::integrations::{parse_options, Integration, IntegrationError, SiteSetup};
use crate::navigation::SidebarEntry;
use crate::templates::TemplateEngine;

/// File name of the theme stylesheet inside `assets/`.
pub const THEME_STYLESHEET: &str = "theme.css";

/// A social/profile link shown in the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub label: String,
    pub href: String,
}

/// Options accepted by the `docs-theme` integration.
///
/// Every field is optional; an empty options table is a complete theme setup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeOptions {
    /// Explicit sidebar layout
    pub sidebar: Option<Vec<SidebarEntry>>,
    /// Extra stylesheets, relative to the config file
    pub custom_css: Vec<String>,
    /// Header links
    pub social: Vec<SocialLink>,
    /// Base URL for "Edit this page" links; the page's source path is appended
    pub edit_link: Option<String>,
    /// Show the "On this page" table of contents
    pub table_of_contents: bool,
    /// Show previous/next links under each page
    pub pagination: bool,
}

impl Default for ThemeOptions {
    fn default() -> Self {
        Self {
            sidebar: None,
            custom_css: Vec::new(),
            social: Vec::new(),
            edit_link: None,
            table_of_contents: true,
            pagination: true,
        }
    }
}

/// Presentation settings the renderer reads from the theme.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeSettings {
    pub social: Vec<SocialLink>,
    pub edit_link: Option<String>,
    pub table_of_contents: bool,
    pub pagination: bool,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            social: Vec::new(),
            edit_link: None,
            table_of_contents: true,
            pagination: true,
        }
    }
}

impl ThemeSettings {
    /// "Edit this page" URL for a source file relative to the content directory.
    pub fn edit_url(&self, relative_path: &Path) -> Option<String> {
        let base = self.edit_link.as_deref()?;
        let relative = relative_path
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect::<Vec<_>>()
            .join("/");
        Some(format!("{}/{}", base.trim_end_matches('/'), relative))
    }
}

/// The documentation theme.
#[derive(Debug, Clone)]
pub struct DocsTheme {
    options: ThemeOptions,
}

impl DocsTheme {
    /// Create the theme from its options mapping.
    pub fn from_options(options: &toml::Table) -> Result<Self, IntegrationError> {
        Ok(Self {
            options: parse_options(DOCS_THEME, options)?,
        })
    }

    pub fn options(&self) -> &ThemeOptions {
        &self.options
    }
}

impl Integration for DocsTheme {
    fn name(&self) -> &'static str {
        DOCS_THEME
    }

    fn setup(&self, config: &SiteConfig, setup: &mut SiteSetup) -> Result<(), IntegrationError> {
        let templates =
            TemplateEngine::new().map_err(|e| IntegrationError::failed(DOCS_THEME, e))?;
        setup.templates = Some(templates);

        setup.theme = ThemeSettings {
            social: self.options.social.clone(),
            edit_link: self.options.edit_link.clone(),
            table_of_contents: self.options.table_of_contents,
            pagination: self.options.pagination,
        };

        if self.options.sidebar.is_some() {
            setup.sidebar = self.options.sidebar.clone();
        }

        setup
            .assets
            .push(Asset::new(THEME_STYLESHEET, AssetPipeline::theme_css()));

        for style in &self.options.custom_css {
            let path = config.root.join(style);
            let Some(file_name) = path.file_name().and_then(|f| f.to_str()) else {
                tracing::warn!("Ignoring stylesheet without a file name: {}", style);
                continue;
            };

            if setup.assets.iter().any(|a| a.file_name == file_name) {
                return Err(IntegrationError::invalid_options(
                    DOCS_THEME,
                    format!("stylesheet {style:?} would overwrite assets/{file_name}"),
                ));
            }

            match fs::read_to_string(&path) {
                Ok(contents) => {
                    tracing::debug!("Loaded stylesheet {}", path.display());
                    setup.assets.push(Asset::new(file_name, contents));
                }
                Err(e) => {
                    tracing::warn!("Stylesheet not found: {} ({})", path.display(), e);
                }
            }
        }

        Ok(())
    }
}
