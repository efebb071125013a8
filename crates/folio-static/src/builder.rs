//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use folio_config::SiteConfig;
use folio_content::{discover_pages, DiscoveryError, DiscoveryOptions, Page};

use crate::assets::AssetPipeline;
use crate::integrations::{
    BuiltSite, Integration, IntegrationError, IntegrationRegistry, PageSummary, SiteSetup,
};
use crate::navigation::{self, NavError, NavItem};
use crate::templates::{Context, TemplateEngine, TocEntry};

/// Route of the custom not-found page.
const NOT_FOUND_SLUG: &str = "404";

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Number of asset files written
    pub assets: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Integration(#[from] IntegrationError),

    #[error("No integration provided page templates - declare the `docs-theme` integration")]
    NoTheme,

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Navigation(#[from] NavError),

    #[error("Failed to render template for {page}: {message}")]
    Template { page: String, message: String },

    #[error("Refusing to clear output directory {0}: it contains the site sources")]
    UnsafeOutputDir(PathBuf),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Static site builder.
pub struct StaticBuilder {
    config: Arc<SiteConfig>,
    registry: IntegrationRegistry,
    live_reload: bool,
}

/// What a successful check found.
#[derive(Debug)]
pub struct SiteSummary {
    /// Integration names in declared order
    pub integrations: Vec<&'static str>,

    /// Pages that would be published
    pub pages: Vec<PageSummary>,

    /// Assembled sidebar
    pub nav: Vec<NavItem>,
}

/// Everything needed to render, before any output is written.
struct Prepared {
    integrations: Vec<Box<dyn Integration>>,
    setup: SiteSetup,
    templates: TemplateEngine,
    pages: Vec<Page>,
    nav: Vec<NavItem>,
}

/// Read-only state shared by every page render.
struct RenderState<'a> {
    setup: &'a SiteSetup,
    templates: &'a TemplateEngine,
    nav: &'a [NavItem],
    styles: &'a [String],
}

impl StaticBuilder {
    /// Create a new static builder with the built-in integrations.
    pub fn new(config: Arc<SiteConfig>) -> Self {
        Self {
            config,
            registry: IntegrationRegistry::with_builtins(),
            live_reload: false,
        }
    }

    /// Use a custom integration registry.
    pub fn with_registry(mut self, registry: IntegrationRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Include the dev server's live reload client in every page.
    pub fn live_reload(mut self, enabled: bool) -> Self {
        self.live_reload = enabled;
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Run every step up to rendering and report what would be built.
    pub fn check(&self) -> Result<SiteSummary, BuildError> {
        let prepared = self.prepare()?;

        Ok(SiteSummary {
            integrations: prepared.integrations.iter().map(|i| i.name()).collect(),
            pages: self.summaries(&prepared.pages),
            nav: prepared.nav,
        })
    }

    /// Build the static site.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let output_dir = self.config.output_dir();

        let Prepared {
            integrations,
            setup,
            templates,
            pages,
            nav,
        } = self.prepare()?;

        self.clean_output(&output_dir)?;
        create_dir(&output_dir)?;
        let styles = self.write_assets(&setup, &output_dir)?;

        let state = RenderState {
            setup: &setup,
            templates: &templates,
            nav: &nav,
            styles: &styles,
        };

        // Render pages in parallel
        pages
            .par_iter()
            .map(|page| self.build_page(page, &state, &output_dir))
            .collect::<Result<Vec<()>, BuildError>>()?;

        if !pages.iter().any(|p| p.slug == NOT_FOUND_SLUG) {
            self.build_not_found(&state, &output_dir)?;
        }

        let summaries = self.summaries(&pages);

        let built = BuiltSite {
            config: &self.config,
            output_dir: &output_dir,
            pages: &summaries,
        };
        for integration in &integrations {
            integration.build_done(&built)?;
        }

        Ok(BuildResult {
            pages: pages.len(),
            assets: setup.assets.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir,
        })
    }

    /// Resolve and set up integrations, discover content and assemble navigation.
    fn prepare(&self) -> Result<Prepared, BuildError> {
        // Integrations initialise in declared order
        let integrations = self.registry.resolve(&self.config.integrations)?;
        let mut setup = SiteSetup::default();
        for integration in &integrations {
            tracing::debug!("Setting up integration {}", integration.name());
            integration.setup(&self.config, &mut setup)?;
        }
        let templates = setup.templates.take().ok_or(BuildError::NoTheme)?;

        let pages = discover_pages(
            &self.config.content_dir(),
            DiscoveryOptions {
                drafts: self.config.build.drafts,
            },
        )?;

        let nav = navigation::assemble(
            &pages,
            setup.sidebar.as_deref(),
            &self.config.build.base_url,
        )?;

        Ok(Prepared {
            integrations,
            setup,
            templates,
            pages,
            nav,
        })
    }

    /// Remove the previous build so deleted pages do not linger.
    ///
    /// Refuses when the output directory is, or contains, the config root or
    /// the content directory.
    fn clean_output(&self, output_dir: &Path) -> Result<(), BuildError> {
        let Ok(output) = output_dir.canonicalize() else {
            return Ok(());
        };

        for source in [self.config.root.clone(), self.config.content_dir()] {
            let source = source.canonicalize().unwrap_or(source);
            if source.starts_with(&output) {
                return Err(BuildError::UnsafeOutputDir(output_dir.to_path_buf()));
            }
        }

        tracing::debug!("Clearing {}", output_dir.display());
        fs::remove_dir_all(output_dir).map_err(|source| BuildError::Write {
            path: output_dir.to_path_buf(),
            source,
        })
    }

    /// Published pages, excluding the not-found page.
    fn summaries(&self, pages: &[Page]) -> Vec<PageSummary> {
        pages
            .iter()
            .filter(|p| p.slug != NOT_FOUND_SLUG)
            .map(|p| PageSummary {
                url: p.url(&self.config.build.base_url),
                title: p.title.clone(),
            })
            .collect()
    }

    /// Render a single page and write it to disk.
    fn build_page(
        &self,
        page: &Page,
        state: &RenderState<'_>,
        output_dir: &Path,
    ) -> Result<(), BuildError> {
        let base_url = &self.config.build.base_url;
        let url = page.url(base_url);
        let theme = &state.setup.theme;

        let nav = navigation::mark_active(state.nav, &url);
        let (prev, next) = if theme.pagination {
            navigation::neighbours(state.nav, &url)
        } else {
            (None, None)
        };

        let toc = if theme.table_of_contents {
            page.rendered
                .toc
                .iter()
                .filter(|e| e.level > 1)
                .map(TocEntry::from)
                .collect()
        } else {
            Vec::new()
        };

        let context = Context {
            title: page.title.clone(),
            site_title: self.config.title.clone(),
            description: page
                .description()
                .map(str::to_string)
                .or_else(|| self.config.description.clone()),
            content: page.rendered.html.clone(),
            nav,
            toc,
            base_url: base_url.clone(),
            styles: state.styles.to_vec(),
            head: state.setup.head.clone(),
            social: theme.social.clone(),
            prev,
            next,
            edit_url: theme.edit_url(&page.relative_path),
            live_reload: self.live_reload,
        };

        let html = state
            .templates
            .render_page("doc.html", &context)
            .map_err(|e| BuildError::Template {
                page: page.relative_path.display().to_string(),
                message: e.to_string(),
            })?;

        let output_path = if page.slug == NOT_FOUND_SLUG {
            output_dir.join("404.html")
        } else {
            page.output_path(output_dir)
        };

        if let Some(parent) = output_path.parent() {
            create_dir(parent)?;
        }
        write_file(&output_path, html)?;

        tracing::debug!("Rendered {} -> {}", page.relative_path.display(), url);
        Ok(())
    }

    /// Render the theme's default not-found page.
    fn build_not_found(&self, state: &RenderState<'_>, output_dir: &Path) -> Result<(), BuildError> {
        let context = Context {
            title: "Page not found".to_string(),
            site_title: self.config.title.clone(),
            description: self.config.description.clone(),
            nav: state.nav.to_vec(),
            base_url: self.config.build.base_url.clone(),
            styles: state.styles.to_vec(),
            head: state.setup.head.clone(),
            social: state.setup.theme.social.clone(),
            live_reload: self.live_reload,
            ..Default::default()
        };

        let html = state
            .templates
            .render_page("404.html", &context)
            .map_err(|e| BuildError::Template {
                page: "404".to_string(),
                message: e.to_string(),
            })?;

        write_file(&output_dir.join("404.html"), html)
    }

    /// Write registered assets and return the stylesheet URLs in order.
    fn write_assets(&self, setup: &SiteSetup, output_dir: &Path) -> Result<Vec<String>, BuildError> {
        let assets_dir = output_dir.join("assets");
        create_dir(&assets_dir)?;

        let mut styles = Vec::new();
        for asset in &setup.assets {
            let contents = AssetPipeline::prepare(asset, self.config.build.minify);
            write_file(&assets_dir.join(&asset.file_name), contents)?;

            if asset.is_css() {
                styles.push(format!(
                    "{}assets/{}",
                    self.config.build.base_url, asset.file_name
                ));
            }
        }

        Ok(styles)
    }
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), BuildError> {
    fs::write(path, contents).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}
