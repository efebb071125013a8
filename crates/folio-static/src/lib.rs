//! Static site generator for folio documentation.
//!
//! Resolves the configured integrations, assembles the sidebar from discovered
//! content and renders every page through the theme's templates.

pub mod assets;
pub mod builder;
pub mod integrations;
pub mod navigation;
pub mod sitemap;
pub mod templates;
pub mod theme;

pub use builder::{BuildError, BuildResult, SiteSummary, StaticBuilder};
pub use integrations::{
    BuiltSite, Integration, IntegrationError, IntegrationRegistry, PageSummary, SiteSetup,
};
pub use navigation::{NavError, NavItem, SidebarEntry};
pub use theme::{DocsTheme, ThemeOptions};
