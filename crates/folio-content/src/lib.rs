//! Content discovery for folio documentation sites.
//!
//! This crate walks a content directory, extracts YAML front-matter from each
//! Markdown page, renders the body to HTML with heading anchors, and computes
//! the route every page is published under.

pub mod discovery;
pub mod frontmatter;
pub mod markdown;
pub mod slug;

pub use discovery::{discover_pages, DiscoveryError, DiscoveryOptions, Page};
pub use frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
pub use markdown::{render_markdown, Rendered, TocEntry};
pub use slug::slugify;
