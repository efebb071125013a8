//! Content discovery: walk the content directory and collect pages.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
use crate::markdown::{render_markdown, Rendered};
use crate::slug::{slugify, title_case};

/// Options controlling which files are collected.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoveryOptions {
    /// Include pages marked `draft: true`
    pub drafts: bool,
}

/// A discovered documentation page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Source file path
    pub source_path: PathBuf,

    /// Path relative to the content directory
    pub relative_path: PathBuf,

    /// Route relative to the base URL, without surrounding slashes ("" for the home page)
    pub slug: String,

    /// Resolved page title
    pub title: String,

    /// Frontmatter, defaulted when the file has none
    pub frontmatter: Frontmatter,

    /// Rendered body
    pub rendered: Rendered,
}

impl Page {
    /// Public URL of the page.
    pub fn url(&self, base_url: &str) -> String {
        if self.slug.is_empty() {
            base_url.to_string()
        } else {
            format!("{}{}/", base_url, self.slug)
        }
    }

    /// Output file for the page inside `output_dir`.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        if self.slug.is_empty() {
            output_dir.join("index.html")
        } else {
            output_dir.join(&self.slug).join("index.html")
        }
    }

    /// Label shown in navigation.
    pub fn label(&self) -> &str {
        self.frontmatter.label.as_deref().unwrap_or(&self.title)
    }

    /// Description for meta tags: frontmatter first, then the first paragraph.
    pub fn description(&self) -> Option<&str> {
        self.frontmatter
            .description
            .as_deref()
            .or(self.rendered.excerpt.as_deref())
    }

    /// Whether this is the `index` page of its directory.
    pub fn is_index(&self) -> bool {
        self.relative_path.file_stem().and_then(|s| s.to_str()) == Some("index")
    }

    /// Directory of the source file relative to the content directory.
    pub fn directory(&self) -> &Path {
        self.relative_path.parent().unwrap_or(Path::new(""))
    }
}

/// Errors that can occur during content discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Content directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },

    #[error("Pages {first} and {second} both map to route /{slug}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid route for {path}: {reason}")]
    InvalidSlug { path: PathBuf, reason: String },
}

/// Discover all Markdown pages in `content_dir`.
///
/// Pages are returned sorted by their path relative to `content_dir`.
pub fn discover_pages(
    content_dir: &Path,
    options: DiscoveryOptions,
) -> Result<Vec<Page>, DiscoveryError> {
    if !content_dir.is_dir() {
        return Err(DiscoveryError::MissingDirectory(content_dir.to_path_buf()));
    }

    let mut pages = Vec::new();
    let mut routes: HashMap<String, PathBuf> = HashMap::new();

    let walker = WalkDir::new(content_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();

        if !entry.file_type().is_file() {
            continue;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != "md" && ext != "mdx" {
            continue;
        }

        let relative_path = path
            .strip_prefix(content_dir)
            .unwrap_or(path)
            .to_path_buf();

        let Some(page) = load_page(path, relative_path, options)? else {
            continue;
        };

        if let Some(first) = routes.get(&page.slug) {
            return Err(DiscoveryError::DuplicateSlug {
                slug: page.slug.clone(),
                first: first.clone(),
                second: page.relative_path.clone(),
            });
        }
        routes.insert(page.slug.clone(), page.relative_path.clone());

        pages.push(page);
    }

    pages.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    tracing::debug!(
        "Discovered {} pages in {}",
        pages.len(),
        content_dir.display()
    );

    Ok(pages)
}

/// Read and parse one page. Returns `None` for drafts that are not built.
fn load_page(
    path: &Path,
    relative_path: PathBuf,
    options: DiscoveryOptions,
) -> Result<Option<Page>, DiscoveryError> {
    let source = fs::read_to_string(path).map_err(|source| DiscoveryError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let (frontmatter, body) =
        extract_frontmatter(&source).map_err(|source| DiscoveryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let frontmatter = frontmatter.unwrap_or_default();
    if frontmatter.draft && !options.drafts {
        tracing::debug!("Skipping draft {}", path.display());
        return Ok(None);
    }

    let rendered = render_markdown(body);
    let slug = route_slug(&relative_path, &frontmatter).map_err(|reason| {
        DiscoveryError::InvalidSlug {
            path: path.to_path_buf(),
            reason,
        }
    })?;

    let stem = relative_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    let title = if !frontmatter.title.trim().is_empty() {
        frontmatter.title.trim().to_string()
    } else if let Some(heading) = rendered.first_heading() {
        heading.to_string()
    } else if stem == "index" {
        relative_path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .map(title_case)
            .unwrap_or_else(|| "Home".to_string())
    } else {
        title_case(stem)
    };

    Ok(Some(Page {
        source_path: path.to_path_buf(),
        relative_path,
        slug,
        title,
        frontmatter,
        rendered,
    }))
}

/// Compute the route of a page from its relative path or frontmatter override.
///
/// Every route segment is non-empty and never `.` or `..`, so the page's
/// output path stays inside the output directory.
fn route_slug(relative: &Path, frontmatter: &Frontmatter) -> Result<String, String> {
    if let Some(slug) = &frontmatter.slug {
        let slug = slug.trim_matches('/');
        if slug.is_empty() {
            return Ok(String::new());
        }
        for segment in slug.split('/') {
            let invalid = segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.contains('\\');
            if invalid {
                return Err(format!("slug {:?} has an invalid segment {:?}", slug, segment));
            }
        }
        return Ok(slug.to_string());
    }

    let mut names: Vec<&str> = relative
        .parent()
        .map(|p| p.components().filter_map(|c| c.as_os_str().to_str()).collect())
        .unwrap_or_default();

    let stem = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if stem != "index" {
        names.push(stem);
    }

    names
        .into_iter()
        .map(|name| {
            let part = slugify(name);
            if part.is_empty() {
                Err(format!(
                    "{:?} has no characters usable in a URL; set `slug` in front-matter",
                    name
                ))
            } else {
                Ok(part)
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|parts| parts.join("/"))
}

/// Files and directories starting with `.` or `_` are never published.
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.') || name.starts_with('_'))
        .unwrap_or(false)
}
