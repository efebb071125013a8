//! Sidebar navigation assembled from discovered pages and theme hints.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use folio_content::slug::title_case;
use folio_content::Page;

/// A navigation item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavItem {
    /// Display label
    pub label: String,
    /// URL path; groups without an index page have none
    pub path: Option<String>,
    /// Child items
    pub children: Vec<NavItem>,
    /// Whether this is the active page or contains it
    pub active: bool,
    /// Render the group collapsed unless it is active
    pub collapsed: bool,
    #[serde(skip)]
    order: Option<i32>,
}

impl NavItem {
    /// A link to a page or URL.
    pub fn link(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: Some(path.into()),
            children: Vec::new(),
            active: false,
            collapsed: false,
            order: None,
        }
    }

    /// A group of child items.
    pub fn group(label: impl Into<String>, children: Vec<NavItem>) -> Self {
        Self {
            label: label.into(),
            path: None,
            children,
            active: false,
            collapsed: false,
            order: None,
        }
    }
}

/// Previous/next link target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub label: String,
    pub path: String,
}

/// An explicit sidebar entry from the theme options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SidebarEntry {
    /// Bare page slug: `"guides/install"`
    Slug(String),

    /// Nested group of entries
    Group {
        label: String,
        items: Vec<SidebarEntry>,
        #[serde(default)]
        collapsed: bool,
    },

    /// Group filled from a content directory
    Autogenerate {
        label: String,
        autogenerate: Autogenerate,
        #[serde(default)]
        collapsed: bool,
    },

    /// Arbitrary link, internal or external
    Link { label: String, link: String },

    /// Page reference with an optional label override
    Page {
        slug: String,
        #[serde(default)]
        label: Option<String>,
    },
}

/// Directory to autogenerate a group from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Autogenerate {
    pub directory: String,
}

/// Errors that can occur when assembling navigation.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("Sidebar references unknown page: {0}")]
    UnknownPage(String),
}

/// Build the sidebar tree.
///
/// Without hints the whole content directory is autogenerated; with hints the
/// entries are laid out exactly in the order given.
pub fn assemble(
    pages: &[Page],
    hints: Option<&[SidebarEntry]>,
    base_url: &str,
) -> Result<Vec<NavItem>, NavError> {
    match hints {
        None => Ok(autogenerate(pages, Path::new(""), base_url)),
        Some(entries) => entries
            .iter()
            .map(|entry| resolve_entry(pages, entry, base_url))
            .collect(),
    }
}

fn resolve_entry(pages: &[Page], entry: &SidebarEntry, base_url: &str) -> Result<NavItem, NavError> {
    match entry {
        SidebarEntry::Slug(slug) => page_item(pages, slug, None, base_url),
        SidebarEntry::Page { slug, label } => page_item(pages, slug, label.as_deref(), base_url),
        SidebarEntry::Link { label, link } => Ok(NavItem::link(label, link)),
        SidebarEntry::Group {
            label,
            items,
            collapsed,
        } => {
            let children = items
                .iter()
                .map(|item| resolve_entry(pages, item, base_url))
                .collect::<Result<Vec<_>, _>>()?;
            let mut group = NavItem::group(label, children);
            group.collapsed = *collapsed;
            Ok(group)
        }
        SidebarEntry::Autogenerate {
            label,
            autogenerate: auto,
            collapsed,
        } => {
            let directory = PathBuf::from(auto.directory.trim_matches('/'));
            let children = autogenerate(pages, &directory, base_url);
            if children.is_empty() {
                tracing::warn!(
                    "Sidebar group '{}' found no pages in {}",
                    label,
                    directory.display()
                );
            }
            let mut group = NavItem::group(label, children);
            group.collapsed = *collapsed;
            Ok(group)
        }
    }
}

fn page_item(
    pages: &[Page],
    slug: &str,
    label: Option<&str>,
    base_url: &str,
) -> Result<NavItem, NavError> {
    let slug = slug.trim_matches('/');
    let slug = match slug {
        "index" => "",
        _ => slug.strip_suffix("/index").unwrap_or(slug),
    };
    let page = pages
        .iter()
        .find(|p| p.slug == slug)
        .ok_or_else(|| NavError::UnknownPage(slug.to_string()))?;

    Ok(NavItem::link(
        label.unwrap_or_else(|| page.label()),
        page.url(base_url),
    ))
}

/// Pages and subdirectories of one directory during autogeneration.
#[derive(Default)]
struct DirNode<'a> {
    index: Option<&'a Page>,
    pages: Vec<&'a Page>,
    dirs: BTreeMap<String, DirNode<'a>>,
}

/// Generate navigation for every visible page under `directory`.
///
/// Subdirectories become groups; a directory's `index` page supplies the
/// group's label, link and order.
pub fn autogenerate(pages: &[Page], directory: &Path, base_url: &str) -> Vec<NavItem> {
    let mut root = DirNode::default();

    for page in pages.iter().filter(|p| p.frontmatter.nav) {
        let Ok(rest) = page.directory().strip_prefix(directory) else {
            continue;
        };

        let components: Vec<String> = rest
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .map(str::to_string)
            .collect();

        let mut node = &mut root;
        for component in &components {
            node = node.dirs.entry(component.clone()).or_default();
        }

        if page.is_index() && !components.is_empty() {
            node.index = Some(page);
        } else {
            node.pages.push(page);
        }
    }

    dir_items(&root, base_url)
}

fn dir_items(node: &DirNode<'_>, base_url: &str) -> Vec<NavItem> {
    let mut items: Vec<NavItem> = node
        .pages
        .iter()
        .map(|page| {
            let mut item = NavItem::link(page.label(), page.url(base_url));
            item.order = page.frontmatter.order;
            item
        })
        .collect();

    for (name, child) in &node.dirs {
        let mut group = NavItem::group(title_case(name), dir_items(child, base_url));
        if let Some(index) = child.index {
            group.label = index.label().to_string();
            group.path = Some(index.url(base_url));
            group.order = index.frontmatter.order;
        }
        items.push(group);
    }

    // Explicit order first, then alphabetical by label
    items.sort_by(|a, b| {
        let key_a = (a.order.is_none(), a.order, a.label.to_lowercase());
        let key_b = (b.order.is_none(), b.order, b.label.to_lowercase());
        key_a.cmp(&key_b)
    });

    items
}

/// Copy of the tree with the item at `url` and its ancestors marked active.
pub fn mark_active(items: &[NavItem], url: &str) -> Vec<NavItem> {
    items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            item.children = mark_active(&item.children, url);
            item.active =
                item.path.as_deref() == Some(url) || item.children.iter().any(|c| c.active);
            item
        })
        .collect()
}

/// Previous and next pages around `url` in sidebar order.
///
/// Only internal links (starting with `/`) take part.
pub fn neighbours(items: &[NavItem], url: &str) -> (Option<NavLink>, Option<NavLink>) {
    let mut links = Vec::new();
    flatten(items, &mut links);

    let Some(pos) = links.iter().position(|l| l.path == url) else {
        return (None, None);
    };

    let prev = pos.checked_sub(1).map(|i| links[i].clone());
    let next = links.get(pos + 1).cloned();
    (prev, next)
}

fn flatten(items: &[NavItem], out: &mut Vec<NavLink>) {
    for item in items {
        if let Some(path) = item.path.as_deref().filter(|p| p.starts_with('/')) {
            out.push(NavLink {
                label: item.label.clone(),
                path: path.to_string(),
            });
        }
        flatten(&item.children, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_content::{Frontmatter, Rendered};
    use pretty_assertions::assert_eq;

    fn page(relative: &str, slug: &str, title: &str, order: Option<i32>) -> Page {
        Page {
            source_path: PathBuf::from("docs").join(relative),
            relative_path: PathBuf::from(relative),
            slug: slug.to_string(),
            title: title.to_string(),
            frontmatter: Frontmatter {
                title: title.to_string(),
                order,
                ..Default::default()
            },
            rendered: Rendered::default(),
        }
    }

    fn site() -> Vec<Page> {
        vec![
            page("index.md", "", "Home", Some(0)),
            page("faq.md", "faq", "FAQ", None),
            page("getting-started.md", "getting-started", "Getting Started", Some(1)),
            page("guides/index.md", "guides", "Guides", Some(2)),
            page("guides/deploy.md", "guides/deploy", "Deploy", Some(2)),
            page("guides/install.md", "guides/install", "Install", Some(1)),
            page("reference/cli.md", "reference/cli", "CLI", None),
        ]
    }

    fn labels(items: &[NavItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn autogenerates_ordered_tree() {
        let nav = assemble(&site(), None, "/").unwrap();

        assert_eq!(labels(&nav), vec!["Home", "Getting Started", "Guides", "FAQ", "Reference"]);

        let guides = &nav[2];
        assert_eq!(guides.path.as_deref(), Some("/guides/"));
        assert_eq!(labels(&guides.children), vec!["Install", "Deploy"]);

        let reference = &nav[4];
        assert_eq!(reference.path, None);
        assert_eq!(labels(&reference.children), vec!["CLI"]);
    }

    #[test]
    fn hidden_pages_are_not_autogenerated() {
        let mut pages = site();
        pages[1].frontmatter.nav = false;

        let nav = assemble(&pages, None, "/").unwrap();

        assert!(!labels(&nav).contains(&"FAQ"));
    }

    #[test]
    fn sidebar_label_overrides_title() {
        let mut pages = site();
        pages[2].frontmatter.label = Some("Start".to_string());

        let nav = assemble(&pages, None, "/").unwrap();

        assert_eq!(nav[1].label, "Start");
    }

    #[test]
    fn explicit_hints_define_order() {
        let hints = vec![
            SidebarEntry::Slug("faq".to_string()),
            SidebarEntry::Group {
                label: "Learn".to_string(),
                items: vec![
                    SidebarEntry::Page {
                        slug: "/guides/deploy/".to_string(),
                        label: Some("Shipping".to_string()),
                    },
                    SidebarEntry::Slug("getting-started".to_string()),
                ],
                collapsed: true,
            },
            SidebarEntry::Autogenerate {
                label: "Reference".to_string(),
                autogenerate: Autogenerate {
                    directory: "reference".to_string(),
                },
                collapsed: false,
            },
            SidebarEntry::Link {
                label: "GitHub".to_string(),
                link: "https://github.com/folio-docs/folio".to_string(),
            },
        ];

        let nav = assemble(&site(), Some(&hints), "/docs/").unwrap();

        assert_eq!(labels(&nav), vec!["FAQ", "Learn", "Reference", "GitHub"]);
        assert_eq!(nav[0].path.as_deref(), Some("/docs/faq/"));
        assert!(nav[1].collapsed);
        assert_eq!(labels(&nav[1].children), vec!["Shipping", "Getting Started"]);
        assert_eq!(nav[1].children[0].path.as_deref(), Some("/docs/guides/deploy/"));
        assert_eq!(labels(&nav[2].children), vec!["CLI"]);
    }

    #[test]
    fn index_slugs_resolve_to_directory_pages() {
        let hints = vec![
            SidebarEntry::Slug("index".to_string()),
            SidebarEntry::Slug("guides/index".to_string()),
        ];

        let nav = assemble(&site(), Some(&hints), "/").unwrap();

        assert_eq!(nav[0].path.as_deref(), Some("/"));
        assert_eq!(nav[1].path.as_deref(), Some("/guides/"));
    }

    #[test]
    fn unknown_slug_in_hints_is_an_error() {
        let hints = vec![SidebarEntry::Slug("missing".to_string())];

        let result = assemble(&site(), Some(&hints), "/");

        assert!(matches!(result, Err(NavError::UnknownPage(slug)) if slug == "missing"));
    }

    #[test]
    fn parses_hints_from_toml() {
        let source = r#"
sidebar = [
  "faq",
  { label = "Guides", items = ["guides/install", { slug = "guides/deploy", label = "Ship" }] },
  { label = "Reference", autogenerate = { directory = "reference" } },
  { label = "Home page", link = "/" },
]
"#;

        #[derive(Deserialize)]
        struct Options {
            sidebar: Vec<SidebarEntry>,
        }

        let options: Options = toml::from_str(source).unwrap();

        assert_eq!(options.sidebar[0], SidebarEntry::Slug("faq".to_string()));
        assert!(matches!(&options.sidebar[1], SidebarEntry::Group { items, .. } if items.len() == 2));
        assert!(matches!(&options.sidebar[2], SidebarEntry::Autogenerate { autogenerate, .. } if autogenerate.directory == "reference"));
        assert!(matches!(&options.sidebar[3], SidebarEntry::Link { link, .. } if link == "/"));
    }

    #[test]
    fn marks_active_item_and_ancestors() {
        let nav = assemble(&site(), None, "/").unwrap();

        let marked = mark_active(&nav, "/guides/deploy/");

        assert!(marked[2].active);
        assert!(marked[2].children[1].active);
        assert!(!marked[2].children[0].active);
        assert!(!marked[0].active);
    }

    #[test]
    fn finds_previous_and_next_pages() {
        let nav = assemble(&site(), None, "/").unwrap();

        let (prev, next) = neighbours(&nav, "/guides/");
        assert_eq!(prev.unwrap().label, "Getting Started");
        assert_eq!(next.unwrap().label, "Install");

        let (prev, _) = neighbours(&nav, "/");
        assert!(prev.is_none());

        let (_, next) = neighbours(&nav, "/reference/cli/");
        assert!(next.is_none());
    }
}
