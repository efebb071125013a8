//! Template engine for rendering documentation pages.

use minijinja::Environment;
use serde::Serialize;

use folio_content::TocEntry as ContentTocEntry;

use crate::navigation::{NavItem, NavLink};
use crate::theme::SocialLink;

/// A table of contents entry.
#[derive(Debug, Clone, Serialize)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

impl From<&ContentTocEntry> for TocEntry {
    fn from(entry: &ContentTocEntry) -> Self {
        Self {
            title: entry.title.clone(),
            id: entry.id.clone(),
            level: entry.level,
        }
    }
}

/// Context for rendering a page template.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Context {
    /// Page title
    pub title: String,
    /// Site title
    pub site_title: String,
    /// Page description, falling back to the site description
    pub description: Option<String>,
    /// Rendered content HTML
    pub content: String,
    /// Navigation items
    pub nav: Vec<NavItem>,
    /// Table of contents
    pub toc: Vec<TocEntry>,
    /// Base URL
    pub base_url: String,
    /// Stylesheet URLs
    pub styles: Vec<String>,
    /// Raw tags added to `<head>` by integrations
    pub head: Vec<String>,
    /// Social links shown in the header
    pub social: Vec<SocialLink>,
    /// Previous page in sidebar order
    pub prev: Option<NavLink>,
    /// Next page in sidebar order
    pub next: Option<NavLink>,
    /// "Edit this page" URL
    pub edit_url: Option<String>,
    /// Include the dev server's live reload client
    pub live_reload: bool,
}

/// Template engine using minijinja.
#[derive(Debug)]
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the theme templates.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();

        env.add_template("base.html", BASE_TEMPLATE)?;
        env.add_template("doc.html", DOC_TEMPLATE)?;
        env.add_template("nav.html", NAV_TEMPLATE)?;
        env.add_template("404.html", NOT_FOUND_TEMPLATE)?;

        Ok(Self { env })
    }

    /// Render a page using the specified template.
    pub fn render_page(&self, template: &str, context: &Context) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;
        tmpl.render(context)
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if title != site_title %}{{ title }} | {% endif %}{{ site_title }}</title>
  {% if description %}<meta name="description" content="{{ description }}">
  <meta property="og:description" content="{{ description }}">
  {% endif %}<meta property="og:title" content="{{ title }}">
  <meta name="generator" content="folio">
  {% for style in styles %}<link rel="stylesheet" href="{{ style }}">
  {% endfor %}{% for tag in head %}{{ tag | safe }}
  {% endfor %}
</head>
<body>
  <header class="header">
    <a href="{{ base_url }}" class="site-title">{{ site_title }}</a>
    {% if social %}<ul class="social">
    {% for link in social %}<li><a href="{{ link.href }}" rel="me">{{ link.label }}</a></li>
    {% endfor %}</ul>{% endif %}
  </header>
  <div class="layout">
    <nav class="sidebar" aria-label="Main">
      {% include "nav.html" %}
    </nav>
    <main class="main">
      {% block content %}{% endblock %}
    </main>
  </div>
  {% if live_reload %}<script src="/__livereload.js"></script>{% endif %}
</body>
</html>"##;

const DOC_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="doc">
  <div class="content">
    {{ content | safe }}
  </div>
  {% if edit_url %}<p class="edit-link"><a href="{{ edit_url }}">Edit this page</a></p>{% endif %}
  {% if prev or next %}
  <footer class="pagination">
    {% if prev %}<a class="prev" rel="prev" href="{{ prev.path }}"><span>Previous</span> {{ prev.label }}</a>{% endif %}
    {% if next %}<a class="next" rel="next" href="{{ next.path }}"><span>Next</span> {{ next.label }}</a>{% endif %}
  </footer>
  {% endif %}
</article>

{% if toc %}
<aside class="toc">
  <h2>On this page</h2>
  <ul>
  {% for entry in toc %}
    <li class="toc-level-{{ entry.level }}">
      <a href="#{{ entry.id }}">{{ entry.title }}</a>
    </li>
  {% endfor %}
  </ul>
</aside>
{% endif %}
{% endblock %}"##;

const NAV_TEMPLATE: &str = r##"<ul class="nav-list">
{% for item in nav recursive %}
  <li class="nav-item{% if item.active %} active{% endif %}">
    {% if item.children %}
    <details{% if item.active or not item.collapsed %} open{% endif %}>
      <summary>{% if item.path %}<a href="{{ item.path }}"{% if item.active %} aria-current="page"{% endif %}>{{ item.label }}</a>{% else %}{{ item.label }}{% endif %}</summary>
      <ul class="nav-children">{{ loop(item.children) }}</ul>
    </details>
    {% else %}
    <a href="{{ item.path }}"{% if item.active %} aria-current="page"{% endif %}>{{ item.label }}</a>
    {% endif %}
  </li>
{% endfor %}
</ul>"##;

const NOT_FOUND_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="doc not-found">
  <h1>Page not found</h1>
  <p>The page you are looking for does not exist. <a href="{{ base_url }}">Go to the home page</a>.</p>
</article>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Context {
        Context {
            title: "Installation".to_string(),
            site_title: "My Docs".to_string(),
            content: "<p>Hello world</p>".to_string(),
            base_url: "/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn renders_basic_page() {
        let engine = TemplateEngine::new().unwrap();

        let html = engine.render_page("doc.html", &context()).unwrap();

        assert!(html.contains("<title>Installation | My Docs</title>"));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(!html.contains("__livereload"));
    }

    #[test]
    fn home_page_title_is_not_repeated() {
        let engine = TemplateEngine::new().unwrap();
        let mut ctx = context();
        ctx.title = "My Docs".to_string();

        let html = engine.render_page("doc.html", &ctx).unwrap();

        assert!(html.contains("<title>My Docs</title>"));
    }

    #[test]
    fn escapes_titles_and_descriptions() {
        let engine = TemplateEngine::new().unwrap();
        let mut ctx = context();
        ctx.title = "<script>".to_string();
        ctx.description = Some("Tom & Jerry".to_string());

        let html = engine.render_page("doc.html", &ctx).unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"content="Tom &amp; Jerry""#));
    }

    #[test]
    fn renders_nested_navigation() {
        let engine = TemplateEngine::new().unwrap();
        let mut ctx = context();
        let mut guides = NavItem::group(
            "Guides",
            vec![
                NavItem::link("Install", "/guides/install/"),
                NavItem::group("Advanced", vec![NavItem::link("Plugins", "/guides/advanced/plugins/")]),
            ],
        );
        guides.collapsed = true;
        ctx.nav = vec![NavItem::link("Home", "/"), guides];

        let html = engine.render_page("doc.html", &ctx).unwrap();

        assert!(html.contains(">Home</a>"));
        assert!(html.contains("Guides"));
        assert!(html.contains(">Plugins</a>"));
        assert!(html.contains("<details>"));
        assert!(html.contains("<details open>"));
    }

    #[test]
    fn renders_toc_pagination_and_edit_link() {
        let engine = TemplateEngine::new().unwrap();
        let mut ctx = context();
        ctx.toc = vec![TocEntry {
            title: "Usage".to_string(),
            id: "usage".to_string(),
            level: 2,
        }];
        ctx.prev = Some(NavLink {
            label: "Intro".to_string(),
            path: "/intro/".to_string(),
        });
        ctx.edit_url = Some("https://example.com/edit/install.md".to_string());

        let html = engine.render_page("doc.html", &ctx).unwrap();

        assert!(html.contains(r##"<a href="#usage">Usage</a>"##));
        assert!(html.contains(r#"class="prev""#));
        assert!(html.contains("Intro</a>"));
        assert!(!html.contains(r#"class="next""#));
        assert!(html.contains("Edit this page"));
    }

    #[test]
    fn includes_head_tags_and_live_reload() {
        let engine = TemplateEngine::new().unwrap();
        let mut ctx = context();
        ctx.head = vec![r#"<link rel="sitemap" href="/sitemap.xml">"#.to_string()];
        ctx.styles = vec!["/assets/theme.css".to_string()];
        ctx.live_reload = true;

        let html = engine.render_page("doc.html", &ctx).unwrap();

        assert!(html.contains(r#"<link rel="sitemap" href="/sitemap.xml">"#));
        assert!(html.contains(r#"<link rel="stylesheet" href=""#));
        assert!(html.contains("theme.css"));
        assert!(html.contains("/__livereload.js"));
    }

    #[test]
    fn renders_not_found_page() {
        let engine = TemplateEngine::new().unwrap();
        let mut ctx = context();
        ctx.title = "Page not found".to_string();

        let html = engine.render_page("404.html", &ctx).unwrap();

        assert!(html.contains("Page not found"));
        assert!(html.contains("Go to the home page</a>"));
    }
}
