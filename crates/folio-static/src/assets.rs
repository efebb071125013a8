//! Stylesheet assets and CSS minification.

/// A file written under `assets/` in the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// File name inside `assets/`
    pub file_name: String,
    /// File contents
    pub contents: String,
}

impl Asset {
    pub fn new(file_name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }

    /// Whether this asset is a stylesheet.
    pub fn is_css(&self) -> bool {
        self.file_name.ends_with(".css")
    }
}

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// The theme's default stylesheet.
    pub fn theme_css() -> &'static str {
        THEME_CSS
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }

    /// Minify a stylesheet asset, keeping the original on failure.
    pub fn prepare(asset: &Asset, minify: bool) -> String {
        if !minify || !asset.is_css() {
            return asset.contents.clone();
        }

        match Self::minify_css(&asset.contents) {
            Ok(css) => css,
            Err(e) => {
                tracing::warn!("Could not minify {}: {}", asset.file_name, e);
                asset.contents.clone()
            }
        }
    }
}

const THEME_CSS: &str = r#"/* folio docs theme */

:root {
  --sidebar-width: 260px;
  --toc-width: 200px;
  --content-max-width: 760px;
  --background: #ffffff;
  --foreground: #1f2328;
  --muted: #f6f8fa;
  --border: #d0d7de;
  --accent: #0969da;
  --font-sans: system-ui, -apple-system, "Segoe UI", sans-serif;
  --font-mono: ui-monospace, SFMono-Regular, Menlo, monospace;
}

@media (prefers-color-scheme: dark) {
  :root {
    --background: #0d1117;
    --foreground: #e6edf3;
    --muted: #161b22;
    --border: #30363d;
    --accent: #4493f8;
  }
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: var(--font-sans);
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

a {
  color: var(--accent);
}

.header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 0.75rem 1.5rem;
  border-bottom: 1px solid var(--border);
}

.site-title {
  font-weight: 700;
  font-size: 1.2rem;
  color: var(--foreground);
  text-decoration: none;
}

.social {
  display: flex;
  gap: 1rem;
  list-style: none;
  margin: 0;
  padding: 0;
}

.layout {
  display: grid;
  grid-template-columns: var(--sidebar-width) 1fr;
  min-height: calc(100vh - 3.5rem);
}

.sidebar {
  background: var(--muted);
  border-right: 1px solid var(--border);
  padding: 1rem 1.25rem;
  position: sticky;
  top: 0;
  max-height: 100vh;
  overflow-y: auto;
}

.nav-list,
.nav-children {
  list-style: none;
  margin: 0;
  padding: 0;
}

.nav-children {
  padding-left: 0.85rem;
  border-left: 1px solid var(--border);
}

.nav-item a {
  display: block;
  padding: 0.2rem 0.4rem;
  border-radius: 4px;
  color: var(--foreground);
  text-decoration: none;
}

.nav-item a[aria-current="page"] {
  background: var(--accent);
  color: var(--background);
}

.nav-item summary {
  cursor: pointer;
  font-weight: 600;
  padding: 0.2rem 0;
}

.main {
  display: flex;
  gap: 2rem;
  padding: 2rem 3rem;
}

.doc {
  flex: 1;
  max-width: var(--content-max-width);
}

.content pre {
  background: var(--muted);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 1rem;
  overflow-x: auto;
}

.content code {
  font-family: var(--font-mono);
  font-size: 0.9em;
}

.content table {
  border-collapse: collapse;
}

.content th,
.content td {
  border: 1px solid var(--border);
  padding: 0.4rem 0.75rem;
}

.toc {
  width: var(--toc-width);
  position: sticky;
  top: 2rem;
  align-self: flex-start;
  font-size: 0.875rem;
}

.toc h2 {
  font-size: 0.8rem;
  text-transform: uppercase;
}

.toc ul {
  list-style: none;
  padding: 0;
}

.toc-level-3 {
  padding-left: 0.75rem;
}

.toc-level-4,
.toc-level-5,
.toc-level-6 {
  padding-left: 1.5rem;
}

.pagination {
  display: flex;
  justify-content: space-between;
  margin-top: 3rem;
  gap: 1rem;
}

.pagination a {
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 0.75rem 1rem;
  text-decoration: none;
}

.pagination .next {
  margin-left: auto;
  text-align: right;
}

.pagination span {
  display: block;
  font-size: 0.75rem;
  color: var(--foreground);
}

.edit-link {
  margin-top: 2rem;
  font-size: 0.875rem;
}

@media (max-width: 900px) {
  .layout {
    grid-template-columns: 1fr;
  }

  .sidebar {
    position: static;
    max-height: none;
  }

  .toc {
    display: none;
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minifies_theme_css() {
        let css = AssetPipeline::theme_css();

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(minified.len() < css.len());
        assert!(minified.contains(".sidebar{"));
    }

    #[test]
    fn unbalanced_css_still_produces_stylesheet() {
        let asset = Asset::new("broken.css", ".a { color: red; ");

        let prepared = AssetPipeline::prepare(&asset, true);

        assert!(prepared.contains("color"));
    }

    #[test]
    fn leaves_assets_untouched_without_minify() {
        let asset = Asset::new("theme.css", ".a {\n  color: red;\n}\n");

        assert_eq!(AssetPipeline::prepare(&asset, false), asset.contents);
    }

    #[test]
    fn only_minifies_stylesheets() {
        let asset = Asset::new("notes.txt", "keep   as   is");

        assert_eq!(AssetPipeline::prepare(&asset, true), "keep   as   is");
    }
}
