//! The `sitemap` integration: `sitemap.xml` and `robots.txt`.

use std::fs;

use serde::Deserialize;

use folio_config::SiteConfig;

use crate::integrations::{parse_options, BuiltSite, Integration, IntegrationError, SiteSetup};

const NAME: &str = "sitemap";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SitemapOptions {
    /// Public origin, e.g. "https://docs.example.com"
    site: String,
}

/// Writes a sitemap of every built page.
#[derive(Debug, Clone)]
pub struct Sitemap {
    site: String,
}

impl Sitemap {
    pub fn from_options(options: &toml::Table) -> Result<Self, IntegrationError> {
        let options: SitemapOptions = parse_options(NAME, options)?;
        let site = options.site.trim().trim_end_matches('/').to_string();

        if !(site.starts_with("http://") || site.starts_with("https://")) {
            return Err(IntegrationError::invalid_options(
                NAME,
                format!("`site` must be an absolute http(s) URL, got {:?}", options.site),
            ));
        }

        Ok(Self { site })
    }

    /// Absolute URL for a site-relative path.
    fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.site, path)
    }
}

impl Integration for Sitemap {
    fn name(&self) -> &'static str {
        NAME
    }

    fn setup(&self, config: &SiteConfig, setup: &mut SiteSetup) -> Result<(), IntegrationError> {
        setup.head.push(format!(
            r#"<link rel="sitemap" href="{}sitemap.xml">"#,
            config.build.base_url
        ));
        Ok(())
    }

    fn build_done(&self, site: &BuiltSite<'_>) -> Result<(), IntegrationError> {
        let urls: Vec<String> = site
            .pages
            .iter()
            .map(|page| {
                format!(
                    "  <url>\n    <loc>{}</loc>\n  </url>",
                    escape_xml(&self.absolute(&page.url))
                )
            })
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>
"#,
            urls.join("\n")
        );

        fs::write(site.output_dir.join("sitemap.xml"), sitemap)
            .map_err(|e| IntegrationError::failed(NAME, e))?;

        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}\n",
            self.absolute(&format!("{}sitemap.xml", site.config.build.base_url))
        );
        fs::write(site.output_dir.join("robots.txt"), robots)
            .map_err(|e| IntegrationError::failed(NAME, e))?;

        tracing::debug!("Wrote sitemap with {} URLs", site.pages.len());
        Ok(())
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::PageSummary;
    use folio_config::{BuildSettings, IntegrationDescriptor, DOCS_THEME};
    use tempfile::tempdir;

    fn options(site: &str) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert("site".to_string(), toml::Value::from(site));
        table
    }

    fn config(base_url: &str) -> SiteConfig {
        SiteConfig {
            title: "Docs".to_string(),
            description: None,
            integrations: vec![IntegrationDescriptor::new(DOCS_THEME)],
            build: BuildSettings {
                base_url: base_url.to_string(),
                ..Default::default()
            },
            root: ".".into(),
        }
    }

    #[test]
    fn requires_absolute_site() {
        assert!(Sitemap::from_options(&toml::Table::new()).is_err());
        assert!(Sitemap::from_options(&options("docs.example.com")).is_err());
        assert!(Sitemap::from_options(&options("https://docs.example.com/")).is_ok());
    }

    #[test]
    fn adds_head_link() {
        let sitemap = Sitemap::from_options(&options("https://example.com")).unwrap();
        let mut setup = SiteSetup::default();

        sitemap.setup(&config("/docs/"), &mut setup).unwrap();

        assert_eq!(
            setup.head,
            vec![r#"<link rel="sitemap" href="/docs/sitemap.xml">"#.to_string()]
        );
    }

    #[test]
    fn writes_sitemap_and_robots() {
        let temp = tempdir().unwrap();
        let sitemap = Sitemap::from_options(&options("https://example.com/")).unwrap();
        let config = config("/docs/");
        let pages = vec![
            PageSummary {
                url: "/docs/".to_string(),
                title: "Home".to_string(),
            },
            PageSummary {
                url: "/docs/guides/install/".to_string(),
                title: "Install".to_string(),
            },
        ];

        sitemap
            .build_done(&BuiltSite {
                config: &config,
                output_dir: temp.path(),
                pages: &pages,
            })
            .unwrap();

        let xml = fs::read_to_string(temp.path().join("sitemap.xml")).unwrap();
        assert!(xml.contains("<loc>https://example.com/docs/</loc>"));
        assert!(xml.contains("<loc>https://example.com/docs/guides/install/</loc>"));

        let robots = fs::read_to_string(temp.path().join("robots.txt")).unwrap();
        assert!(robots.contains("Sitemap: https://example.com/docs/sitemap.xml"));
    }

    #[test]
    fn escapes_xml() {
        assert_eq!(escape_xml("/a?b=1&c=2"), "/a?b=1&amp;c=2");
    }
}
