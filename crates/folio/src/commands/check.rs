//! Validate a site without writing output.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use folio_static::{NavItem, StaticBuilder};

/// Run the check command.
pub fn run(config_path: &Path) -> Result<()> {
    let config = super::load_site(config_path)?;
    let title = config.title.clone();

    let summary = StaticBuilder::new(Arc::new(config)).check()?;

    tracing::info!("Site: {}", title);
    tracing::info!("Integrations: {}", summary.integrations.join(", "));
    tracing::info!("Pages: {}", summary.pages.len());
    for line in outline(&summary.nav) {
        tracing::info!("{}", line);
    }

    tracing::info!("No problems found");
    Ok(())
}

/// Indented sidebar outline, one line per entry.
fn outline(items: &[NavItem]) -> Vec<String> {
    fn walk(items: &[NavItem], depth: usize, lines: &mut Vec<String>) {
        for item in items {
            let target = item.path.as_deref().unwrap_or("-");
            lines.push(format!("{}{} ({})", "  ".repeat(depth), item.label, target));
            walk(&item.children, depth + 1, lines);
        }
    }

    let mut lines = Vec::new();
    walk(items, 0, &mut lines);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn outlines_nested_navigation() {
        let nav = vec![
            NavItem::link("Home", "/"),
            NavItem::group("Guides", vec![NavItem::link("Install", "/guides/install/")]),
        ];

        assert_eq!(
            outline(&nav),
            vec!["Home (/)", "Guides (-)", "  Install (/guides/install/)"]
        );
    }

    #[test]
    fn rejects_unknown_integration() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("folio.toml");
        fs::write(
            &config_path,
            "title = \"Docs\"\n[[integrations]]\nname = \"docs-theme\"\n[[integrations]]\nname = \"search\"\n",
        )
        .unwrap();
        fs::create_dir_all(temp.path().join("docs")).unwrap();

        let err = run(&config_path).unwrap_err();

        assert!(err.to_string().contains("search"));
    }
}
