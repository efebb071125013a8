//! Create a starter documentation site.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
///
/// Writes the config file and a `docs/` directory next to it. Existing files
/// are left alone unless `overwrite` is set.
pub fn run(config_path: &Path, overwrite: bool) -> Result<()> {
    tracing::info!("Initializing folio...");

    let root = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let docs_dir = root.join("docs");
    fs::create_dir_all(&docs_dir).context("Failed to create docs directory")?;

    let files = [
        (config_path.to_path_buf(), DEFAULT_CONFIG),
        (docs_dir.join("index.md"), DEFAULT_INDEX),
        (docs_dir.join("getting-started.md"), DEFAULT_GETTING_STARTED),
    ];

    for (path, contents) in files {
        if path.exists() && !overwrite {
            tracing::warn!("{} already exists. Use --yes to overwrite.", path.display());
            continue;
        }
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Created {}", path.display());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'folio dev' to start the development server.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Folio configuration

title = "My Documentation"
description = "Documentation built with folio"

# Integrations run in the order they are listed
[[integrations]]
name = "docs-theme"

[build]
content_dir = "docs"
output = "dist"
base_url = "/"
minify = true
"#;

const DEFAULT_INDEX: &str = r#"---
title: Welcome
order: 0
---

# Welcome

This is your documentation site, powered by **folio**.

Read the [Getting Started](getting-started/) guide next.
"#;

const DEFAULT_GETTING_STARTED: &str = r#"---
title: Getting Started
description: Write, preview and publish your docs.
order: 1
---

# Getting Started

## Writing pages

Add Markdown files under `docs/`. Directories become sidebar groups, and an
`index.md` inside a directory becomes the group's landing page.

Front-matter is optional:

```yaml
---
title: Page Title
description: Shown in search results
order: 1
---
```

## Development

Start the dev server, which rebuilds and reloads on every change:

```bash
folio dev
```

## Building

```bash
folio build
```

The site is written to `dist/`.
"#;
