//! YAML front-matter at the top of a page.

use serde::Deserialize;

const FENCE: &str = "---";

/// Page metadata. Every key is optional; an empty title means the title is
/// taken from the page's first heading or its file name.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Frontmatter {
    pub title: String,

    /// Used for the meta description
    pub description: Option<String>,

    /// Sidebar position; pages without one sort after ordered pages
    pub order: Option<i32>,

    /// Sidebar label, when it should differ from the title
    pub label: Option<String>,

    /// Listed in the autogenerated sidebar
    pub nav: bool,

    /// Route override, relative to the base URL
    pub slug: Option<String>,

    /// Skipped unless drafts are requested
    pub draft: bool,
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            order: None,
            label: None,
            nav: true,
            slug: None,
            draft: false,
        }
    }
}

/// Errors that can occur when parsing front-matter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Front-matter block is never closed (expected a line with ---)")]
    Unclosed,

    #[error("Invalid YAML in front-matter: {0}")]
    InvalidYaml(String),
}

/// Split a page into its front-matter and body.
///
/// The block must open on the first non-blank line and close with a line of
/// its own. Pages without a block come back unchanged with `None`.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let Some((yaml, body)) = split(source)? else {
        return Ok((None, source));
    };

    if yaml.trim().is_empty() {
        return Ok((Some(Frontmatter::default()), body));
    }

    let frontmatter = serde_yaml::from_str(yaml)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    Ok((Some(frontmatter), body))
}

fn split(source: &str) -> Result<Option<(&str, &str)>, FrontmatterError> {
    let trimmed = source.trim_start();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return Ok(None);
    };
    // `----` or `--- text` is a thematic break, not a fence
    let Some(rest) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return Ok(None);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok(Some((yaml, body.trim_start())));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unclosed)
}
