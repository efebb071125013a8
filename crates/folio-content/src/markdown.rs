//! Markdown rendering with heading anchors and a table of contents.

use std::collections::HashSet;
use std::sync::LazyLock;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

use crate::slug::slugify;

/// Longest excerpt kept for meta descriptions.
const EXCERPT_LIMIT: usize = 160;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// A rendered Markdown page body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    /// HTML output
    pub html: String,

    /// Table of contents entries, in document order
    pub toc: Vec<TocEntry>,

    /// Plain text of the first paragraph, shortened for meta tags
    pub excerpt: Option<String>,
}

impl Rendered {
    /// Text of the first level-1 heading, if any.
    pub fn first_heading(&self) -> Option<&str> {
        self.toc
            .iter()
            .find(|e| e.level == 1)
            .map(|e| e.title.as_str())
    }
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Render Markdown to HTML.
///
/// Every heading receives an `id` attribute so the table of contents can link
/// to it. Headings with an explicit `{#id}` keep it.
pub fn render_markdown(content: &str) -> Rendered {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES;

    let mut events: Vec<Event<'_>> = Parser::new_ext(content, options).collect();

    let toc = assign_heading_ids(&mut events);
    let excerpt = first_paragraph(&events);

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    Rendered {
        html: html_output,
        toc,
        excerpt,
    }
}

/// Give every heading a unique anchor and collect the table of contents.
fn assign_heading_ids(events: &mut [Event<'_>]) -> Vec<TocEntry> {
    let mut toc = Vec::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut i = 0;

    while i < events.len() {
        let (level, explicit_id) = match &events[i] {
            Event::Start(Tag::Heading { level, id, .. }) => {
                (*level as u8, id.as_ref().map(|s| s.to_string()))
            }
            _ => {
                i += 1;
                continue;
            }
        };

        let mut title = String::new();
        let mut end = i + 1;
        while end < events.len() {
            match &events[end] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(text) | Event::Code(text) => title.push_str(text),
                _ => {}
            }
            end += 1;
        }

        let base = explicit_id.unwrap_or_else(|| slugify(&title));
        let anchor = unique_anchor(if base.is_empty() { "section".to_string() } else { base }, &mut used);

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(anchor.clone()));
        }

        toc.push(TocEntry {
            title: title.trim().to_string(),
            id: anchor,
            level,
        });

        i = end + 1;
    }

    toc
}

/// `name`, then `name-1`, `name-2`, ... skipping any id already on the page.
fn unique_anchor(base: String, used: &mut HashSet<String>) -> String {
    let mut anchor = base.clone();
    let mut n = 0;
    while used.contains(&anchor) {
        n += 1;
        anchor = format!("{}-{}", base, n);
    }
    used.insert(anchor.clone());
    anchor
}

/// Plain text of the first top-level paragraph.
fn first_paragraph(events: &[Event<'_>]) -> Option<String> {
    let start = events
        .iter()
        .position(|e| matches!(e, Event::Start(Tag::Paragraph)))?;

    let mut text = String::new();
    for event in &events[start + 1..] {
        match event {
            Event::End(TagEnd::Paragraph) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }

    let text = WHITESPACE.replace_all(text.trim(), " ").to_string();
    if text.is_empty() {
        return None;
    }

    Some(truncate_words(&text, EXCERPT_LIMIT))
}

fn truncate_words(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let cut: String = text.chars().take(limit).collect();
    let cut = match cut.rfind(' ') {
        Some(pos) => &cut[..pos],
        None => cut.as_str(),
    };
    format!("{}…", cut.trim_end_matches(|c: char| c.is_ascii_punctuation()))
}
