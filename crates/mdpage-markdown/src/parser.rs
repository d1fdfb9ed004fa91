//! Markdown document parser.

use std::collections::HashSet;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};

/// A parsed Markdown document.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Markdown content (without frontmatter)
    pub content: String,

    /// Headings in document order, with the ids they render with
    pub toc: Vec<TocEntry>,
}

impl ParsedDoc {
    /// Title from frontmatter, if any.
    pub fn title(&self) -> Option<&str> {
        self.frontmatter.as_ref().and_then(|f| f.title.as_deref())
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

/// Errors that can occur when parsing Markdown.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Markdown extensions enabled for every document.
pub(crate) fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Parse a Markdown document.
///
/// Extracts frontmatter and collects headings with their anchor ids.
pub fn parse_markdown(source: &str) -> Result<ParsedDoc, ParseError> {
    parse_markdown_with_ids(source, &mut HeadingIds::default())
}

/// Parse a Markdown document, drawing heading ids from `ids`.
///
/// Documents rendered into one page share a [`HeadingIds`] so their anchors
/// stay unique across the page.
pub fn parse_markdown_with_ids(source: &str, ids: &mut HeadingIds) -> Result<ParsedDoc, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    let (_, toc) = heading_events(content, |explicit, title| match explicit {
        Some(id) => ids.claim(id),
        None => ids.generate(title),
    });

    Ok(ParsedDoc {
        frontmatter,
        content: content.to_string(),
        toc,
    })
}

/// Parse `content` into events with an id set on every heading.
///
/// `assign` receives the explicit `{#id}` attribute, if any, and the
/// heading text, and returns the id to use.
pub(crate) fn heading_events<'a>(
    content: &'a str,
    mut assign: impl FnMut(Option<String>, &str) -> String,
) -> (Vec<Event<'a>>, Vec<TocEntry>) {
    let mut events: Vec<Event> = Parser::new_ext(content, markdown_options()).collect();
    let mut toc = Vec::new();

    let mut i = 0;
    while i < events.len() {
        let (level, explicit) = match &events[i] {
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
        while end < events.len() && !matches!(events[end], Event::End(TagEnd::Heading(_))) {
            if let Event::Text(text) | Event::Code(text) = &events[end] {
                title.push_str(text);
            }
            end += 1;
        }

        let anchor = assign(explicit, &title);

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(anchor.clone()));
        }

        toc.push(TocEntry {
            title,
            id: anchor,
            level,
        });
        i = end + 1;
    }

    (events, toc)
}

/// Hands out unique heading ids.
///
/// Slugs of the heading text, suffixed `-1`, `-2`, ... when already taken.
/// Explicit ids are claimed the same way.
#[derive(Debug, Default)]
pub struct HeadingIds {
    used: HashSet<String>,
}

impl HeadingIds {
    fn generate(&mut self, text: &str) -> String {
        let base = slugify(text);
        let base = if base.is_empty() {
            "heading".to_string()
        } else {
            base
        };
        self.claim(base)
    }

    fn claim(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}-{}", base, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_document_with_frontmatter() {
        let source = r#"---
title: Guide
---

# Intro

Some text.

## Details

### Deep `code` dive
"#;

        let doc = parse_markdown(source).unwrap();

        assert_eq!(doc.title(), Some("Guide"));
        assert_eq!(
            doc.toc,
            vec![
                TocEntry {
                    title: "Intro".to_string(),
                    id: "intro".to_string(),
                    level: 1
                },
                TocEntry {
                    title: "Details".to_string(),
                    id: "details".to_string(),
                    level: 2
                },
                TocEntry {
                    title: "Deep code dive".to_string(),
                    id: "deep-code-dive".to_string(),
                    level: 3
                },
            ]
        );
    }

    #[test]
    fn parses_without_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter.";

        let doc = parse_markdown(source).unwrap();

        assert!(doc.frontmatter.is_none());
        assert_eq!(doc.toc.len(), 1);
        assert_eq!(doc.toc[0].title, "Just Markdown");
    }

    #[test]
    fn deduplicates_heading_ids() {
        let source = "# Usage\n\n## Usage\n\n## Usage\n";

        let doc = parse_markdown(source).unwrap();

        let ids: Vec<_> = doc.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["usage", "usage-1", "usage-2"]);
    }

    #[test]
    fn keeps_explicit_heading_ids() {
        let source = "# Intro {#start}\n\n## Start\n";

        let doc = parse_markdown(source).unwrap();

        assert_eq!(doc.toc[0].id, "start");
        assert_eq!(doc.toc[0].title, "Intro");
        assert_eq!(doc.toc[1].id, "start-1");
    }

    #[test]
    fn shared_ids_stay_unique_across_documents() {
        let mut ids = HeadingIds::default();

        let first = parse_markdown_with_ids("# Intro\n", &mut ids).unwrap();
        let second = parse_markdown_with_ids("# Intro\n\n## Setup\n", &mut ids).unwrap();

        assert_eq!(first.toc[0].id, "intro");
        assert_eq!(second.toc[0].id, "intro-1");
        assert_eq!(second.toc[1].id, "setup");
    }

    #[test]
    fn symbol_only_heading_gets_fallback_id() {
        let doc = parse_markdown("# ???\n").unwrap();

        assert_eq!(doc.toc[0].id, "heading");
    }

    #[test]
    fn slugify_works() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("API Reference"), "api-reference");
        assert_eq!(slugify("Button (Primary)"), "button-primary");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
    }
}
