//! Headings and the outline built from them.

use serde::Serialize;

/// Heading level tracked by the outline (h1 through h4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    /// Map a numeric level to an outline level.
    ///
    /// Levels 5 and 6 are not part of the outline and return `None`.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::H1),
            2 => Some(Self::H2),
            3 => Some(Self::H3),
            4 => Some(Self::H4),
            _ => None,
        }
    }

    /// Numeric level (1-4).
    pub fn as_u8(self) -> u8 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
            Self::H4 => 4,
        }
    }

    /// Lowercase tag name, e.g. `h2`.
    pub fn tag_name(self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
        }
    }
}

/// A heading present in the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// Heading level
    pub level: HeadingLevel,
    /// Element id, unique within the page
    pub id: String,
    /// Text content
    pub text: String,
}

impl Heading {
    pub fn new(level: HeadingLevel, id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
            text: text.into(),
        }
    }
}

/// One navigable link in the outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineEntry {
    /// Id of the heading this entry points at
    pub target: String,
    /// Link text, copied from the heading
    pub label: String,
    /// Level of the heading
    pub level: HeadingLevel,
}

impl OutlineEntry {
    /// Link href, `#<target>`.
    pub fn href(&self) -> String {
        format!("#{}", self.target)
    }

    /// List item class, e.g. `toc-h2`.
    pub fn class_name(&self) -> String {
        format!("toc-{}", self.level.tag_name())
    }
}

impl From<&Heading> for OutlineEntry {
    fn from(heading: &Heading) -> Self {
        Self {
            target: heading.id.clone(),
            label: heading.text.clone(),
            level: heading.level,
        }
    }
}

/// Outline entries in heading document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outline {
    entries: Vec<OutlineEntry>,
}

impl Outline {
    /// Build one entry per heading, preserving order.
    pub fn from_headings(headings: &[Heading]) -> Self {
        Self {
            entries: headings.iter().map(OutlineEntry::from).collect(),
        }
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OutlineEntry> {
        self.entries.get(index)
    }
}
