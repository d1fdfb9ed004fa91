//! Markdown parser and HTML renderer.
//!
//! This crate parses Markdown files with optional YAML frontmatter, assigns
//! stable ids to headings, and renders HTML with the page extensions:
//! image options, task list classes, math blocks and table spans.

pub mod frontmatter;
pub mod parser;
pub mod postprocess;
pub mod render;
pub mod table;

pub use frontmatter::Frontmatter;
pub use parser::{parse_markdown, parse_markdown_with_ids, HeadingIds, ParseError, ParsedDoc, TocEntry};
pub use postprocess::{embed_images, encode_file_base64};
pub use render::{render_html, RenderOptions};
