//! Page builder for mdpage.
//!
//! Renders Markdown files into self-contained HTML pages with inline assets
//! and an optional prerendered table of contents.

pub mod assets;
pub mod builder;
pub mod inputs;
pub mod templates;

pub use builder::{BuildError, BuildResult, OutputTarget, PageBuilder, PageOptions};
pub use inputs::expand_inputs;
