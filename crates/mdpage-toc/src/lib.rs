//! Table-of-contents outline for rendered Markdown pages.
//!
//! Builds a navigable outline from a page's headings and keeps one entry
//! marked active as the reader scrolls. The page itself is abstracted behind
//! [`TocHost`], so the same controller drives the in-memory page used for
//! prerendering and any other host that can report heading positions.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod driver;
pub mod host;
pub mod memory;
pub mod outline;

pub use config::TocConfig;
pub use controller::{TocController, CONTAINER_ID};
pub use debounce::{Debouncer, DEBOUNCE_DELAY};
pub use driver::{run, PageEvent};
pub use host::{Element, StyleProperty, TocHost};
pub use memory::MemoryPage;
pub use outline::{Heading, HeadingLevel, Outline, OutlineEntry};
