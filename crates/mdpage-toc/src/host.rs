//! The page the outline is rendered into.

use crate::outline::{Heading, Outline};

/// Elements the controller styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// The `#markdown-toc` container
    Container,
    /// Scroll wrapper holding the outline list
    Wrapper,
    /// Toggle button appended to the page body
    Button,
}

/// Inline style properties touched by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Direction,
    Width,
    MinWidth,
    Background,
    Transform,
}

impl StyleProperty {
    /// CSS property name.
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Direction => "direction",
            Self::Width => "width",
            Self::MinWidth => "min-width",
            Self::Background => "background",
            Self::Transform => "transform",
        }
    }
}

/// A page that can host the outline.
///
/// The controller is the only writer of the elements it mounts; reads of
/// heading positions reflect the page's current scroll state.
pub trait TocHost {
    /// Whether an element with this id exists.
    fn has_element(&self, id: &str) -> bool;

    /// Headings of levels 1-4 in document order.
    fn headings(&self) -> Vec<Heading>;

    /// Top of the heading relative to the viewport, in pixels.
    fn heading_top(&self, id: &str) -> f64;

    /// Create the scroll wrapper and list inside the container and append
    /// the toggle button to the page.
    fn mount(&mut self, outline: &Outline);

    /// Set an inline style property.
    fn set_style(&mut self, element: Element, property: StyleProperty, value: &str);

    /// Rendered width of the container.
    fn container_width(&self) -> f64;

    /// Remove the active marker from every outline entry.
    fn clear_active(&mut self);

    /// Mark the entry pointing at `target` as active.
    fn mark_active(&mut self, target: &str);

    /// Scroll the outline so the entry for `target` is visible, if clipped.
    fn reveal(&mut self, target: &str);
}
