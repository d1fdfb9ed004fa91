//! In-memory page used for prerendering and tests.

use std::collections::HashMap;

use crate::controller::CONTAINER_ID;
use crate::host::{Element, StyleProperty, TocHost};
use crate::outline::{Heading, HeadingLevel, Outline};

/// Width reported for an expanded container with no explicit layout.
const DEFAULT_CONTAINER_WIDTH: f64 = 200.0;

/// A page held in memory.
///
/// Headings carry absolute positions; [`scroll_to`](MemoryPage::scroll_to)
/// moves the viewport so reported tops shift accordingly.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    container: bool,
    headings: Vec<(Heading, f64)>,
    scroll_offset: f64,
    expanded_width: f64,
    collapsed: bool,
    styles: HashMap<(Element, StyleProperty), String>,
    mounted: Option<Outline>,
    button: bool,
    active: Vec<bool>,
    revealed: Option<String>,
    recomputations: usize,
}

impl MemoryPage {
    /// A page without a TOC container.
    pub fn new() -> Self {
        Self {
            expanded_width: DEFAULT_CONTAINER_WIDTH,
            ..Default::default()
        }
    }

    /// A page with a `#markdown-toc` container.
    pub fn with_container() -> Self {
        Self {
            container: true,
            ..Self::new()
        }
    }

    /// Append a heading at an absolute vertical position.
    pub fn heading(mut self, level: HeadingLevel, id: &str, text: &str, position: f64) -> Self {
        self.headings.push((Heading::new(level, id, text), position));
        self
    }

    /// Lay out headings top to bottom with a fixed gap.
    ///
    /// Used when the real layout is unknown, e.g. when prerendering.
    pub fn from_headings(headings: Vec<Heading>, gap: f64, container: bool) -> Self {
        let mut page = if container {
            Self::with_container()
        } else {
            Self::new()
        };
        page.headings = headings
            .into_iter()
            .enumerate()
            .map(|(i, h)| (h, gap * (i as f64 + 1.0)))
            .collect();
        page
    }

    /// Move the viewport to an absolute scroll offset.
    pub fn scroll_to(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    /// Outline mounted into the container.
    pub fn mounted(&self) -> Option<&Outline> {
        self.mounted.as_ref()
    }

    /// Whether the toggle button was appended.
    pub fn has_button(&self) -> bool {
        self.button
    }

    /// Target of the first entry carrying the active marker.
    pub fn active_target(&self) -> Option<&str> {
        let outline = self.mounted.as_ref()?;
        outline
            .entries()
            .iter()
            .zip(&self.active)
            .find(|(_, active)| **active)
            .map(|(entry, _)| entry.target.as_str())
    }

    /// Whether the entry at `index` carries the active marker.
    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Number of entries carrying the active marker.
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|active| **active).count()
    }

    /// Target most recently scrolled into view.
    pub fn revealed(&self) -> Option<&str> {
        self.revealed.as_deref()
    }

    /// How many times an entry has been marked active.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Inline style value set on an element.
    pub fn style(&self, element: Element, property: StyleProperty) -> Option<&str> {
        self.styles.get(&(element, property)).map(String::as_str)
    }

    /// Inline style attribute for an element, e.g. `direction: rtl`.
    pub fn style_attr(&self, element: Element) -> String {
        let mut props: Vec<_> = self
            .styles
            .iter()
            .filter(|((el, _), _)| *el == element)
            .map(|((_, prop), value)| format!("{}: {}", prop.css_name(), value))
            .collect();
        props.sort();
        props.join("; ")
    }
}

impl TocHost for MemoryPage {
    fn has_element(&self, id: &str) -> bool {
        self.container && id == CONTAINER_ID
    }

    fn headings(&self) -> Vec<Heading> {
        self.headings.iter().map(|(h, _)| h.clone()).collect()
    }

    fn heading_top(&self, id: &str) -> f64 {
        self.headings
            .iter()
            .find(|(h, _)| h.id == id)
            .map(|(_, position)| position - self.scroll_offset)
            .unwrap_or(0.0)
    }

    fn mount(&mut self, outline: &Outline) {
        self.mounted = Some(outline.clone());
        self.active = vec![false; outline.len()];
        self.button = true;
    }

    fn set_style(&mut self, element: Element, property: StyleProperty, value: &str) {
        if element == Element::Container && property == StyleProperty::Width {
            self.collapsed = value.trim() == "0";
        }
        self.styles
            .insert((element, property), value.to_string());
    }

    fn container_width(&self) -> f64 {
        if self.collapsed {
            0.0
        } else {
            self.expanded_width
        }
    }

    fn clear_active(&mut self) {
        self.active.fill(false);
    }

    fn mark_active(&mut self, target: &str) {
        if let Some(outline) = &self.mounted {
            for (entry, active) in outline.entries().iter().zip(self.active.iter_mut()) {
                if entry.target == target {
                    *active = true;
                }
            }
        }
        self.recomputations += 1;
    }

    fn reveal(&mut self, target: &str) {
        self.revealed = Some(target.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_tops_relative_to_viewport() {
        let mut page = MemoryPage::new().heading(HeadingLevel::H2, "x", "X", 300.0);

        assert_eq!(page.heading_top("x"), 300.0);
        page.scroll_to(350.0);
        assert_eq!(page.heading_top("x"), -50.0);
    }

    #[test]
    fn lays_out_headings_with_gap() {
        let headings = vec![
            Heading::new(HeadingLevel::H1, "a", "A"),
            Heading::new(HeadingLevel::H2, "b", "B"),
        ];

        let page = MemoryPage::from_headings(headings, 100.0, true);

        assert!(page.has_element(CONTAINER_ID));
        assert_eq!(page.heading_top("a"), 100.0);
        assert_eq!(page.heading_top("b"), 200.0);
    }

    fn mounted_page() -> MemoryPage {
        let mut page = MemoryPage::with_container()
            .heading(HeadingLevel::H1, "a", "A", 0.0)
            .heading(HeadingLevel::H2, "b", "B", 100.0);
        let outline = Outline::from_headings(&page.headings());
        page.mount(&outline);
        page
    }

    #[test]
    fn counts_every_marked_entry() {
        let mut page = mounted_page();

        page.mark_active("a");
        page.mark_active("b");

        assert_eq!(page.active_count(), 2);
        assert!(page.is_active(0) && page.is_active(1));
        assert_eq!(page.active_target(), Some("a"));
    }

    #[test]
    fn clear_resets_markers() {
        let mut page = mounted_page();
        page.mark_active("a");

        page.clear_active();
        page.mark_active("b");

        assert_eq!(page.active_count(), 1);
        assert_eq!(page.active_target(), Some("b"));
    }

    #[test]
    fn builds_style_attribute() {
        let mut page = MemoryPage::with_container();
        page.set_style(Element::Container, StyleProperty::Direction, "rtl");
        page.set_style(Element::Container, StyleProperty::Width, "0");
        page.set_style(Element::Button, StyleProperty::Transform, "rotate(0)");

        assert_eq!(page.style_attr(Element::Container), "direction: rtl; width: 0");
        assert_eq!(page.container_width(), 0.0);
    }
}
