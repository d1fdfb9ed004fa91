//! Outline controller: builds the outline, toggles it, tracks the active entry.

use tokio::time::Instant;

use crate::config::TocConfig;
use crate::debounce::Debouncer;
use crate::host::{Element, StyleProperty, TocHost};
use crate::outline::{Heading, Outline};

/// Id of the element the outline is mounted into.
pub const CONTAINER_ID: &str = "markdown-toc";

/// Owns the outline state for one page.
pub struct TocController<H: TocHost> {
    host: H,
    config: TocConfig,
    headings: Vec<Heading>,
    outline: Outline,
    debouncer: Debouncer,
    active: Option<usize>,
    mounted: bool,
}

impl<H: TocHost> TocController<H> {
    /// Create a controller for `host`. Nothing is rendered until
    /// [`initialize`](Self::initialize).
    pub fn new(host: H, config: TocConfig) -> Self {
        Self {
            host,
            config,
            headings: Vec::new(),
            outline: Outline::default(),
            debouncer: Debouncer::default(),
            active: None,
            mounted: false,
        }
    }

    /// Build and mount the outline.
    ///
    /// Returns false without touching the page when the container is absent.
    pub fn initialize(&mut self) -> bool {
        if self.mounted {
            return true;
        }
        if !self.host.has_element(CONTAINER_ID) {
            tracing::debug!("No #{} element, skipping outline", CONTAINER_ID);
            return false;
        }

        self.headings = self.host.headings();
        self.outline = Outline::from_headings(&self.headings);
        self.host.mount(&self.outline);

        // Scrollbar on the leading edge, text in natural order
        self.host
            .set_style(Element::Container, StyleProperty::Direction, "rtl");
        self.host
            .set_style(Element::Wrapper, StyleProperty::Direction, "ltr");

        self.mounted = true;
        tracing::debug!("Mounted outline with {} entries", self.outline.len());

        self.recompute_active();
        true
    }

    /// Flip the container between expanded and collapsed.
    pub fn toggle(&mut self) {
        if !self.mounted {
            return;
        }

        if self.host.container_width() > 0.0 {
            let color = self.config.button.color.active.clone();
            self.host
                .set_style(Element::Button, StyleProperty::Background, &color);
            self.host
                .set_style(Element::Button, StyleProperty::Transform, "rotate(-45deg)");
            self.host
                .set_style(Element::Container, StyleProperty::Width, "0");
            self.host
                .set_style(Element::Container, StyleProperty::MinWidth, "0");
        } else {
            let color = self.config.button.color.bg.clone();
            let width = self.config.toc.width.clone();
            let min_width = self.config.toc.minwidth.clone();
            self.host
                .set_style(Element::Button, StyleProperty::Background, &color);
            self.host
                .set_style(Element::Button, StyleProperty::Transform, "rotate(0)");
            self.host
                .set_style(Element::Container, StyleProperty::Width, &width);
            self.host
                .set_style(Element::Container, StyleProperty::MinWidth, &min_width);
        }
    }

    /// Pick the heading nearest the viewport top and mark its entry active.
    ///
    /// Scans in document order and stops at the first heading below the
    /// viewport top, taking it only if it is closer than the last heading
    /// above. With no qualifying heading the first one stays active.
    pub fn recompute_active(&mut self) -> Option<usize> {
        if !self.mounted || self.headings.is_empty() {
            return None;
        }

        let mut active = 0;
        for (i, heading) in self.headings.iter().enumerate() {
            let top = self.host.heading_top(&heading.id);
            if top > 0.0 {
                let best = self.host.heading_top(&self.headings[active].id);
                if top < best.abs() {
                    active = i;
                }
                break;
            }
            active = i;
        }

        self.host.clear_active();
        if let Some(entry) = self.outline.get(active) {
            self.host.mark_active(&entry.target);
        }
        self.active = Some(active);
        Some(active)
    }

    /// Handle a scroll event: (re)schedule the debounced recomputation.
    pub fn on_scroll(&mut self, now: Instant) {
        if self.mounted {
            self.debouncer.schedule(now);
        }
    }

    /// Run the pending recomputation if its deadline has passed.
    ///
    /// Returns true when a recomputation ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.debouncer.fire(now) {
            return false;
        }
        self.recompute_active();
        true
    }

    fn reveal_active(&mut self) {
        if let Some(entry) = self.active.and_then(|i| self.outline.get(i)) {
            let target = entry.target.clone();
            self.host.reveal(&target);
        }
    }

    /// Deadline of the pending recomputation.
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Index of the active entry.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::memory::MemoryPage;
    use crate::outline::HeadingLevel;
    use pretty_assertions::assert_eq;

    fn sample_page() -> MemoryPage {
        MemoryPage::with_container()
            .heading(HeadingLevel::H1, "a", "Intro", 20.0)
            .heading(HeadingLevel::H2, "b", "Details", 800.0)
            .heading(HeadingLevel::H2, "c", "More", 1600.0)
    }

    #[test]
    fn initializes_outline_in_document_order() {
        let mut toc = TocController::new(sample_page(), TocConfig::default());

        assert!(toc.initialize());

        let page = toc.host();
        let mounted = page.mounted().unwrap();
        let labels: Vec<_> = mounted
            .entries()
            .iter()
            .map(|e| (e.label.as_str(), e.href()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("Intro", "#a".to_string()),
                ("Details", "#b".to_string()),
                ("More", "#c".to_string()),
            ]
        );
        assert_eq!(page.active_target(), Some("a"));
        assert_eq!(page.active_count(), 1);
        assert_eq!(page.revealed(), None);
        assert_eq!(page.style(Element::Container, StyleProperty::Direction), Some("rtl"));
        assert_eq!(page.style(Element::Wrapper, StyleProperty::Direction), Some("ltr"));
    }

    #[test]
    fn missing_container_is_a_no_op() {
        let page = MemoryPage::new().heading(HeadingLevel::H1, "a", "Intro", 0.0);
        let mut toc = TocController::new(page, TocConfig::default());

        assert!(!toc.initialize());
        toc.toggle();
        toc.on_scroll(Instant::now());

        let page = toc.into_host();
        assert!(page.mounted().is_none());
        assert!(!page.has_button());
        assert_eq!(page.active_target(), None);
        assert_eq!(page.recomputations(), 0);
    }

    #[test]
    fn empty_page_still_mounts() {
        let mut toc = TocController::new(MemoryPage::with_container(), TocConfig::default());

        assert!(toc.initialize());

        let page = toc.host();
        assert!(page.mounted().unwrap().is_empty());
        assert!(page.has_button());
        assert_eq!(page.active_target(), None);
        assert_eq!(toc.active(), None);
    }

    #[test]
    fn tracks_heading_above_viewport() {
        let mut toc = TocController::new(sample_page(), TocConfig::default());
        toc.initialize();

        toc.host_mut().scroll_to(900.0);
        assert_eq!(toc.recompute_active(), Some(1));
        assert_eq!(toc.host().active_target(), Some("b"));

        toc.host_mut().scroll_to(5000.0);
        assert_eq!(toc.recompute_active(), Some(2));
        assert_eq!(toc.host().active_target(), Some("c"));
    }

    #[test]
    fn prefers_next_heading_when_closer() {
        let mut toc = TocController::new(sample_page(), TocConfig::default());
        toc.initialize();

        // "a" is 730px above, "b" 50px below: "b" wins
        toc.host_mut().scroll_to(750.0);
        assert_eq!(toc.recompute_active(), Some(1));

        // "a" is 400px above, "b" 380px below: still "b"
        toc.host_mut().scroll_to(420.0);
        assert_eq!(toc.recompute_active(), Some(1));

        // "a" is 100px above, "b" 680px below: "a"
        toc.host_mut().scroll_to(120.0);
        assert_eq!(toc.recompute_active(), Some(0));
    }

    #[test]
    fn first_heading_is_default() {
        let mut toc = TocController::new(sample_page(), TocConfig::default());
        toc.initialize();

        toc.host_mut().scroll_to(0.0);
        assert_eq!(toc.recompute_active(), Some(0));
        assert_eq!(toc.host().active_count(), 1);
    }

    #[test]
    fn exactly_one_entry_is_active() {
        let mut toc = TocController::new(sample_page(), TocConfig::default());
        toc.initialize();

        for offset in [0.0, 100.0, 700.0, 900.0, 1700.0, 10_000.0] {
            toc.host_mut().scroll_to(offset);
            toc.recompute_active();
            assert_eq!(toc.host().active_count(), 1, "offset {}", offset);
        }
    }

    #[test]
    fn toggle_twice_restores_state() {
        let config = TocConfig::default();
        let mut toc = TocController::new(sample_page(), config.clone());
        toc.initialize();

        assert!(toc.host().container_width() > 0.0);

        toc.toggle();
        assert_eq!(toc.host().container_width(), 0.0);
        assert_eq!(
            toc.host().style(Element::Button, StyleProperty::Background),
            Some(config.button.color.active.as_str())
        );
        assert_eq!(
            toc.host().style(Element::Button, StyleProperty::Transform),
            Some("rotate(-45deg)")
        );

        toc.toggle();
        assert!(toc.host().container_width() > 0.0);
        assert_eq!(
            toc.host().style(Element::Container, StyleProperty::Width),
            Some(config.toc.width.as_str())
        );
        assert_eq!(
            toc.host().style(Element::Container, StyleProperty::MinWidth),
            Some(config.toc.minwidth.as_str())
        );
        assert_eq!(
            toc.host().style(Element::Button, StyleProperty::Transform),
            Some("rotate(0)")
        );
    }

    #[test]
    fn scroll_burst_recomputes_once() {
        let mut toc = TocController::new(sample_page(), TocConfig::default());
        toc.initialize();
        let baseline = toc.host().recomputations();

        let start = Instant::now();
        for i in 0..100u64 {
            let now = start + Duration::from_micros(i * 100);
            toc.on_scroll(now);
            assert!(!toc.tick(now));
        }

        let settled = start + Duration::from_millis(10) + crate::DEBOUNCE_DELAY;
        assert!(toc.tick(settled));
        assert!(!toc.tick(settled + Duration::from_secs(1)));
        assert_eq!(toc.host().recomputations(), baseline + 1);
    }

    #[test]
    fn recompute_reveals_active_entry() {
        let mut toc = TocController::new(sample_page(), TocConfig::default());
        toc.initialize();

        toc.host_mut().scroll_to(2000.0);
        let now = Instant::now();
        toc.on_scroll(now);
        assert!(toc.tick(now + crate::DEBOUNCE_DELAY));

        assert_eq!(toc.host().revealed(), Some("c"));
    }
}
