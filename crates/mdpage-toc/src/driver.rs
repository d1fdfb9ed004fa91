//! Event loop driving a controller from page events.

use std::future;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::controller::TocController;
use crate::host::TocHost;

/// Events delivered by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    Scroll,
    ToggleClick,
}

/// Initialize the controller and process events until the channel closes.
///
/// Scroll events are debounced; the recomputation runs once the debounce
/// deadline passes with no further scrolling. Returns the controller when
/// the page goes away.
pub async fn run<H: TocHost>(
    mut controller: TocController<H>,
    mut events: mpsc::Receiver<PageEvent>,
) -> TocController<H> {
    if !controller.initialize() {
        return controller;
    }

    loop {
        let deadline = controller.deadline();
        let timer = async move {
            match deadline {
                Some(deadline) => time::sleep_until(deadline).await,
                None => future::pending::<()>().await,
            }
        };

        tokio::select! {
            event = events.recv() => match event {
                Some(PageEvent::Scroll) => controller.on_scroll(Instant::now()),
                Some(PageEvent::ToggleClick) => controller.toggle(),
                None => break,
            },
            _ = timer => {
                controller.tick(Instant::now());
            }
        }
    }

    controller
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::TocConfig;
    use crate::memory::MemoryPage;
    use crate::outline::HeadingLevel;

    fn page() -> MemoryPage {
        MemoryPage::with_container()
            .heading(HeadingLevel::H1, "a", "Intro", 20.0)
            .heading(HeadingLevel::H2, "b", "Details", 800.0)
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_scrolls_settle_into_one_recomputation() {
        let (tx, rx) = mpsc::channel(256);
        let controller = TocController::new(page(), TocConfig::default());
        let handle = tokio::spawn(run(controller, rx));

        for _ in 0..100 {
            tx.send(PageEvent::Scroll).await.unwrap();
            time::sleep(Duration::from_micros(100)).await;
        }
        time::sleep(Duration::from_millis(200)).await;
        drop(tx);

        let controller = handle.await.unwrap();
        // One at initialization, one after the burst settles
        assert_eq!(controller.host().recomputations(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_recompute_separately() {
        let (tx, rx) = mpsc::channel(16);
        let controller = TocController::new(page(), TocConfig::default());
        let handle = tokio::spawn(run(controller, rx));

        tx.send(PageEvent::Scroll).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        tx.send(PageEvent::Scroll).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        drop(tx);

        let controller = handle.await.unwrap();
        assert_eq!(controller.host().recomputations(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_clicks_are_applied() {
        let (tx, rx) = mpsc::channel(4);
        let controller = TocController::new(page(), TocConfig::default());
        let handle = tokio::spawn(run(controller, rx));

        tx.send(PageEvent::ToggleClick).await.unwrap();
        drop(tx);

        let controller = handle.await.unwrap();
        assert_eq!(controller.host().container_width(), 0.0);
    }

    #[tokio::test]
    async fn returns_immediately_without_container() {
        let (_tx, rx) = mpsc::channel(1);
        let controller = TocController::new(MemoryPage::new(), TocConfig::default());

        let controller = run(controller, rx).await;

        assert!(!controller.is_mounted());
    }
}
