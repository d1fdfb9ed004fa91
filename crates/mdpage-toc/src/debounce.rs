//! Cancel-and-reschedule timer for scroll handling.

use std::time::Duration;

use tokio::time::Instant;

/// Delay between the last scroll event and the recomputation it schedules.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(50);

/// Debounce timer.
///
/// Each [`schedule`](Debouncer::schedule) replaces the pending deadline, so a
/// burst of events fires once, `delay` after the last one.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Cancel any pending deadline and schedule a new one from `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Pending deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the deadline if it has passed. Returns true exactly once per
    /// scheduled burst.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        debouncer.schedule(start);

        assert!(!debouncer.fire(start + Duration::from_millis(49)));
        assert!(debouncer.fire(start + Duration::from_millis(50)));
        assert!(!debouncer.fire(start + Duration::from_millis(500)));
    }

    #[test]
    fn reschedule_pushes_deadline_back() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(40));

        assert!(!debouncer.fire(start + Duration::from_millis(60)));
        assert!(debouncer.fire(start + Duration::from_millis(90)));
    }
}
