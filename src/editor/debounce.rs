//! Single-slot debounce gate
//!
//! Scheduling a value replaces whatever was pending and restarts the delay;
//! only the last value scheduled within the quiet window is ever released.
//! Time is passed in by the caller so the gate can be driven from the UI poll
//! loop and tested without sleeping.

use std::time::{Duration, Instant};

/// Quiet period after the last edit before re-evaluation
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
        }
    }

    /// Replace the pending value, due `delay` after `now`
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    /// Take the pending value once it is due
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref().is_some_and(|(due, _)| now >= *due) {
            return self.flush();
        }
        None
    }

    /// Take the pending value immediately, due or not
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Remaining wait, zero once due; `None` when nothing is pending
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(due, _)| due.saturating_duration_since(now))
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_releases_after_delay() {
        let start = Instant::now();
        let mut gate = Debouncer::default();
        gate.schedule("a", start);

        assert_eq!(gate.poll(start + Duration::from_millis(249)), None);
        assert_eq!(gate.poll(start + DEBOUNCE_DELAY), Some("a"));
        assert_eq!(gate.poll(start + Duration::from_secs(1)), None);
        assert!(!gate.is_pending());
    }

    #[test]
    fn test_last_write_wins() {
        let start = Instant::now();
        let mut gate = Debouncer::default();
        let mut released = Vec::new();

        for (i, edit) in ["<", "<1", "<1>"].iter().enumerate() {
            let now = start + Duration::from_millis(100 * i as u64);
            gate.schedule(*edit, now);
            released.extend(gate.poll(now));
        }
        // 249ms after the final edit
        released.extend(gate.poll(start + Duration::from_millis(449)));
        assert!(released.is_empty());

        released.extend(gate.poll(start + Duration::from_millis(450)));
        assert_eq!(released, vec!["<1>"]);
    }

    #[test]
    fn test_cancel_and_flush() {
        let start = Instant::now();
        let mut gate = Debouncer::new(Duration::from_millis(10));

        gate.schedule(1, start);
        assert_eq!(gate.time_until_due(start), Some(Duration::from_millis(10)));
        gate.cancel();
        assert_eq!(gate.time_until_due(start), None);

        gate.schedule(2, start);
        assert_eq!(gate.flush(), Some(2));
        assert_eq!(gate.flush(), None);
    }
}
