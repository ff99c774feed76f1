//! Trailing-edge debounce driven by an explicit clock.
//!
//! The owner feeds `now` into [`Debouncer::schedule`] and [`Debouncer::poll`];
//! nothing runs in the background, so cancelling on teardown is just dropping
//! the pending payload.

use std::time::{Duration, Instant};

/// Default persistence write delay.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Holds at most one pending payload and releases it once `delay` has
/// elapsed since the last [`schedule`](Debouncer::schedule).
#[derive(Debug, Clone)]
pub struct Debouncer<P> {
    delay: Duration,
    pending: Option<(Instant, P)>,
}

impl<P> Debouncer<P> {
    /// Debouncer with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending payload and restart the timer.
    pub fn schedule(&mut self, now: Instant, payload: P) {
        self.pending = Some((now + self.delay, payload));
    }

    /// Release the payload if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<P> {
        let due = matches!(&self.pending, Some((deadline, _)) if *deadline <= now);
        if due {
            self.flush()
        } else {
            None
        }
    }

    /// Release the payload immediately.
    pub fn flush(&mut self) -> Option<P> {
        self.pending.take().map(|(_, p)| p)
    }

    /// Drop the pending payload. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Whether a payload is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<P> Default for Debouncer<P> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
