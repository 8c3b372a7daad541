use std::time::{Duration, Instant};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// A cancellable one-shot timer carrying the value to deliver when it fires.
///
/// Scheduling again replaces both the value and the deadline, so a burst of
/// input collapses into a single delivery `delay` after the last event. The
/// owner decides how to wait for [`Debouncer::deadline`] and calls
/// [`Debouncer::poll`] when it wakes.
#[derive(Debug)]
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

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    /// Drops the pending value, if any.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => self.cancel(),
            _ => None,
        }
    }

    /// Delivers the pending value immediately, ignoring the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fires_only_after_the_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.schedule("r", start);

        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(start + SEARCH_DEBOUNCE), Some("r"));
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn rescheduling_coalesces_a_burst() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.schedule("r", start);
        debouncer.schedule("ra", start + Duration::from_millis(100));
        debouncer.schedule("rai", start + Duration::from_millis(250));

        assert_eq!(debouncer.poll(start + Duration::from_millis(400)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(550))
        );
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(550)),
            Some("rai")
        );
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn cancel_and_flush() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.schedule(1, start);
        assert_eq!(debouncer.cancel(), Some(1));
        assert_eq!(debouncer.poll(start + SEARCH_DEBOUNCE), None);

        debouncer.schedule(2, start);
        assert_eq!(debouncer.flush(), Some(2));
        assert_eq!(debouncer.deadline(), None);
    }
}
