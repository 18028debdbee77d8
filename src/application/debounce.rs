// Coalesces rapid successive values into at most one emission per window
use tokio::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    last_emitted_at: Option<Instant>,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_emitted_at: None,
            pending: None,
        }
    }

    /// Offers a new value. Returns it right away if the window since the last
    /// emission has closed; otherwise keeps it (replacing any older pending
    /// value) until `flush`.
    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        if self.window_open(now) {
            self.pending = Some(value);
            return None;
        }
        self.pending = None;
        self.last_emitted_at = Some(now);
        Some(value)
    }

    /// Emits the pending value once its window has closed.
    pub fn flush(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_none() || self.window_open(now) {
            return None;
        }
        self.last_emitted_at = Some(now);
        self.pending.take()
    }

    /// When the pending value becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        Some(self.last_emitted_at.map_or_else(Instant::now, |at| at + self.window))
    }

    #[cfg(test)]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn window_open(&self, now: Instant) -> bool {
        self.last_emitted_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_passes_through() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        assert_eq!(debouncer.offer(1, Instant::now()), Some(1));
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn test_burst_is_coalesced_to_latest() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));

        assert_eq!(debouncer.offer(1, start), Some(1));
        assert_eq!(debouncer.offer(2, start + Duration::from_millis(10)), None);
        assert_eq!(debouncer.offer(3, start + Duration::from_millis(40)), None);
        assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(100)));

        assert_eq!(debouncer.flush(start + Duration::from_millis(99)), None);
        assert_eq!(debouncer.flush(start + Duration::from_millis(100)), Some(3));
        assert_eq!(debouncer.flush(start + Duration::from_millis(500)), None);
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_values_after_window_emit_immediately() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));

        assert_eq!(debouncer.offer("a", start), Some("a"));
        assert_eq!(debouncer.offer("b", start + Duration::from_millis(3000)), Some("b"));
        assert_eq!(debouncer.offer("c", start + Duration::from_millis(3050)), None);
        assert!(debouncer.has_pending());
    }
}
