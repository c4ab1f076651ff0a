//! Time abstraction for testability.
//!
//! The limiter and retry tests need to control time progression without
//! actual delays. Production code uses [`SystemClock`]; tests use
//! [`MockClock`] and advance it explicitly.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Trait for time operations to enable deterministic testing.
pub trait Clock: Send + Sync + 'static {
    /// Get the current instant (monotonic time).
    fn now(&self) -> Instant;
}

/// Real system clock implementation for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Mock clock for deterministic testing.
///
/// Allows tests to control time progression without actual delays. Clones
/// share the same underlying elapsed counter.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a new mock clock starting at the current instant.
    pub fn new() -> Self {
        Self { start: Instant::now(), elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Advance the mock clock by a duration.
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }

    /// Advance the mock clock by milliseconds (convenience method).
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Get the current elapsed time.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or(Duration::ZERO)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        let elapsed = self.elapsed.lock().map(|e| *e).unwrap_or(Duration::ZERO);
        self.start + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_advances_without_waiting() {
        let clock = MockClock::new();
        let before = clock.now();

        clock.advance_millis(1_500);

        assert_eq!(clock.now().duration_since(before), Duration::from_millis(1_500));
    }

    #[test]
    fn mock_clock_clones_share_time() {
        let clock = MockClock::new();
        let other = clock.clone();

        clock.advance(Duration::from_secs(3));

        assert_eq!(other.elapsed(), Duration::from_secs(3));
    }
}
