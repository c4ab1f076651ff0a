//! Test doubles shared across the workspace.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::resilience::Sleeper;

/// A [`Sleeper`] that records requested delays instead of waiting them out.
///
/// Lets tests assert exact backoff sequences deterministically.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order.
    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Convenience constructor returning the `Arc` most call sites want.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut slept) = self.slept.lock() {
            slept.push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_delays_in_order() {
        let sleeper = RecordingSleeper::new();

        sleeper.sleep(Duration::from_millis(100)).await;
        sleeper.sleep(Duration::from_millis(200)).await;

        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }
}
