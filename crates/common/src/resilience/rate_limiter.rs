//! Sliding-window rate limiting for outbound requests.
//!
//! The limiter tracks a request count inside a rolling time window. It is a
//! *resetting fixed window*, not a continuously sliding log: once the
//! elapsed time since the window start reaches the configured width, the
//! count resets to zero and the window restarts at "now". A burst straddling
//! a window boundary can therefore admit up to twice the configured limit;
//! this is a known characteristic of the algorithm, traded for O(1) state.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};

/// Configuration for the sliding-window limiter.
#[derive(Debug, Clone)]
pub struct SlidingWindowConfig {
    /// Maximum number of requests admitted per window.
    pub limit: u32,
    /// Width of the window.
    pub window: Duration,
}

impl Default for SlidingWindowConfig {
    fn default() -> Self {
        Self { limit: 60, window: Duration::from_secs(60) }
    }
}

impl SlidingWindowConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SlidingWindowConfigBuilder {
        SlidingWindowConfigBuilder::new()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.limit == 0 {
            return Err("limit must be greater than 0".to_string());
        }
        if self.window.is_zero() {
            return Err("window must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Builder for [`SlidingWindowConfig`].
#[derive(Debug)]
pub struct SlidingWindowConfigBuilder {
    config: SlidingWindowConfig,
}

impl Default for SlidingWindowConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SlidingWindowConfigBuilder {
    pub fn new() -> Self {
        Self { config: SlidingWindowConfig::default() }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.config.limit = limit;
        self
    }

    pub fn window(mut self, window: Duration) -> Self {
        self.config.window = window;
        self
    }

    pub fn build(self) -> Result<SlidingWindowConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[derive(Debug)]
struct WindowState {
    count: u32,
    window_start: Instant,
}

/// Sliding-window rate limiter.
///
/// All accessors roll an expired window over before reading, so callers
/// always observe the current window. The count/window pair lives behind a
/// mutex: the rollover is a check-then-act sequence, and the lock is what
/// keeps it sound when the limiter is shared across tasks.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use rentora_common::resilience::SlidingWindowLimiter;
///
/// # fn example() -> Result<(), String> {
/// let limiter = SlidingWindowLimiter::new(60, Duration::from_secs(60))?;
///
/// if limiter.check() {
///     limiter.record();
///     // issue the request
/// } else {
///     println!("throttled, retry in {:?}", limiter.reset_in());
/// }
/// # Ok(())
/// # }
/// ```
pub struct SlidingWindowLimiter<C: Clock = SystemClock> {
    config: SlidingWindowConfig,
    state: Arc<Mutex<WindowState>>,
    clock: Arc<C>,
}

impl<C: Clock> SlidingWindowLimiter<C> {
    /// Create a new limiter with a custom clock.
    pub fn with_clock(limit: u32, window: Duration, clock: C) -> Result<Self, String> {
        let config = SlidingWindowConfig { limit, window };
        config.validate()?;

        Ok(Self {
            state: Arc::new(Mutex::new(WindowState { count: 0, window_start: clock.now() })),
            clock: Arc::new(clock),
            config,
        })
    }

    /// Create a new limiter from a validated configuration and custom clock.
    pub fn from_config_with_clock(config: SlidingWindowConfig, clock: C) -> Result<Self, String> {
        Self::with_clock(config.limit, config.window, clock)
    }

    /// Whether another request fits in the current window.
    ///
    /// Side-effect-free apart from the implicit window rollover.
    pub fn check(&self) -> bool {
        let mut state = self.lock_state();
        self.roll_over(&mut state);

        let allowed = state.count < self.config.limit;
        if !allowed {
            debug!(
                count = state.count,
                limit = self.config.limit,
                "rate limit window exhausted"
            );
        }
        allowed
    }

    /// Record an admitted request in the current window.
    pub fn record(&self) {
        let mut state = self.lock_state();
        self.roll_over(&mut state);
        state.count += 1;
        debug!(count = state.count, limit = self.config.limit, "recorded request");
    }

    /// Number of requests still admissible in the current window.
    pub fn remaining(&self) -> u32 {
        let mut state = self.lock_state();
        self.roll_over(&mut state);
        self.config.limit.saturating_sub(state.count)
    }

    /// Time until the current window ends, floored at zero.
    pub fn reset_in(&self) -> Duration {
        let state = self.lock_state();
        let elapsed = self.clock.now().duration_since(state.window_start);
        self.config.window.saturating_sub(elapsed)
    }

    /// Zero the counter and restart the window at "now".
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.count = 0;
        state.window_start = self.clock.now();
    }

    /// Configured per-window limit.
    pub fn limit(&self) -> u32 {
        self.config.limit
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, WindowState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("rate limiter state lock poisoned");
                poisoned.into_inner()
            }
        }
    }

    /// Restart the window when it has expired. The window start advances to
    /// "now", not to `window_start + window`.
    fn roll_over(&self, state: &mut WindowState) {
        let now = self.clock.now();
        if now.duration_since(state.window_start) >= self.config.window {
            state.count = 0;
            state.window_start = now;
        }
    }
}

impl SlidingWindowLimiter<SystemClock> {
    /// Create a new limiter with the system clock.
    pub fn new(limit: u32, window: Duration) -> Result<Self, String> {
        Self::with_clock(limit, window, SystemClock)
    }

    /// Create a new limiter from a validated configuration.
    pub fn from_config(config: SlidingWindowConfig) -> Result<Self, String> {
        Self::with_clock(config.limit, config.window, SystemClock)
    }
}

impl<C: Clock> Clone for SlidingWindowLimiter<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}
