//! Resilience patterns for the request pipeline.
//!
//! This module provides the two primitives every outbound Rentora call is
//! wrapped in:
//! - **Rate limiting**: a sliding-window counter that gates requests before
//!   they reach the transport ([`SlidingWindowLimiter`])
//! - **Retry**: configurable retry with exponential backoff and support for
//!   server-directed delays ([`RetryExecutor`])
//!
//! Both are generic over a [`Clock`] (and the retry executor over a
//! [`Sleeper`]) so that window rollover and backoff sequences can be tested
//! deterministically without real delays.

pub mod clock;
pub mod rate_limiter;
pub mod retry;

pub use clock::{Clock, MockClock, SystemClock};
pub use rate_limiter::{SlidingWindowConfig, SlidingWindowConfigBuilder, SlidingWindowLimiter};
pub use retry::{
    RetryConfig, RetryConfigBuilder, RetryContext, RetryDecision, RetryExecutor, RetryOutcome,
    RetryPolicy, Sleeper, TokioSleeper,
};
