//! Shared infrastructure for the Rentora client crates.
//!
//! This crate carries the pieces that are independent of the Rentora API
//! itself:
//! - `resilience`: sliding-window rate limiting and retry with exponential
//!   backoff, both built on a clock/sleeper abstraction so tests never wait
//!   on real time
//! - `error`: the [`ErrorClassification`] trait and severity ladder shared
//!   by every error type in the workspace
//! - `testing`: deterministic test doubles (`RecordingSleeper`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod error;
pub mod resilience;
pub mod testing;

pub use error::{ErrorClassification, ErrorSeverity};
pub use resilience::{
    Clock, MockClock, RetryConfig, RetryConfigBuilder, RetryDecision, RetryExecutor, RetryOutcome,
    RetryPolicy, Sleeper, SlidingWindowConfig, SlidingWindowConfigBuilder, SlidingWindowLimiter,
    SystemClock, TokioSleeper,
};
