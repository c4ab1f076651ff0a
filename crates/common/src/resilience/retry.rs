//! Retry with exponential backoff and server-directed delays.
//!
//! The executor runs an async operation up to a configured number of
//! attempts. Between failed attempts it sleeps for an exponentially growing
//! delay, unless the [`RetryPolicy`] supplies an explicit delay (a server's
//! `Retry-After` hint), which takes precedence over the computed backoff.
//! Delays of either kind are capped at [`RetryConfig::max_delay`].
//!
//! Sleeping goes through the [`Sleeper`] trait so tests can observe the
//! exact delay sequence instead of waiting it out.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

/// Decision for whether to retry a failed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry with the computed backoff delay.
    Retry,
    /// Retry after a specific delay (server-directed; overrides backoff).
    RetryAfter(Duration),
    /// Don't retry.
    Stop,
}

/// Trait for determining whether an error should be retried.
pub trait RetryPolicy<E> {
    /// Decide whether to retry after `error` on the given 0-based attempt
    /// index, and optionally supply a custom delay.
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Abstraction over delay execution, injectable for deterministic tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first (must be >= 1).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Multiplier applied per attempt: `initial_delay * base^attempt`.
    pub backoff_base: f64,
    /// Upper bound for any delay, computed or server-directed.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(1_000),
            backoff_base: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a new configuration builder.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        if self.backoff_base <= 0.0 {
            return Err("backoff_base must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Backoff delay for the given 0-based attempt index, capped at
    /// `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.initial_delay.as_millis() as f64 * self.backoff_base.powi(attempt as i32);
        let delay_ms = delay.min(self.max_delay.as_millis() as f64) as u64;
        Duration::from_millis(delay_ms)
    }
}

/// Builder for [`RetryConfig`].
#[derive(Debug)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.config.initial_delay = delay;
        self
    }

    pub fn backoff_base(mut self, base: f64) -> Self {
        self.config.backoff_base = base;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    pub fn build(self) -> Result<RetryConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Per-attempt context passed to the retried operation.
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Current attempt number, 1-based.
    pub attempt: u32,
    /// Total number of attempts the executor will make.
    pub total_attempts: u32,
    /// Rendered failure of the previous attempt; `None` on the first.
    pub last_error: Option<String>,
}

/// Outcome of a retry execution: the terminal result plus how many attempts
/// were consumed producing it.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// The retry executor.
///
/// Attempt indices are 0-based internally; the [`RetryContext`] handed to
/// the operation is 1-based. No sleep happens after a successful attempt
/// nor after the final allowed attempt.
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
    sleeper: Arc<dyn Sleeper>,
}

impl<P> RetryExecutor<P> {
    /// Create a new executor with the given configuration and policy.
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self::with_sleeper(config, policy, Arc::new(TokioSleeper))
    }

    /// Create an executor with an injected sleeper (deterministic tests).
    pub fn with_sleeper(config: RetryConfig, policy: P, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { config, policy, sleeper }
    }

    /// Execute an operation with retry logic, returning the outcome with
    /// its attempt count.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut(RetryContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let total = self.config.max_attempts;
        let mut last_error: Option<String> = None;
        let mut index: u32 = 0;

        loop {
            let context = RetryContext {
                attempt: index + 1,
                total_attempts: total,
                last_error: last_error.clone(),
            };

            match operation(context).await {
                Ok(value) => {
                    if index > 0 {
                        debug!(retries = index, "operation succeeded after retries");
                    }
                    return RetryOutcome { result: Ok(value), attempts: index + 1 };
                }
                Err(error) => {
                    if index + 1 >= total {
                        warn!(attempts = total, error = %error, "retry attempts exhausted");
                        return RetryOutcome { result: Err(error), attempts: total };
                    }

                    let delay = match self.policy.should_retry(&error, index) {
                        RetryDecision::Stop => {
                            debug!(error = %error, "error is not retryable");
                            return RetryOutcome { result: Err(error), attempts: index + 1 };
                        }
                        RetryDecision::Retry => self.config.delay_for_attempt(index),
                        RetryDecision::RetryAfter(custom) => custom.min(self.config.max_delay),
                    };

                    warn!(
                        attempt = index + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "operation failed, retrying"
                    );
                    last_error = Some(error.to_string());
                    self.sleeper.sleep(delay).await;
                    index += 1;
                }
            }
        }
    }

    /// Execute an operation and unwrap the outcome into a plain `Result`.
    pub async fn run<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut(RetryContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute(operation).await.into_result()
    }
}

/// Pre-defined retry policies.
pub mod policies {
    use super::{RetryDecision, RetryPolicy};

    /// Retries on any error.
    #[derive(Debug, Clone, Copy)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Predicate-based retry policy.
    #[derive(Debug)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
            if (self.predicate)(error, attempt) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::policies::{AlwaysRetry, PredicateRetry};
    use super::*;
    use crate::testing::RecordingSleeper;

    fn config_100ms(max_attempts: u32) -> RetryConfig {
        RetryConfig::builder()
            .max_attempts(max_attempts)
            .initial_delay(Duration::from_millis(100))
            .backoff_base(2.0)
            .max_delay(Duration::from_secs(30))
            .build()
            .unwrap()
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let config = RetryConfig::builder()
            .initial_delay(Duration::from_millis(100))
            .backoff_base(2.0)
            .max_delay(Duration::from_millis(500))
            .build()
            .unwrap();

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(10), Duration::from_millis(500));
    }

    #[test]
    fn config_validation() {
        assert!(RetryConfig::builder().max_attempts(0).build().is_err());
        assert!(RetryConfig::builder().backoff_base(0.0).build().is_err());
        assert!(RetryConfig::builder().build().is_ok());
    }

    #[tokio::test]
    async fn four_failures_then_success_sleeps_exact_sequence() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let executor =
            RetryExecutor::with_sleeper(config_100ms(5), AlwaysRetry, sleeper.clone());
        let calls = AtomicU32::new(0);

        let outcome = executor
            .execute(|_ctx| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 4 {
                        Err("throttled")
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(outcome.attempts, 5);
        assert!(outcome.result.is_ok());
        // No sleep after the attempt that succeeds.
        assert_eq!(
            sleeper.recorded(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
            ]
        );
    }

    #[tokio::test]
    async fn exhaustion_returns_last_error_with_full_attempt_count() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let executor =
            RetryExecutor::with_sleeper(config_100ms(3), AlwaysRetry, sleeper.clone());

        let outcome: RetryOutcome<(), &str> =
            executor.execute(|_ctx| async { Err("down") }).await;

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.result.unwrap_err(), "down");
        // No sleep after the final allowed attempt.
        assert_eq!(sleeper.recorded().len(), 2);
    }

    #[tokio::test]
    async fn stop_decision_fails_without_sleeping() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let policy = PredicateRetry::new(|_: &&str, _| false);
        let executor = RetryExecutor::with_sleeper(config_100ms(5), policy, sleeper.clone());
        let calls = AtomicU32::new(0);

        let outcome: RetryOutcome<(), &str> = executor
            .execute(|_ctx| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("bad request") }
            })
            .await;

        assert_eq!(outcome.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn retry_after_overrides_backoff_and_is_capped() {
        struct Directed(Duration);

        impl RetryPolicy<&'static str> for Directed {
            fn should_retry(&self, _error: &&'static str, _attempt: u32) -> RetryDecision {
                RetryDecision::RetryAfter(self.0)
            }
        }

        let sleeper = Arc::new(RecordingSleeper::new());
        let config = RetryConfig::builder()
            .max_attempts(2)
            .initial_delay(Duration::from_millis(100))
            .max_delay(Duration::from_secs(30))
            .build()
            .unwrap();
        let executor =
            RetryExecutor::with_sleeper(config, Directed(Duration::from_secs(5)), sleeper.clone());
        let calls = AtomicU32::new(0);

        let outcome = executor
            .execute(|_ctx| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n == 0 { Err("throttled") } else { Ok(()) } }
            })
            .await;

        assert!(outcome.result.is_ok());
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(5)]);

        // A hint above max_delay is capped.
        let sleeper = Arc::new(RecordingSleeper::new());
        let config = RetryConfig::builder()
            .max_attempts(2)
            .max_delay(Duration::from_secs(30))
            .build()
            .unwrap();
        let executor =
            RetryExecutor::with_sleeper(config, Directed(Duration::from_secs(90)), sleeper.clone());
        let calls = AtomicU32::new(0);

        let outcome = executor
            .execute(|_ctx| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n == 0 { Err("throttled") } else { Ok(()) } }
            })
            .await;

        assert!(outcome.result.is_ok());
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(30)]);
    }

    #[tokio::test]
    async fn context_is_one_based_and_carries_previous_error() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let executor =
            RetryExecutor::with_sleeper(config_100ms(3), AlwaysRetry, sleeper.clone());
        let seen = std::sync::Mutex::new(Vec::new());

        let outcome = executor
            .execute(|ctx| {
                let mut guard = seen.lock().unwrap();
                guard.push((ctx.attempt, ctx.total_attempts, ctx.last_error.clone()));
                let fail = guard.len() < 3;
                async move { if fail { Err("boom") } else { Ok(()) } }
            })
            .await;

        assert!(outcome.result.is_ok());
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen[0], (1, 3, None));
        assert_eq!(seen[1], (2, 3, Some("boom".to_string())));
        assert_eq!(seen[2], (3, 3, Some("boom".to_string())));
    }

    #[tokio::test]
    async fn run_unwraps_the_outcome() {
        let executor = RetryExecutor::new(config_100ms(1), AlwaysRetry);

        let ok: Result<u32, &str> = executor.run(|_ctx| async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));

        let err: Result<u32, &str> = executor.run(|_ctx| async { Err("no") }).await;
        assert_eq!(err, Err("no"));
    }
}
