//! Retry policy for API failures.

use rentora_common::resilience::{RetryDecision, RetryPolicy};
use rentora_common::ErrorClassification;
use rentora_domain::RentoraError;

/// Default policy for the request pipeline: retry transient API failures
/// (429 and 5xx) and status-0 network failures; stop on everything else.
/// A numeric `Retry-After` hint on a transient failure becomes a directed
/// delay that overrides the computed backoff.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRetryPolicy;

impl RetryPolicy<RentoraError> for HttpRetryPolicy {
    fn should_retry(&self, error: &RentoraError, _attempt: u32) -> RetryDecision {
        match error {
            RentoraError::Transient { .. } => match error.retry_after() {
                Some(hint) => RetryDecision::RetryAfter(hint),
                None => RetryDecision::Retry,
            },
            RentoraError::Network { .. } => RetryDecision::Retry,
            _ => RetryDecision::Stop,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn transient(status: u16, retry_after: Option<u64>) -> RentoraError {
        RentoraError::Transient {
            status,
            path: "/v2/properties".into(),
            message: "failed".into(),
            attempts: 1,
            retry_after,
            detail: None,
        }
    }

    #[test]
    fn rate_limited_with_hint_is_server_directed() {
        let decision = HttpRetryPolicy.should_retry(&transient(429, Some(5)), 0);
        assert_eq!(decision, RetryDecision::RetryAfter(Duration::from_secs(5)));
    }

    #[test]
    fn server_errors_use_computed_backoff() {
        assert_eq!(HttpRetryPolicy.should_retry(&transient(503, None), 0), RetryDecision::Retry);
    }

    #[test]
    fn network_failures_are_retried() {
        let err = RentoraError::Network { path: "/v2/properties".into(), message: "refused".into() };
        assert_eq!(HttpRetryPolicy.should_retry(&err, 0), RetryDecision::Retry);
    }

    #[test]
    fn client_errors_stop_immediately() {
        let err = RentoraError::Permanent {
            status: 400,
            path: "/v2/bookings".into(),
            message: "bad request".into(),
            detail: None,
        };
        assert_eq!(HttpRetryPolicy.should_retry(&err, 0), RetryDecision::Stop);

        let err = RentoraError::Validation("missing property id".into());
        assert_eq!(HttpRetryPolicy.should_retry(&err, 0), RetryDecision::Stop);
    }
}
