//! Error classification shared across the workspace.
//!
//! Every error type in the Rentora crates implements
//! [`ErrorClassification`] so that retry logic, logging, and callers can
//! make uniform decisions without matching on concrete variants:
//!
//! - [`ErrorClassification::is_retryable`]: can the failed operation be
//!   retried at all?
//! - [`ErrorClassification::severity`]: how serious is the failure?
//! - [`ErrorClassification::is_critical`]: does it require immediate
//!   attention?
//! - [`ErrorClassification::retry_after`]: a suggested wait before the next
//!   attempt, when the error carries one (server `Retry-After` hints, local
//!   rate-limit window resets).

use std::fmt;
use std::time::Duration;

/// Severity level of an error, used for monitoring and log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, expected conditions (not found, empty results).
    Info,
    /// Degraded but operational (rate limiting, transient failures).
    Warning,
    /// Failure requiring attention (network errors, invalid input).
    Error,
    /// System integrity at risk (invariant violations).
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Standard interface for classifying errors by their characteristics.
pub trait ErrorClassification {
    /// Whether the failed operation may be retried.
    fn is_retryable(&self) -> bool;

    /// Severity of the error.
    fn severity(&self) -> ErrorSeverity;

    /// Whether the error requires immediate attention.
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Suggested delay before the next attempt, if the error carries one.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flaky;

    impl ErrorClassification for Flaky {
        fn is_retryable(&self) -> bool {
            true
        }

        fn severity(&self) -> ErrorSeverity {
            ErrorSeverity::Warning
        }

        fn retry_after(&self) -> Option<Duration> {
            Some(Duration::from_secs(2))
        }
    }

    #[test]
    fn severity_ordering_escalates() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }

    #[test]
    fn default_critical_follows_severity() {
        assert!(!Flaky.is_critical());
        assert_eq!(Flaky.retry_after(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn severity_display() {
        assert_eq!(ErrorSeverity::Warning.to_string(), "warning");
        assert_eq!(ErrorSeverity::Critical.to_string(), "critical");
    }
}
