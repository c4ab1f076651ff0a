//! Error types used throughout the Rentora client.
//!
//! Every terminal failure of the request pipeline is one of these variants.
//! The taxonomy distinguishes failures by where they arise and whether they
//! may be retried; the retry policy pattern-matches on the variant (through
//! [`ErrorClassification`]) rather than probing fields.

use std::time::Duration;

use rentora_common::{ErrorClassification, ErrorSeverity};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Main error type for the Rentora client.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RentoraError {
    /// A write verb was attempted while the client is in read-only mode.
    /// Raised before any rate-limit or transport cost.
    #[error("{method} {path} rejected: client is in read-only mode")]
    ReadOnlyViolation { method: String, path: String },

    /// The local request budget for the current window is exhausted. This
    /// is a client-side throttling decision, not an API response.
    #[error("rate limit exceeded for {path}: {remaining}/{limit} requests left, window resets in {reset_in_ms}ms")]
    RateLimitExceeded { path: String, limit: u32, remaining: u32, reset_in_ms: u64 },

    /// A retryable API failure (429 or 5xx), surfaced only once retries
    /// are exhausted. `retry_after` is the server hint in seconds, when
    /// one was sent.
    #[error("transient API failure ({status}) for {path} after {attempts} attempt(s): {message}")]
    Transient {
        status: u16,
        path: String,
        message: String,
        attempts: u32,
        retry_after: Option<u64>,
        detail: Option<Value>,
    },

    /// A non-retryable API failure (4xx other than 429), surfaced on first
    /// occurrence.
    #[error("API request failed ({status}) for {path}: {message}")]
    Permanent { status: u16, path: String, message: String, detail: Option<Value> },

    /// The transport failed before an HTTP status existed: connection
    /// refused, DNS failure, timeout. Treated as status 0 by the retry
    /// policy.
    #[error("network failure for {path}: {message}")]
    Network { path: String, message: String },

    /// Rejected locally before any network call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The response body did not match its declared content type.
    #[error("could not decode response from {path}: {message}")]
    Decode { path: String, message: String },

    /// Client configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invariant violation inside the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RentoraError {
    /// The HTTP status associated with this error; 0 for failures that
    /// never produced a status (network, local rejections).
    pub fn status(&self) -> u16 {
        match self {
            RentoraError::Transient { status, .. } | RentoraError::Permanent { status, .. } => {
                *status
            }
            _ => 0,
        }
    }

    /// The request path this error is about, when one exists.
    pub fn path(&self) -> Option<&str> {
        match self {
            RentoraError::ReadOnlyViolation { path, .. }
            | RentoraError::RateLimitExceeded { path, .. }
            | RentoraError::Transient { path, .. }
            | RentoraError::Permanent { path, .. }
            | RentoraError::Network { path, .. }
            | RentoraError::Decode { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Structured detail payload passed through from the API, if any.
    pub fn detail(&self) -> Option<&Value> {
        match self {
            RentoraError::Transient { detail, .. } | RentoraError::Permanent { detail, .. } => {
                detail.as_ref()
            }
            _ => None,
        }
    }

    /// Stamp the consumed attempt count onto a transient failure. Other
    /// variants are returned unchanged.
    pub fn with_attempts(self, attempts: u32) -> Self {
        match self {
            RentoraError::Transient { status, path, message, retry_after, detail, .. } => {
                RentoraError::Transient { status, path, message, attempts, retry_after, detail }
            }
            other => other,
        }
    }
}

impl ErrorClassification for RentoraError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            RentoraError::Transient { .. }
                | RentoraError::Network { .. }
                | RentoraError::RateLimitExceeded { .. }
        )
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            RentoraError::RateLimitExceeded { .. }
            | RentoraError::Transient { .. }
            | RentoraError::ReadOnlyViolation { .. } => ErrorSeverity::Warning,
            RentoraError::Network { .. }
            | RentoraError::Permanent { .. }
            | RentoraError::Validation(_)
            | RentoraError::Decode { .. }
            | RentoraError::Config(_) => ErrorSeverity::Error,
            RentoraError::Internal(_) => ErrorSeverity::Critical,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            RentoraError::Transient { retry_after: Some(secs), .. } => {
                Some(Duration::from_secs(*secs))
            }
            RentoraError::RateLimitExceeded { reset_in_ms, .. } => {
                Some(Duration::from_millis(*reset_in_ms))
            }
            _ => None,
        }
    }
}

/// Result type alias for Rentora operations.
pub type Result<T> = std::result::Result<T, RentoraError>;
