//! Client configuration.
//!
//! Everything the orchestrator needs is read once from [`ClientConfig`] at
//! construction; there is no hot reload and no ambient environment state.
//! Debug request/response tracing in particular is an explicit
//! [`ClientConfig::log_requests`] flag, off by default.

use std::time::Duration;

use rentora_common::resilience::{RetryConfig, SlidingWindowConfig};
use rentora_domain::{RentoraError, Result};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.rentora.io";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API version a request is addressed to; becomes the leading path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
        }
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for [`RentoraClient`](crate::RentoraClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key attached to every request (required, opaque).
    pub api_key: String,
    /// Base URL without a trailing version segment.
    pub base_url: String,
    /// Version used when a request does not override it.
    pub default_version: ApiVersion,
    /// When set, every mutating verb is rejected before any network cost.
    pub read_only: bool,
    /// Enables debug-level request/response tracing (bodies are redacted).
    pub log_requests: bool,
    /// Transport timeout per attempt.
    pub timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
    /// Retry behavior for transient failures.
    pub retry: RetryConfig,
    /// Local request budget.
    pub rate_limit: SlidingWindowConfig,
}

impl ClientConfig {
    /// Start building a configuration with the one required value.
    pub fn builder(api_key: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(api_key)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(RentoraError::Config("api_key must not be empty".into()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| RentoraError::Config(format!("invalid base_url: {e}")))?;
        self.retry.validate().map_err(RentoraError::Config)?;
        self.rate_limit.validate().map_err(RentoraError::Config)?;
        Ok(())
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config: ClientConfig {
                api_key: api_key.into(),
                base_url: DEFAULT_BASE_URL.to_string(),
                default_version: ApiVersion::V2,
                read_only: false,
                log_requests: false,
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                user_agent: concat!("rentora-client/", env!("CARGO_PKG_VERSION")).to_string(),
                retry: RetryConfig::default(),
                rate_limit: SlidingWindowConfig::default(),
            },
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn default_version(mut self, version: ApiVersion) -> Self {
        self.config.default_version = version;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    pub fn log_requests(mut self, log_requests: bool) -> Self {
        self.config.log_requests = log_requests;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn rate_limit(mut self, rate_limit: SlidingWindowConfig) -> Self {
        self.config.rate_limit = rate_limit;
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ClientConfig::builder("key-123").build().unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.default_version, ApiVersion::V2);
        assert!(!config.read_only);
        assert!(!config.log_requests);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn rejects_blank_api_key() {
        let result = ClientConfig::builder("   ").build();
        assert!(matches!(result, Err(RentoraError::Config(_))));
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let result = ClientConfig::builder("key").base_url("not a url").build();
        assert!(matches!(result, Err(RentoraError::Config(_))));
    }

    #[test]
    fn version_renders_as_path_segment() {
        assert_eq!(ApiVersion::V1.to_string(), "v1");
        assert_eq!(ApiVersion::V2.as_str(), "v2");
    }
}
