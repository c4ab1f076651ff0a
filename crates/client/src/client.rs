//! The request orchestrator.
//!
//! Every logical API call runs the same pipeline, strictly in order:
//!
//! 1. **Guard** — write verbs are rejected immediately in read-only mode.
//! 2. **Rate check** — the sliding window is consulted unless the call
//!    opts out; exhaustion fails fast with remaining/reset metadata rather
//!    than blocking, so one throttled caller cannot head-of-line block the
//!    rest of a cooperative scheduler.
//! 3. **Attempt loop** — the transport call is wrapped in the retry
//!    executor unless the call opts out; `Retry-After` hints captured by
//!    the transport steer the delay.
//! 4. **Normalization** — success returns the parsed body; terminal
//!    failures surface as a [`RentoraError`] carrying status, message,
//!    path, and any API-provided detail.
//!
//! The orchestrator also owns the module registry and the cross-cutting
//! call shapes: [`RentoraClient::batch`] (parallel, all-or-nothing
//! read-only pre-scan), [`RentoraClient::transaction`] (sequential with
//! best-effort compensation), and
//! [`RentoraClient::execute_across_modules`] (concurrent fan-out over
//! registered modules).

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::try_join_all;
use reqwest::Method;
use rentora_common::resilience::{RetryExecutor, Sleeper, SlidingWindowLimiter};
use rentora_domain::{RentoraError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ApiVersion, ClientConfig};
use crate::http::{HttpTransport, RawResponse, ResponseBody};
use crate::modules::{
    AvailabilityApi, BookingsApi, MessagingApi, PropertiesApi, RatesApi, WebhooksApi,
};
use crate::registry::{ApiModule, ModuleRegistry};
use crate::retry::HttpRetryPolicy;

/// Per-call options for [`RentoraClient::request`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Nested query parameters, flattened to bracket notation.
    pub params: Option<Value>,
    /// JSON request body.
    pub body: Option<Value>,
    /// Extra headers merged over the client defaults.
    pub headers: Vec<(String, String)>,
    /// Overrides the client's default API version for this call.
    pub api_version: Option<ApiVersion>,
    /// Issue a single attempt regardless of the retry policy.
    pub skip_retry: bool,
    /// Bypass the local rate-limit gate.
    pub skip_rate_limit: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    pub fn skip_retry(mut self) -> Self {
        self.skip_retry = true;
        self
    }

    pub fn skip_rate_limit(mut self) -> Self {
        self.skip_rate_limit = true;
        self
    }
}

/// One entry of a [`RentoraClient::batch`] call.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub method: Method,
    pub path: String,
    pub options: RequestOptions,
}

impl BatchRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), options: RequestOptions::default() }
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

type StepFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// One step of a [`RentoraClient::transaction`].
///
/// Steps declare their method and path up front so the read-only pre-scan
/// can inspect them without polling any future.
pub struct TransactionStep {
    method: Method,
    path: String,
    execute: StepFuture,
    rollback: Option<StepFuture>,
}

impl TransactionStep {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        execute: impl Future<Output = Result<Value>> + Send + 'static,
    ) -> Self {
        Self { method, path: path.into(), execute: Box::pin(execute), rollback: None }
    }

    /// Attach a compensating action, run if a later step fails.
    pub fn with_rollback(
        mut self,
        rollback: impl Future<Output = Result<Value>> + Send + 'static,
    ) -> Self {
        self.rollback = Some(Box::pin(rollback));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Local rate-limit metadata, advisory for callers.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    pub reset_in: Duration,
}

pub(crate) struct ClientInner {
    config: ClientConfig,
    transport: HttpTransport,
    limiter: SlidingWindowLimiter,
    retry: RetryExecutor<HttpRetryPolicy>,
    registry: ModuleRegistry,
}

/// Authenticated client for the Rentora API.
///
/// Cheap to clone; clones share the limiter window, the module registry,
/// and the underlying connection pool.
#[derive(Clone)]
pub struct RentoraClient {
    inner: Arc<ClientInner>,
}

impl RentoraClient {
    /// Build a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Build a client with an injected sleeper driving retry delays.
    /// Intended for tests that assert backoff behavior.
    pub fn with_sleeper(config: ClientConfig, sleeper: Arc<dyn Sleeper>) -> Result<Self> {
        Self::build(config, Some(sleeper))
    }

    fn build(config: ClientConfig, sleeper: Option<Arc<dyn Sleeper>>) -> Result<Self> {
        config.validate()?;

        let transport = HttpTransport::new(&config)?;
        let limiter = SlidingWindowLimiter::from_config(config.rate_limit.clone())
            .map_err(RentoraError::Config)?;
        let retry = match sleeper {
            Some(sleeper) => {
                RetryExecutor::with_sleeper(config.retry.clone(), HttpRetryPolicy, sleeper)
            }
            None => RetryExecutor::new(config.retry.clone(), HttpRetryPolicy),
        };

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                limiter,
                retry,
                registry: ModuleRegistry::new(),
            }),
        })
    }

    pub(crate) fn from_inner(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ClientInner> {
        Arc::downgrade(&self.inner)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Snapshot of the local rate-limit window.
    pub fn rate_limit_status(&self) -> RateLimitStatus {
        RateLimitStatus {
            limit: self.inner.limiter.limit(),
            remaining: self.inner.limiter.remaining(),
            reset_in: self.inner.limiter.reset_in(),
        }
    }

    /// The module registry owned by this client.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.inner.registry
    }

    // ------------------------------------------------------------------
    // Module accessors (lazy, memoized through the registry)
    // ------------------------------------------------------------------

    pub fn properties(&self) -> PropertiesApi {
        self.inner.registry.get_or_create("properties", || PropertiesApi::new(self))
    }

    pub fn bookings(&self) -> BookingsApi {
        self.inner.registry.get_or_create("bookings", || BookingsApi::new(self))
    }

    pub fn rates(&self) -> RatesApi {
        self.inner.registry.get_or_create("rates", || RatesApi::new(self))
    }

    pub fn availability(&self) -> AvailabilityApi {
        self.inner.registry.get_or_create("availability", || AvailabilityApi::new(self))
    }

    pub fn messaging(&self) -> MessagingApi {
        self.inner.registry.get_or_create("messaging", || MessagingApi::new(self))
    }

    pub fn webhooks(&self) -> WebhooksApi {
        self.inner.registry.get_or_create("webhooks", || WebhooksApi::new(self))
    }

    // ------------------------------------------------------------------
    // Generic request path
    // ------------------------------------------------------------------

    /// Issue a request and deserialize the response body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let full_path = self.full_path(path, &options);
        let value = self.request_value(method, path, options).await?;
        serde_json::from_value(value).map_err(|err| RentoraError::Decode {
            path: full_path,
            message: format!("unexpected response shape: {err}"),
        })
    }

    /// Issue a request and return the raw JSON body.
    pub async fn request_value(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value> {
        let full_path = self.full_path(path, &options);

        if self.inner.config.read_only && is_write_method(&method) {
            warn!(%method, path = %full_path, "write rejected: client is read-only");
            return Err(RentoraError::ReadOnlyViolation {
                method: method.to_string(),
                path: full_path,
            });
        }

        if !options.skip_rate_limit {
            if !self.inner.limiter.check() {
                let status = self.rate_limit_status();
                warn!(
                    path = %full_path,
                    reset_in_ms = status.reset_in.as_millis() as u64,
                    "local rate limit exhausted"
                );
                return Err(RentoraError::RateLimitExceeded {
                    path: full_path,
                    limit: status.limit,
                    remaining: status.remaining,
                    reset_in_ms: status.reset_in.as_millis() as u64,
                });
            }
            // One admission per logical request; retries ride on it.
            self.inner.limiter.record();
        }

        if options.skip_retry {
            return self.attempt_once(&method, &full_path, &options).await;
        }

        let outcome = self
            .inner
            .retry
            .execute(|_ctx| self.attempt_once(&method, &full_path, &options))
            .await;
        let attempts = outcome.attempts;
        outcome.result.map_err(|err| err.with_attempts(attempts))
    }

    async fn attempt_once(
        &self,
        method: &Method,
        full_path: &str,
        options: &RequestOptions,
    ) -> Result<Value> {
        let raw = self
            .inner
            .transport
            .execute(
                method,
                full_path,
                options.params.as_ref(),
                options.body.as_ref(),
                &options.headers,
            )
            .await?;
        normalize_response(full_path, raw)
    }

    fn full_path(&self, path: &str, options: &RequestOptions) -> String {
        let version = options.api_version.unwrap_or(self.inner.config.default_version);
        if path.starts_with('/') {
            format!("/{}{}", version.as_str(), path)
        } else {
            format!("/{}/{}", version.as_str(), path)
        }
    }

    // ------------------------------------------------------------------
    // Composite call shapes
    // ------------------------------------------------------------------

    /// Execute heterogeneous requests in parallel.
    ///
    /// In read-only mode the whole batch is rejected before anything runs
    /// if any entry uses a write verb; the error names the first offender.
    /// Results come back in input order; the first failure aborts the call.
    pub async fn batch(&self, requests: Vec<BatchRequest>) -> Result<Vec<Value>> {
        if self.inner.config.read_only {
            if let Some(offender) = requests.iter().find(|r| is_write_method(&r.method)) {
                let path = self.full_path(&offender.path, &offender.options);
                warn!(method = %offender.method, %path, "batch rejected: write in read-only mode");
                return Err(RentoraError::ReadOnlyViolation {
                    method: offender.method.to_string(),
                    path,
                });
            }
        }

        debug!(requests = requests.len(), "executing batch");
        let futures: Vec<_> = requests
            .into_iter()
            .map(|request| {
                let client = self.clone();
                async move {
                    let BatchRequest { method, path, options } = request;
                    client.request_value(method, &path, options).await
                }
            })
            .collect();

        try_join_all(futures).await.map_err(|err| {
            warn!(error = %err, "batch aborted on first failure");
            err
        })
    }

    /// Execute steps **sequentially**, compensating on failure.
    ///
    /// When step *k* fails, the rollbacks of steps *1..k-1* run in reverse
    /// order. Rollback failures are logged and swallowed (best-effort
    /// compensation, not atomicity); the original error is returned.
    pub async fn transaction(&self, steps: Vec<TransactionStep>) -> Result<Vec<Value>> {
        if self.inner.config.read_only {
            if let Some(offender) = steps.iter().find(|s| is_write_method(&s.method)) {
                warn!(method = %offender.method, path = %offender.path, "transaction rejected: write in read-only mode");
                return Err(RentoraError::ReadOnlyViolation {
                    method: offender.method.to_string(),
                    path: offender.path.clone(),
                });
            }
        }

        let mut completed_rollbacks: Vec<(String, StepFuture)> = Vec::new();
        let mut results = Vec::new();

        for (index, step) in steps.into_iter().enumerate() {
            let TransactionStep { method, path, execute, rollback } = step;
            debug!(step = index + 1, %method, %path, "executing transaction step");

            match execute.await {
                Ok(value) => {
                    results.push(value);
                    if let Some(rollback) = rollback {
                        completed_rollbacks.push((path, rollback));
                    }
                }
                Err(err) => {
                    warn!(
                        step = index + 1,
                        %path,
                        error = %err,
                        "transaction step failed, compensating completed steps"
                    );
                    for (rollback_path, rollback) in completed_rollbacks.into_iter().rev() {
                        if let Err(rollback_err) = rollback.await {
                            warn!(
                                path = %rollback_path,
                                error = %rollback_err,
                                "rollback failed, continuing compensation"
                            );
                        }
                    }
                    return Err(err);
                }
            }
        }

        Ok(results)
    }

    /// Run an operation over registered modules concurrently and collect
    /// the results into a name-keyed map.
    ///
    /// `names` selects a subset; `None` means every registered module.
    /// Unknown names fail validation before anything runs. The first
    /// failing module aborts the whole call.
    pub async fn execute_across_modules<T, F, Fut>(
        &self,
        names: Option<&[&str]>,
        operation: F,
    ) -> Result<BTreeMap<String, T>>
    where
        F: Fn(Arc<dyn ApiModule>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let modules: Vec<Arc<dyn ApiModule>> = match names {
            Some(names) => names
                .iter()
                .map(|name| {
                    self.inner
                        .registry
                        .get(name)
                        .ok_or_else(|| RentoraError::Validation(format!("unknown module: {name}")))
                })
                .collect::<Result<_>>()?,
            None => self.inner.registry.all(),
        };

        let futures: Vec<_> = modules
            .into_iter()
            .map(|module| {
                let name = module.name().to_string();
                let fut = operation(module);
                async move { fut.await.map(|value| (name, value)) }
            })
            .collect();

        let pairs = try_join_all(futures).await.map_err(|err| {
            warn!(error = %err, "cross-module operation aborted on first failure");
            err
        })?;
        Ok(pairs.into_iter().collect())
    }
}

/// Mutating verbs, compared case-insensitively.
fn is_write_method(method: &Method) -> bool {
    let name = method.as_str();
    ["POST", "PUT", "PATCH", "DELETE"].iter().any(|verb| name.eq_ignore_ascii_case(verb))
}

/// Turn one transport attempt into the pipeline's result: 2xx bodies pass
/// through, 429/5xx become [`RentoraError::Transient`] (attempt count is
/// stamped on later by the caller), other statuses become
/// [`RentoraError::Permanent`].
fn normalize_response(path: &str, raw: RawResponse) -> Result<Value> {
    if raw.status.is_success() {
        return Ok(match raw.body {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => Value::String(text),
            ResponseBody::Empty => Value::Null,
        });
    }

    let status = raw.status.as_u16();
    let fallback = raw.status.canonical_reason().unwrap_or("request failed").to_string();
    let (message, detail) = match raw.body {
        ResponseBody::Json(value) => {
            let message = extract_message(&value).unwrap_or(fallback);
            (message, Some(value))
        }
        ResponseBody::Text(text) => (text.clone(), Some(Value::String(text))),
        ResponseBody::Empty => (fallback, None),
    };

    if status == 429 || raw.status.is_server_error() {
        Err(RentoraError::Transient {
            status,
            path: path.to_string(),
            message,
            attempts: 1,
            retry_after: raw.retry_after,
            detail,
        })
    } else {
        Err(RentoraError::Permanent { status, path: path.to_string(), message, detail })
    }
}

fn extract_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;

    #[test]
    fn write_methods_match_case_insensitively() {
        assert!(is_write_method(&Method::POST));
        assert!(is_write_method(&Method::DELETE));
        assert!(!is_write_method(&Method::GET));
        assert!(!is_write_method(&Method::HEAD));

        let lowercase = Method::from_bytes(b"patch").unwrap();
        assert!(is_write_method(&lowercase));
    }

    #[test]
    fn normalize_passes_success_bodies_through() {
        let raw = RawResponse {
            status: StatusCode::OK,
            retry_after: None,
            body: ResponseBody::Json(json!({"id": 7})),
        };
        assert_eq!(normalize_response("/v2/properties/7", raw).unwrap(), json!({"id": 7}));

        let raw = RawResponse {
            status: StatusCode::NO_CONTENT,
            retry_after: None,
            body: ResponseBody::Empty,
        };
        assert_eq!(normalize_response("/v2/bookings/9", raw).unwrap(), Value::Null);
    }

    #[test]
    fn normalize_extracts_api_error_messages() {
        let raw = RawResponse {
            status: StatusCode::NOT_FOUND,
            retry_after: None,
            body: ResponseBody::Json(json!({"message": "unknown property", "code": 404})),
        };

        match normalize_response("/v2/properties/7", raw) {
            Err(RentoraError::Permanent { status, message, detail, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "unknown property");
                assert_eq!(detail.unwrap()["code"], 404);
            }
            other => panic!("expected permanent error, got {other:?}"),
        }
    }

    #[test]
    fn normalize_classifies_429_and_5xx_as_transient() {
        let raw = RawResponse {
            status: StatusCode::TOO_MANY_REQUESTS,
            retry_after: Some(5),
            body: ResponseBody::Empty,
        };
        match normalize_response("/v2/rates", raw) {
            Err(RentoraError::Transient { status: 429, retry_after: Some(5), .. }) => {}
            other => panic!("expected transient error, got {other:?}"),
        }

        let raw = RawResponse {
            status: StatusCode::SERVICE_UNAVAILABLE,
            retry_after: None,
            body: ResponseBody::Text("upstream down".into()),
        };
        match normalize_response("/v2/rates", raw) {
            Err(RentoraError::Transient { status: 503, message, .. }) => {
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected transient error, got {other:?}"),
        }
    }

    #[test]
    fn full_path_prefixes_version() {
        let client = RentoraClient::new(
            ClientConfig::builder("key").build().unwrap(),
        )
        .unwrap();

        let options = RequestOptions::new();
        assert_eq!(client.full_path("/properties", &options), "/v2/properties");
        assert_eq!(client.full_path("properties", &options), "/v2/properties");

        let options = RequestOptions::new().version(ApiVersion::V1);
        assert_eq!(client.full_path("/webhooks", &options), "/v1/webhooks");
    }
}
