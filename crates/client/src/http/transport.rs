//! The reqwest-backed transport.
//!
//! One [`HttpTransport::execute`] call is exactly one HTTP attempt: it
//! builds the URL, merges headers, serializes the body, enforces the
//! configured timeout, and parses the response by content type. Retry and
//! rate limiting live in the orchestrator above this layer.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use rentora_domain::{RentoraError, Result};
use serde_json::Value;
use tracing::debug;

use super::{params, redact};
use crate::config::ClientConfig;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Parsed response body, split by declared content type.
#[derive(Debug, Clone)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

/// One transport attempt's result, before orchestrator normalization.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    /// `Retry-After` header in whole seconds, when present and numeric.
    /// Unparseable values (HTTP-dates included) are treated as absent.
    pub retry_after: Option<u64>,
    pub body: ResponseBody,
}

/// Thin wrapper over a configured [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    log_requests: bool,
}

impl HttpTransport {
    /// Build the transport from client configuration. The API key and
    /// `Accept` header become client-wide defaults.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&config.api_key)
                .map_err(|_| RentoraError::Config("api_key contains invalid header bytes".into()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| RentoraError::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            log_requests: config.log_requests,
        })
    }

    /// Issue a single HTTP attempt.
    pub async fn execute(
        &self,
        method: &Method,
        path: &str,
        params: Option<&Value>,
        body: Option<&Value>,
        extra_headers: &[(String, String)],
    ) -> Result<RawResponse> {
        let url = params::build_url(&self.base_url, path, params);

        if self.log_requests {
            let logged_body =
                body.map(redact::redact).unwrap_or(Value::Null);
            debug!(%method, %url, body = %logged_body, "sending request");
        }

        let mut builder = self.client.request(method.clone(), &url);
        for (name, value) in extra_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| classify_send_error(path, &err))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        let text = response.text().await.map_err(|err| RentoraError::Network {
            path: path.to_string(),
            message: format!("failed to read response body: {err}"),
        })?;

        let body = if text.is_empty() {
            ResponseBody::Empty
        } else if is_json {
            let value: Value = serde_json::from_str(&text).map_err(|err| RentoraError::Decode {
                path: path.to_string(),
                message: format!("body declared application/json but did not parse: {err}"),
            })?;
            ResponseBody::Json(value)
        } else {
            ResponseBody::Text(text)
        };

        if self.log_requests {
            let logged_body = match &body {
                ResponseBody::Json(value) => redact::redact(value),
                ResponseBody::Text(text) => Value::String(text.clone()),
                ResponseBody::Empty => Value::Null,
            };
            debug!(status = status.as_u16(), %url, body = %logged_body, "received response");
        }

        Ok(RawResponse { status, retry_after, body })
    }
}

/// Transport-level failures never carry an HTTP status; the retry policy
/// sees them as status 0.
fn classify_send_error(path: &str, err: &reqwest::Error) -> RentoraError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        format!("request failed: {err}")
    };
    RentoraError::Network { path: path.to_string(), message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base_url: &str) -> HttpTransport {
        let config = ClientConfig::builder("test-key")
            .base_url(base_url)
            .build()
            .unwrap();
        HttpTransport::new(&config).unwrap()
    }

    #[tokio::test]
    async fn connection_failure_surfaces_as_network_error() {
        // Port 1 is never listening.
        let transport = transport("http://127.0.0.1:1");

        let result = transport
            .execute(&Method::GET, "/v2/properties", None, None, &[])
            .await;

        match result {
            Err(RentoraError::Network { path, .. }) => assert_eq!(path, "/v2/properties"),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_api_keys_with_invalid_header_bytes() {
        let config = ClientConfig::builder("bad\nkey").build().unwrap();
        let result = HttpTransport::new(&config);
        assert!(matches!(result, Err(RentoraError::Config(_))));
    }
}
