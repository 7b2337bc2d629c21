// flowgate-admin/src/gateway.rs
// ============================================================================
// Module: HTTP Gateway
// Description: Single outbound-request helper for the runtime admin API.
// Purpose: Issue identified requests and normalize response handling.
// Dependencies: reqwest, serde_json
// ============================================================================

//! ## Overview
//! The gateway is the only place in the crate that touches the network.
//! Every request carries the fixed client-identity header (caller-supplied
//! headers of the same name win), empty responses short-circuit to `None`,
//! and non-2xx responses surface through a two-stage best-effort message
//! extraction: the body is read as text, then probed for a JSON `message`
//! field, falling back to the raw text verbatim. Remote error bodies are
//! not guaranteed to be JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use reqwest::Response;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde_json::Value;

use crate::error::AdminError;
use crate::error::decode_preview;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header naming the client issuing admin requests.
pub const CLIENT_IDENTITY_HEADER: &str = "x-flowgate-client";
/// Fixed client-identity value attached to every outbound request.
pub const CLIENT_IDENTITY: &str = concat!("flowgate-mcp/", env!("CARGO_PKG_VERSION"));
/// Default admin base URL when no configuration is provided.
pub const DEFAULT_BASE_URL: &str = "http://localhost:9070";
/// Default connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1_000;
/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the admin gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminGatewayConfig {
    /// Admin API base URL (trailing slashes are trimmed).
    pub base_url: String,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for AdminGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Outbound request helper for the runtime admin API.
#[derive(Debug, Clone)]
pub struct AdminGateway {
    /// Admin API base URL (no trailing slash).
    base_url: String,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl AdminGateway {
    /// Builds a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the HTTP client cannot be built.
    pub fn new(config: AdminGatewayConfig) -> Result<Self, AdminError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|err| AdminError::Transport {
                url: config.base_url.clone(),
                message: format!("http client build failed: {err}"),
            })?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            client,
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues one request and parses a JSON body when one is present.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] on network failures, non-2xx statuses, and
    /// unparseable 2xx bodies. A 2xx parse failure is a wrapped transport
    /// failure, never a silent fallback to raw text.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<&Value>,
    ) -> Result<Option<Value>, AdminError> {
        let url = format!("{}{path}", self.base_url);
        let (body_text, _) = match self.send(method, &url, headers, body).await? {
            Some(reply) => reply,
            None => return Ok(None),
        };
        if body_text.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body_text).map(Some).map_err(|err| AdminError::Transport {
            url,
            message: err.to_string(),
        })
    }

    /// Issues one request while requiring a declared JSON representation.
    ///
    /// Used by the introspection query path, which can in principle answer
    /// with a different representation.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Decode`] when the declared content type is not
    /// JSON or the payload fails to parse; the payload preview in parse
    /// failures is bounded.
    pub async fn request_checked(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<&Value>,
    ) -> Result<Option<Value>, AdminError> {
        let url = format!("{}{path}", self.base_url);
        let (body_text, content_type) = match self.send(method, &url, headers, body).await? {
            Some(reply) => reply,
            None => return Ok(None),
        };
        if !content_type.to_ascii_lowercase().contains("application/json") {
            return Err(AdminError::Decode(format!(
                "expected a JSON response, got content type '{content_type}'"
            )));
        }
        if body_text.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body_text).map(Some).map_err(|_| {
            AdminError::Decode(format!(
                "response is not valid JSON: {}",
                decode_preview(&body_text)
            ))
        })
    }

    /// Sends the request and applies the shared status handling.
    ///
    /// Returns `None` for 204 and zero-length-body responses; otherwise the
    /// body text and declared content type.
    async fn send(
        &self,
        method: Method,
        url: &str,
        mut headers: HeaderMap,
        body: Option<&Value>,
    ) -> Result<Option<(String, String)>, AdminError> {
        if !headers.contains_key(CLIENT_IDENTITY_HEADER) {
            headers.insert(CLIENT_IDENTITY_HEADER, HeaderValue::from_static(CLIENT_IDENTITY));
        }
        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(|err| AdminError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(remote_error(response).await);
        }
        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Ok(None);
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body_text = response.text().await.map_err(|err| AdminError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        Ok(Some((body_text, content_type)))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the remote error for a non-2xx response.
async fn remote_error(response: Response) -> AdminError {
    let status = response.status();
    let body_text = response.text().await.unwrap_or_default();
    AdminError::Remote {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        message: extract_error_message(&body_text),
    }
}

/// Recovers a human-readable message from an error body.
///
/// The body is probed for a JSON object with a top-level string `message`
/// field; anything else falls back to the raw text verbatim.
fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| body.to_string(), str::to_string),
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests;
