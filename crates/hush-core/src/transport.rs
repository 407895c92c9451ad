use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method};
use serde::Serialize;
use serde_json::Value;

use crate::error::{GatewayError, Result};

/// Number of characters of an unrecognized body echoed back in error details
pub const BODY_PREFIX_CHARS: usize = 300;

/// Request handed to a [`Transport`]
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl OutboundRequest {
    pub fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Serialize `body` as the JSON request payload
    ///
    /// # Errors
    ///
    /// Returns an internal error if serialization fails
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| GatewayError::internal(format!("failed to serialize request body: {e}")))?;

        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Some(Bytes::from(bytes));
        Ok(self)
    }

    /// Parsed JSON body, used by test transports to inspect what was sent
    pub fn json_body(&self) -> Option<Value> {
        self.body.as_deref().and_then(|body| serde_json::from_slice(body).ok())
    }
}

/// Raw upstream answer before any interpretation
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Value of the `Content-Type` header, empty when absent
    pub content_type: String,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Whether the declared content type is JSON
    pub fn is_json(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("application/json")
    }

    /// The body as text, cut to [`BODY_PREFIX_CHARS`] characters
    pub fn body_prefix(&self) -> String {
        String::from_utf8_lossy(&self.body).chars().take(BODY_PREFIX_CHARS).collect()
    }

    /// Body parsed as JSON, falling back to the text prefix
    ///
    /// Used to carry upstream error bodies verbatim whatever their format.
    pub fn detail(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|_| Value::String(self.body_prefix()))
    }
}

/// HTTP abstraction between provider logic and the network
///
/// Non-success statuses are not errors at this level; only failures that
/// prevent a response from arriving are.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse>;
}

/// [`Transport`] backed by a pooled `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the client with a per-request deadline
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(5)))
            .tcp_nodelay(true)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse> {
        let OutboundRequest {
            method,
            url,
            headers,
            body,
        } = request;

        tracing::debug!(%method, %url, "sending upstream request");

        let mut builder = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "upstream request failed");
            let reason = if e.is_timeout() { "timed out" } else { "failed" };
            GatewayError::transport(format!("request to {url} {reason}: {e}"))
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        let body = response.bytes().await.map_err(|e| {
            tracing::error!(%url, error = %e, "failed to read upstream body");
            GatewayError::transport(format!("failed to read response from {url}: {e}")).with_status(status)
        })?;

        tracing::debug!(%url, status, content_type = %content_type, size = body.len(), "upstream responded");

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
