#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `lnsdk-http`: HTTP Transport Backend
//!
//! This crate provides a concrete HTTP-based implementation of the
//! [`transport::Transport`] trait, enabling JSON-RPC communication with the
//! node provider's scheduler and with scheduled nodes.
//!
//! ## Overview
//!
//! - Implements [`HttpTransport`], a thin wrapper over [`reqwest::Client`]
//! - Supports unauthenticated and header-authenticated calls
//! - Implements [`transport::TransportFactory`] through [`HttpTransportFactory`]
//!
//! ## Example
//! ```no_run
//! use lnsdk_http::HttpTransport;
//! use transport::Transport;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let transport = HttpTransport::new("https://scheduler.gl.blckstrm.com:2601");
//! let result = transport.send("get_challenge", &[]).await.unwrap();
//! println!("{:#?}", result);
//! # });
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use transport::{
    DynTransport, JsonRpcResponse, Transport, TransportError, TransportFactory, TransportOptions,
};

/// A concrete implementation of the [`Transport`] trait using HTTP.
///
/// Unlike higher-level clients, `HttpTransport` performs no schema
/// validation or result typing; it sends raw JSON-RPC requests and returns
/// the `result` field as a [`serde_json::Value`].
///
/// Errors encountered at any stage (HTTP, timeout, JSON parsing, or RPC)
/// are normalized into [`TransportError`] variants for uniform handling.
#[derive(Clone)]
pub struct HttpTransport {
    /// The underlying HTTP client used to perform requests.
    client: reqwest::Client,
    /// The full URL of the JSON-RPC endpoint.
    url: String,
    /// Request timeout the client was built with, if any.
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Constructs a new `HttpTransport` targeting the provided URL.
    ///
    /// This variant uses no authentication, no extra headers and no timeout.
    ///
    /// # Example
    /// ```
    /// use lnsdk_http::HttpTransport;
    /// use transport::Transport;
    ///
    /// let transport = HttpTransport::new("http://127.0.0.1:9835");
    /// assert_eq!(transport.endpoint(), "http://127.0.0.1:9835");
    /// ```
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into(), timeout: None }
    }

    /// Constructs a new `HttpTransport` applying the timeout and headers in `options`.
    ///
    /// # Errors
    /// Returns `TransportError::Other` if a header name or value is not
    /// valid HTTP, or the client cannot be built.
    pub fn with_options(
        url: impl Into<String>,
        options: &TransportOptions,
    ) -> Result<Self, TransportError> {
        let url = url.into();
        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::Other(format!("Invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::Other(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| TransportError::Other(e.to_string()))?;

        tracing::trace!(
            "initializing HTTP transport for {} ({} headers, timeout {:?})",
            url,
            options.headers.len(),
            options.timeout
        );
        Ok(Self { client, url, timeout: options.timeout })
    }

    fn map_send_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout.unwrap_or_default())
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    /// Sends a single JSON-RPC request and returns its `result` field as JSON.
    ///
    /// If the server response includes a non-null `"error"` field, that is
    /// treated as a [`TransportError::Rpc`].
    ///
    /// # Errors
    /// - [`TransportError::Http`] if the HTTP request fails or the status is not a success
    /// - [`TransportError::Timeout`] if the configured timeout elapses
    /// - [`TransportError::Serialization`] if body parsing fails
    /// - [`TransportError::Rpc`] if the RPC returns a non-null error object
    /// - [`TransportError::InvalidFormat`] if the response has no `result`
    async fn send(&self, method: &str, params: &[Value]) -> Result<Value, TransportError> {
        tracing::trace!("POST {} (method: {})", self.url, method);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": "lnsdk",
            "method": method,
            "params": params
        });

        let resp = self.client.post(&self.url).json(&body).send().await.map_err(|e| {
            tracing::error!("HTTP Transport - Request failed: {}", e);
            self.map_send_error(e)
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            tracing::error!("HTTP Transport - Failed to read body: {}", e);
            TransportError::Serialization(e.to_string())
        })?;

        let envelope: JsonRpcResponse = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TransportError::Http(format!("HTTP error: {}", status)));
            }
            Err(e) => {
                return Err(TransportError::Serialization(format!("{} (body: {})", e, text)));
            }
        };

        envelope.into_result()
    }

    /// Returns the configured JSON-RPC endpoint URL.
    fn endpoint(&self) -> &str { &self.url }
}

/// Opens [`HttpTransport`]s for endpoints discovered at runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransportFactory;

impl TransportFactory for HttpTransportFactory {
    fn open(
        &self,
        endpoint: &str,
        options: TransportOptions,
    ) -> Result<DynTransport, TransportError> {
        Ok(std::sync::Arc::new(HttpTransport::with_options(endpoint, &options)?))
    }
}
