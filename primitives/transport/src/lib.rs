#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `lnsdk-transport`: Provider Communication Layer
//!
//! This crate defines the **transport abstraction** the SDK uses to reach
//! the node provider: the scheduler that registers, recovers and schedules
//! nodes, and the scheduled node itself.
//!
//! ## Core Concepts
//!
//! ### `Transport` Trait
//! Defines how a JSON-RPC call is sent (`send`), returning the deserialized
//! `result` as a [`serde_json::Value`] rather than a typed response. The
//! HTTP backend (`lnsdk-http`) implements it for real endpoints; tests
//! implement it in memory.
//!
//! ### `TransportError`
//! Enumerates the classes of errors encountered during communication, so
//! the node adapter can map them onto its own error taxonomy uniformly.
//!
//! ### `DynTransport`
//! A type-erased (`Arc<dyn Transport>`) wrapper for sharing one transport
//! between the scheduler client and background tasks.
//!
//! ### `TransportFactory`
//! Opens transports on demand. The node endpoint is only known after the
//! scheduler has scheduled the node, and node calls must carry the device
//! credentials, so adapters receive a factory instead of a fixed transport.
//!
//! ## Example
//! ```no_run
//! use transport::{DynTransport, TransportError};
//! use serde_json::json;
//!
//! async fn demo(transport: DynTransport) -> Result<(), TransportError> {
//!     let info = transport.send("getinfo", &[]).await?;
//!     println!("node id = {}", info["id"]);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type alias for structured error handling in transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Canonical error type for all transport implementations.
///
/// Each variant corresponds to a distinct communication or parsing
/// failure mode. Backend-specific details are flattened into strings, so
/// that higher layers can reason uniformly about network, serialization,
/// and RPC failures.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// An HTTP-level failure (connection refused or bad status code).
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Failure to serialize or deserialize a JSON payload.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The remote endpoint returned an explicit JSON-RPC error object.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The response did not conform to the expected JSON-RPC envelope format.
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// Any other error not covered by the specific variants above.
    #[error("Other error: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether the failure happened before the remote endpoint answered.
    ///
    /// Connectivity failures are worth reporting as "service unreachable";
    /// everything else means the endpoint answered with something unusable.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, TransportError::Http(_) | TransportError::Timeout(_))
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self { TransportError::Serialization(err.to_string()) }
}

/// The base transport trait for single-message delivery.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a single JSON-RPC call.
    ///
    /// The request is identified by its `method` name and an ordered list
    /// of parameters serialized as [`serde_json::Value`]s. Implementations
    /// return the value of the `"result"` field from the corresponding
    /// JSON-RPC response, or an appropriate [`TransportError`].
    async fn send(&self, method: &str, params: &[Value]) -> Result<Value>;

    /// Returns the configured endpoint or connection descriptor.
    ///
    /// For network transports, this is the URL. For in-memory transports,
    /// it may be a symbolic name.
    fn endpoint(&self) -> &str;
}

/// Type alias for a shared, dynamically dispatched transport instance.
///
/// ```
/// use transport::DynTransport;
///
/// fn use_transport(t: DynTransport) {
///     println!("Using endpoint: {}", t.endpoint());
/// }
/// ```
pub type DynTransport = Arc<dyn Transport>;

/// Request-level settings applied to every transport a factory opens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportOptions {
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Extra headers sent with every request, e.g. API keys or device credentials
    pub headers: Vec<(String, String)>,
}

impl TransportOptions {
    /// Options with the given timeout and no headers.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout: Some(timeout), headers: Vec::new() }
    }

    /// Adds a header to the options.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Opens transports to endpoints that are only known at runtime.
pub trait TransportFactory: Send + Sync {
    /// Open a transport to `endpoint` with the given options.
    fn open(&self, endpoint: &str, options: TransportOptions) -> Result<DynTransport>;
}

/// Minimal structure representing a JSON-RPC response envelope.
///
/// Fields correspond directly to those defined in the JSON-RPC 2.0 specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// The value returned by the RPC call, if successful.
    ///
    /// `None` only when the field is absent; `"result": null` is `Some(Value::Null)`.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub result: Option<Value>,
    /// The error object returned by the server, if any.
    #[serde(default)]
    pub error: Option<Value>,
    /// The unique identifier correlating request and response.
    #[serde(default)]
    pub id: Value,
}

fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcResponse {
    /// Converts the envelope into the call outcome.
    ///
    /// A non-null `error` wins over any `result`; a missing `result` is
    /// reported as [`TransportError::InvalidFormat`].
    pub fn into_result(self) -> Result<Value> {
        if let Some(error) = self.error.filter(|e| !e.is_null()) {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(TransportError::Rpc(message));
        }
        self.result.ok_or_else(|| TransportError::InvalidFormat("missing result field".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from() {
        let err = serde_json::from_str::<serde_json::Value>("not-json")
            .expect_err("Expected JSON parsing to fail");
        let terr: TransportError = err.into();

        match terr {
            TransportError::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("expected Serialization error variant"),
        }
    }

    #[test]
    fn test_into_result() {
        let ok: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": {"id": "02ab"}}))
                .expect("valid envelope");
        assert_eq!(ok.into_result().expect("result")["id"], "02ab");

        let failed: JsonRpcResponse = serde_json::from_value(
            json!({"id": 1, "result": null, "error": {"code": -32601, "message": "no such method"}}),
        )
        .expect("valid envelope");
        match failed.into_result() {
            Err(TransportError::Rpc(msg)) => assert_eq!(msg, "no such method"),
            other => panic!("expected Rpc error, got {:?}", other),
        }

        let null: JsonRpcResponse =
            serde_json::from_value(json!({"id": 1, "result": null})).expect("valid envelope");
        assert_eq!(null.into_result().expect("null result"), Value::Null);

        let empty: JsonRpcResponse =
            serde_json::from_value(json!({"id": 1})).expect("valid envelope");
        assert!(matches!(empty.into_result(), Err(TransportError::InvalidFormat(_))));
    }

    #[test]
    fn test_is_connectivity() {
        assert!(TransportError::Http("refused".into()).is_connectivity());
        assert!(TransportError::Timeout(Duration::from_secs(1)).is_connectivity());
        assert!(!TransportError::Rpc("bad".into()).is_connectivity());
    }

    #[test]
    fn test_options_builder() {
        let options = TransportOptions::with_timeout(Duration::from_secs(30))
            .header("x-api-key", "key");
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
        assert_eq!(options.headers, vec![("x-api-key".to_string(), "key".to_string())]);
    }
}
