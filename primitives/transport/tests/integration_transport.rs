//! Integration tests for the shared transport API.
//!
//! These exercise consumer usage patterns (dynamic dispatch, factories)
//! without requiring a running provider.

use std::sync::Arc;

use serde_json::{json, Value};
use transport::{DynTransport, Transport, TransportError, TransportFactory, TransportOptions};

struct DummyTransport {
    endpoint: String,
    headers: Vec<(String, String)>,
}

#[async_trait::async_trait]
impl Transport for DummyTransport {
    async fn send(&self, method: &str, params: &[Value]) -> Result<Value, TransportError> {
        match method {
            "fail" => Err(TransportError::Rpc("dummy error".to_string())),
            "echo" => Ok(json!({ "params": params, "headers": self.headers.len() })),
            _ => Ok(json!({"ok": true})),
        }
    }

    fn endpoint(&self) -> &str { &self.endpoint }
}

struct DummyFactory;

impl TransportFactory for DummyFactory {
    fn open(&self, endpoint: &str, options: TransportOptions) -> Result<DynTransport, TransportError> {
        Ok(Arc::new(DummyTransport { endpoint: endpoint.to_string(), headers: options.headers }))
    }
}

#[tokio::test]
async fn consumer_can_call_transport() {
    let t: DynTransport =
        Arc::new(DummyTransport { endpoint: "dummy://".to_string(), headers: vec![] });
    let v = t.send("ping", &[]).await.expect("ok");
    assert_eq!(v["ok"], true);
    assert_eq!(t.endpoint(), "dummy://");
}

#[tokio::test]
async fn consumer_sees_rpc_error() {
    let t = DummyTransport { endpoint: "dummy://".to_string(), headers: vec![] };
    let err = t.send("fail", &[]).await.expect_err("should err");
    match err {
        TransportError::Rpc(msg) => assert!(msg.contains("dummy")),
        _ => panic!("unexpected error variant"),
    }
}

#[tokio::test]
async fn factory_passes_options_to_transport() {
    let options = TransportOptions::default().header("x-device-cert", "00").header("x-device-key", "01");
    let t = DummyFactory.open("node://1", options).expect("open");
    assert_eq!(t.endpoint(), "node://1");

    let v = t.send("echo", &[json!("a"), json!(2)]).await.expect("echo");
    assert_eq!(v["params"], json!(["a", 2]));
    assert_eq!(v["headers"], 2);
}
