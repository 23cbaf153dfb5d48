//! Greenlight adapter tests against an in-memory scheduler and node.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bitcoin::hashes::{sha256, Hash};
use bitcoin::hex::FromHex;
use bitcoin::secp256k1::ecdsa::Signature;
use bitcoin::secp256k1::{Message, PublicKey, Secp256k1};
use lnsdk_adapters::greenlight::{verify_message, API_KEY_HEADER, DEVICE_CERT_HEADER};
use lnsdk_adapters::{
    CredentialStore, Greenlight, NodeApi, NodeError, NodeResult, StoredCredentials,
};
use serde_json::{json, Value};
use transport::{DynTransport, Transport, TransportError, TransportFactory, TransportOptions};
use types::{
    Config, EnvironmentType, GreenlightCredentials, GreenlightNodeConfig, Network, NodeConfig,
};

const SCHEDULER_URL: &str = "https://scheduler.test";
const NODE_URL_PREFIX: &str = "https://node.test/";
const CHALLENGE: &str = "0102030405060708";

#[derive(Default)]
struct SchedulerState {
    nodes: HashMap<String, GreenlightCredentials>,
    calls: Vec<String>,
    headers: Vec<(String, String)>,
    node_headers: Vec<(String, String)>,
}

type Shared = Arc<Mutex<SchedulerState>>;

fn verify(params: &Value) -> Result<String, TransportError> {
    let node_id = params["node_id"].as_str().unwrap_or_default().to_string();
    let challenge = Vec::<u8>::from_hex(params["challenge"].as_str().unwrap_or_default())
        .map_err(|e| TransportError::Rpc(e.to_string()))?;
    let signature = Vec::<u8>::from_hex(params["signature"].as_str().unwrap_or_default())
        .map_err(|e| TransportError::Rpc(e.to_string()))?;
    let signature =
        Signature::from_compact(&signature).map_err(|e| TransportError::Rpc(e.to_string()))?;
    let message = Message::from_digest(sha256::Hash::hash(&challenge).to_byte_array());
    let key = PublicKey::from_str(&node_id).map_err(|e| TransportError::Rpc(e.to_string()))?;
    Secp256k1::verification_only()
        .verify_ecdsa(&message, &signature, &key)
        .map_err(|_| TransportError::Rpc("bad signature".to_string()))?;
    Ok(node_id)
}

fn issue(node_id: &str) -> GreenlightCredentials {
    GreenlightCredentials {
        device_key: format!("key-{}", node_id).into_bytes(),
        device_cert: format!("cert-{}", node_id).into_bytes(),
    }
}

struct FakeScheduler {
    state: Shared,
}

#[async_trait]
impl Transport for FakeScheduler {
    async fn send(&self, method: &str, params: &[Value]) -> transport::Result<Value> {
        let params = params.first().cloned().unwrap_or(Value::Null);
        let mut state = self.state.lock().expect("scheduler state");
        state.calls.push(method.to_string());
        match method {
            "get_challenge" => Ok(json!({ "challenge": CHALLENGE })),
            "recover" => {
                let node_id = verify(&params)?;
                let creds = state
                    .nodes
                    .get(&node_id)
                    .cloned()
                    .ok_or_else(|| TransportError::Rpc("node not found".to_string()))?;
                Ok(json!({
                    "device_cert": String::from_utf8_lossy(&creds.device_cert),
                    "device_key": String::from_utf8_lossy(&creds.device_key),
                }))
            }
            "register" => {
                let node_id = verify(&params)?;
                if params["invite_code"].is_null() && params["partner_cert"].is_null() {
                    return Err(TransportError::Rpc("missing invite".to_string()));
                }
                let creds = issue(&node_id);
                state.nodes.insert(node_id, creds.clone());
                Ok(json!({
                    "device_cert": String::from_utf8_lossy(&creds.device_cert),
                    "device_key": String::from_utf8_lossy(&creds.device_key),
                }))
            }
            "schedule" => {
                let node_id = params["node_id"].as_str().unwrap_or_default();
                Ok(json!({ "node_uri": format!("{}{}", NODE_URL_PREFIX, node_id) }))
            }
            other => Err(TransportError::Rpc(format!("unknown method {}", other))),
        }
    }

    fn endpoint(&self) -> &str { SCHEDULER_URL }
}

struct FakeNode {
    uri: String,
    node_id: String,
}

#[async_trait]
impl Transport for FakeNode {
    async fn send(&self, method: &str, _params: &[Value]) -> transport::Result<Value> {
        match method {
            "getinfo" => Ok(json!({ "id": self.node_id, "blockheight": 840_000 })),
            "listfunds" => Ok(json!({
                "outputs": [{"txid": "aa", "output": 0, "amount_msat": 10_000, "status": "confirmed"}]
            })),
            "listpeers" => Ok(json!({
                "peers": [{"id": "03lsp", "connected": true}, {"id": "03gossip", "connected": true}]
            })),
            "listpeerchannels" => Ok(json!({
                "channels": [{"peer_id": "03lsp", "peer_connected": true, "state": "CHANNELD_NORMAL",
                              "to_us_msat": 2_000, "spendable_msat": 1_500, "receivable_msat": 8_000}]
            })),
            other => Err(TransportError::Rpc(format!("unknown method {}", other))),
        }
    }

    fn endpoint(&self) -> &str { &self.uri }
}

struct FakeFactory {
    state: Shared,
}

impl TransportFactory for FakeFactory {
    fn open(&self, endpoint: &str, options: TransportOptions) -> transport::Result<DynTransport> {
        let mut state = self.state.lock().expect("scheduler state");
        if endpoint == SCHEDULER_URL {
            state.headers = options.headers;
            return Ok(Arc::new(FakeScheduler { state: self.state.clone() }));
        }
        match endpoint.strip_prefix(NODE_URL_PREFIX) {
            Some(node_id) => {
                state.node_headers = options.headers;
                Ok(Arc::new(FakeNode { uri: endpoint.to_string(), node_id: node_id.to_string() }))
            }
            None => Err(TransportError::Http(format!("unreachable {}", endpoint))),
        }
    }
}

#[derive(Default)]
struct MemoryStore {
    slot: Mutex<Option<StoredCredentials>>,
}

impl CredentialStore for MemoryStore {
    fn get_gl_credentials(&self) -> NodeResult<Option<StoredCredentials>> {
        Ok(self.slot.lock().expect("store").clone())
    }

    fn set_gl_credentials(&self, credentials: StoredCredentials) -> NodeResult<()> {
        *self.slot.lock().expect("store") = Some(credentials);
        Ok(())
    }
}

fn config(invite_code: Option<&str>) -> Config {
    Config {
        environment: EnvironmentType::Staging,
        scheduler_url: SCHEDULER_URL.to_string(),
        working_dir: ".".to_string(),
        network: Network::Bitcoin,
        api_key: Some("test-key".to_string()),
        request_timeout_sec: 5,
        sync_interval_sec: 60,
        node_config: NodeConfig::Greenlight {
            config: GreenlightNodeConfig {
                partner_credentials: None,
                invite_code: invite_code.map(str::to_string),
            },
        },
    }
}

fn setup() -> (Shared, Arc<FakeFactory>, Arc<MemoryStore>) {
    let state = Shared::default();
    let factory = Arc::new(FakeFactory { state: state.clone() });
    (state, factory, Arc::new(MemoryStore::default()))
}

#[tokio::test]
async fn test_connect_registers_new_node() {
    let (state, factory, store) = setup();
    let seed = [3u8; 64];

    let node = Greenlight::connect(config(Some("invite")), &seed, store.clone(), factory)
        .await
        .expect("connect registers");

    let state = state.lock().expect("state");
    assert!(state.calls.contains(&"recover".to_string()));
    assert!(state.calls.contains(&"register".to_string()));
    assert!(state.nodes.contains_key(&node.node_id()));
    assert!(state.headers.contains(&(API_KEY_HEADER.to_string(), "test-key".to_string())));

    let stored = store.get_gl_credentials().expect("store").expect("credentials persisted");
    assert_eq!(&stored.credentials, node.credentials());
}

#[tokio::test]
async fn test_connect_recovers_existing_node() {
    let (state, factory, store) = setup();
    let seed = [4u8; 64];
    let other_store = Arc::new(MemoryStore::default());
    let first = Greenlight::connect(config(Some("invite")), &seed, other_store, factory.clone())
        .await
        .expect("first connect");
    state.lock().expect("state").calls.clear();

    let second = Greenlight::connect(config(None), &seed, store, factory)
        .await
        .expect("recover without invite");

    assert_eq!(first.node_id(), second.node_id());
    assert_eq!(first.credentials(), second.credentials());
    let calls = state.lock().expect("state").calls.clone();
    assert!(calls.contains(&"recover".to_string()));
    assert!(!calls.contains(&"register".to_string()));
}

#[tokio::test]
async fn test_connect_uses_stored_credentials() {
    let (state, factory, store) = setup();
    let seed = [5u8; 64];
    Greenlight::connect(config(Some("invite")), &seed, store.clone(), factory.clone())
        .await
        .expect("first connect");
    state.lock().expect("state").calls.clear();

    Greenlight::connect(config(None), &seed, store, factory).await.expect("stored connect");

    assert!(state.lock().expect("state").calls.is_empty());
}

#[tokio::test]
async fn test_connect_rejects_other_seed() {
    let (_state, factory, store) = setup();
    Greenlight::connect(config(Some("invite")), &[6u8; 64], store.clone(), factory.clone())
        .await
        .expect("first connect");

    let result = Greenlight::connect(config(Some("invite")), &[7u8; 64], store, factory).await;
    assert!(matches!(result, Err(NodeError::Credentials(_))));
}

#[tokio::test]
async fn test_register_requires_invite_or_partner() {
    let (state, factory, store) = setup();

    let result = Greenlight::connect(config(None), &[8u8; 64], store.clone(), factory).await;

    assert!(matches!(result, Err(NodeError::Credentials(_))));
    assert!(!state.lock().expect("state").calls.contains(&"register".to_string()));
    assert!(store.get_gl_credentials().expect("store").is_none());
}

#[tokio::test]
async fn test_pull_changed_requires_start() {
    let (_state, factory, store) = setup();
    let node = Greenlight::connect(config(Some("invite")), &[9u8; 64], store, factory)
        .await
        .expect("connect");

    let result = node.pull_changed().await;
    assert!(matches!(result, Err(NodeError::ServiceConnectivity(_))));
}

#[tokio::test]
async fn test_start_and_pull_changed() {
    let (state, factory, store) = setup();
    let node = Greenlight::connect(config(Some("invite")), &[10u8; 64], store, factory)
        .await
        .expect("connect");

    node.start().await.expect("start");
    let node_state = node.pull_changed().await.expect("pull changed");

    assert_eq!(node_state.id, node.node_id());
    assert_eq!(node_state.block_height, 840_000);
    assert_eq!(node_state.channels_balance_msat, 1_500);
    assert_eq!(node_state.onchain_balance_msat, 10_000);
    assert_eq!(node_state.connected_peers, vec!["03lsp".to_string(), "03gossip".to_string()]);

    let headers = state.lock().expect("state").node_headers.clone();
    assert!(headers.iter().any(|(name, _)| name == DEVICE_CERT_HEADER));
}

fn partner_credentials() -> GreenlightCredentials {
    GreenlightCredentials {
        device_key: b"PARTNER KEY".to_vec(),
        device_cert: b"PARTNER CERT".to_vec(),
    }
}

#[tokio::test]
async fn test_register_with_partner_credentials() {
    let (state, factory, store) = setup();
    let mut config = config(None);
    config.node_config = NodeConfig::Greenlight {
        config: GreenlightNodeConfig {
            partner_credentials: Some(partner_credentials()),
            invite_code: None,
        },
    };

    let node = Greenlight::connect(config, &[11u8; 64], store, factory).await.expect("connect");
    assert!(state.lock().expect("state").nodes.contains_key(&node.node_id()));
}

#[tokio::test]
async fn test_register_rejects_invite_with_partner_credentials() {
    let (state, factory, store) = setup();
    let mut config = config(Some("invite"));
    config.node_config = NodeConfig::Greenlight {
        config: GreenlightNodeConfig {
            partner_credentials: Some(partner_credentials()),
            invite_code: Some("invite".to_string()),
        },
    };

    let result = Greenlight::connect(config, &[12u8; 64], store.clone(), factory).await;

    match result {
        Err(NodeError::Credentials(msg)) => assert!(msg.contains("both")),
        Err(other) => panic!("expected Credentials error, got {:?}", other),
        Ok(_) => panic!("registration with both invite code and partner credentials succeeded"),
    }
    assert!(!state.lock().expect("state").calls.contains(&"register".to_string()));
    assert!(store.get_gl_credentials().expect("store").is_none());
}

struct Unreachable;

#[async_trait]
impl Transport for Unreachable {
    async fn send(&self, _method: &str, _params: &[Value]) -> transport::Result<Value> {
        Err(TransportError::Http("connection refused".to_string()))
    }

    fn endpoint(&self) -> &str { SCHEDULER_URL }
}

struct UnreachableFactory;

impl TransportFactory for UnreachableFactory {
    fn open(&self, _endpoint: &str, _options: TransportOptions) -> transport::Result<DynTransport> {
        Ok(Arc::new(Unreachable))
    }
}

#[tokio::test]
async fn test_unreachable_scheduler_is_connectivity_error() {
    let store = Arc::new(MemoryStore::default());

    let factory = Arc::new(UnreachableFactory);
    let result = Greenlight::connect(config(None), &[13u8; 64], store, factory).await;

    match result {
        Err(NodeError::ServiceConnectivity(msg)) => assert!(msg.contains("connection refused")),
        Err(other) => panic!("expected ServiceConnectivity, got {:?}", other),
        Ok(_) => panic!("connect to an unreachable scheduler succeeded"),
    }
}

#[tokio::test]
async fn test_sign_and_check_message() {
    let (_state, factory, store) = setup();
    let node = Greenlight::connect(config(Some("invite")), &[14u8; 64], store, factory)
        .await
        .expect("connect");

    let signature = node.sign_message("proof of node").await.expect("sign");
    let node_key = PublicKey::from_str(&node.node_id()).expect("node id");
    assert!(verify_message(b"proof of node", &signature, &node_key));

    assert!(node.check_message("proof of node", &node.node_id(), &signature).await.expect("check"));
    assert!(!node.check_message("other text", &node.node_id(), &signature).await.expect("check"));
    let result = node.check_message("proof of node", "not-a-key", &signature).await;
    assert!(matches!(result, Err(NodeError::Generic(_))));
}

#[tokio::test]
async fn test_execute_command() {
    let (_state, factory, store) = setup();
    let node = Greenlight::connect(config(Some("invite")), &[15u8; 64], store, factory)
        .await
        .expect("connect");

    let before_start = node.execute_command("getinfo").await;
    assert!(matches!(before_start, Err(NodeError::ServiceConnectivity(_))));

    node.start().await.expect("start");
    let output = node.execute_command("listfunds").await.expect("listfunds");
    let parsed: Value = serde_json::from_str(&output).expect("json output");
    assert_eq!(parsed["outputs"][0]["txid"], "aa");

    match node.execute_command("stop").await {
        Err(NodeError::Generic(msg)) => assert_eq!(msg, "command not found: stop"),
        other => panic!("expected Generic error, got {:?}", other),
    }
}
