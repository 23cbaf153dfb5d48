//! Greenlight Node Adapter
//!
//! [`Greenlight`] drives a node hosted by the Greenlight provider. Connecting
//! resolves device credentials in this order:
//!
//! 1. credentials found in the [`CredentialStore`], if they were issued for
//!    the same seed,
//! 2. credentials recovered from the scheduler by proving ownership of the
//!    node key; an unreachable scheduler fails the connect here,
//! 3. credentials from registering a new node with the configured partner
//!    credentials or invite code.
//!
//! The resolved credentials are persisted. Node calls are then made over a
//! transport to the URI the scheduler assigns, authenticated with the
//! device credentials.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bitcoin::hex::DisplayHex;
use bitcoin::secp256k1::PublicKey;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use transport::{DynTransport, TransportFactory, TransportOptions};
use types::{Config, GreenlightCredentials, NodeConfig, NodeState};

use crate::node_api::{CredentialStore, NodeApi, NodeError, NodeResult, StoredCredentials};

pub mod command;
pub mod node_state;
pub mod scheduler;
pub mod signer;

pub use command::NodeCommand;
pub use scheduler::{ChallengeScope, Scheduler};
pub use signer::{verify_message, NodeSigner};

/// Header carrying the API key on scheduler calls.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the hex device certificate on node calls.
pub const DEVICE_CERT_HEADER: &str = "x-device-cert";
/// Header carrying the hex device key on node calls.
pub const DEVICE_KEY_HEADER: &str = "x-device-key";

/// A Greenlight-hosted node.
pub struct Greenlight {
    config: Config,
    signer: NodeSigner,
    credentials: GreenlightCredentials,
    scheduler: Scheduler,
    factory: Arc<dyn TransportFactory>,
    node_transport: Mutex<Option<DynTransport>>,
}

impl Greenlight {
    /// Connects to the node owned by `seed`, registering it if needed.
    pub async fn connect(
        config: Config,
        seed: &[u8],
        store: Arc<dyn CredentialStore>,
        factory: Arc<dyn TransportFactory>,
    ) -> NodeResult<Self> {
        let signer = NodeSigner::new(seed, config.network)?;
        let scheduler_transport = factory.open(&config.scheduler_url, scheduler_options(&config))?;
        let scheduler = Scheduler::new(scheduler_transport, config.network);

        let NodeConfig::Greenlight { config: register_config } = &config.node_config;

        let credentials = match store.get_gl_credentials()? {
            Some(stored) => {
                if stored.seed_fingerprint != signer.seed_fingerprint() {
                    return Err(NodeError::Credentials(
                        "stored credentials belong to another seed, seed doesn't match existing node"
                            .to_string(),
                    ));
                }
                tracing::info!("Initializing greenlight from existing credentials");
                stored.credentials
            }
            None => {
                tracing::info!(
                    "No credentials found, trying to recover existing node from {}",
                    scheduler.endpoint()
                );
                match scheduler.recover(&signer).await {
                    Ok(credentials) => credentials,
                    Err(e @ NodeError::ServiceConnectivity(_)) => return Err(e),
                    Err(e) => {
                        tracing::info!("Failed to recover node ({}), registering new one", e);
                        scheduler.register(&signer, register_config).await?
                    }
                }
            }
        };

        store.set_gl_credentials(StoredCredentials {
            credentials: credentials.clone(),
            seed_fingerprint: signer.seed_fingerprint().to_string(),
        })?;

        Ok(Greenlight {
            config,
            signer,
            credentials,
            scheduler,
            factory,
            node_transport: Mutex::new(None),
        })
    }

    /// Device credentials the adapter authenticates node calls with.
    pub fn credentials(&self) -> &GreenlightCredentials { &self.credentials }

    fn node_options(&self) -> TransportOptions {
        let cert = self.credentials.device_cert.as_slice().to_lower_hex_string();
        let key = self.credentials.device_key.as_slice().to_lower_hex_string();
        TransportOptions::with_timeout(Duration::from_secs(self.config.request_timeout_sec))
            .header(DEVICE_CERT_HEADER, cert)
            .header(DEVICE_KEY_HEADER, key)
    }

    async fn node_transport(&self) -> NodeResult<DynTransport> {
        self.node_transport.lock().await.clone().ok_or_else(|| {
            NodeError::ServiceConnectivity("node is not started, call start() first".to_string())
        })
    }

    async fn node_call<T: DeserializeOwned>(
        &self,
        transport: &DynTransport,
        method: &str,
    ) -> NodeResult<T> {
        let value = transport.send(method, &[]).await?;
        serde_json::from_value(value)
            .map_err(|e| NodeError::InvalidResponse(format!("{}: {}", method, e)))
    }
}

fn scheduler_options(config: &Config) -> TransportOptions {
    let options = TransportOptions::with_timeout(Duration::from_secs(config.request_timeout_sec));
    match &config.api_key {
        Some(key) => options.header(API_KEY_HEADER, key.clone()),
        None => options,
    }
}

#[async_trait]
impl NodeApi for Greenlight {
    fn node_id(&self) -> String { self.signer.node_id() }

    async fn start(&self) -> NodeResult<()> {
        let node_id = self.signer.node_id();
        let node_uri = self.scheduler.schedule(&node_id).await?;
        let transport = self.factory.open(&node_uri, self.node_options())?;
        *self.node_transport.lock().await = Some(transport);
        tracing::info!("node {} started at {}", node_id, node_uri);
        Ok(())
    }

    async fn pull_changed(&self) -> NodeResult<NodeState> {
        let transport = self.node_transport().await?;
        tracing::debug!("pulling node state from {}", transport.endpoint());

        let (info, funds, peers, channels) = tokio::join!(
            self.node_call::<node_state::GetinfoResponse>(&transport, "getinfo"),
            self.node_call::<node_state::ListfundsResponse>(&transport, "listfunds"),
            self.node_call::<node_state::ListpeersResponse>(&transport, "listpeers"),
            self.node_call::<node_state::ListpeerchannelsResponse>(&transport, "listpeerchannels"),
        );
        let info = info?;
        if info.id != self.signer.node_id() {
            return Err(NodeError::Credentials(format!(
                "scheduled node reports id {}, expected {}",
                info.id,
                self.signer.node_id()
            )));
        }

        Ok(node_state::build_node_state(info, funds?, peers?, channels?))
    }

    async fn sign_message(&self, message: &str) -> NodeResult<String> {
        Ok(self.signer.sign_message(message.as_bytes()))
    }

    async fn check_message(
        &self,
        message: &str,
        pubkey: &str,
        signature: &str,
    ) -> NodeResult<bool> {
        let pubkey = PublicKey::from_str(pubkey)
            .map_err(|e| NodeError::Generic(format!("invalid public key {}: {}", pubkey, e)))?;
        Ok(verify_message(message.as_bytes(), signature, &pubkey))
    }

    async fn execute_command(&self, command: &str) -> NodeResult<String> {
        let command = NodeCommand::from_str(command).map_err(NodeError::Generic)?;
        let transport = self.node_transport().await?;
        tracing::debug!("executing {} on {}", command, transport.endpoint());
        let output = transport.send(command.as_str(), &[]).await?;
        Ok(serde_json::to_string_pretty(&output)?)
    }
}
