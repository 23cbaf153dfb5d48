//! Scheduler client
//!
//! The scheduler is the provider endpoint that registers new nodes, hands
//! out device credentials for existing ones, and schedules a node onto a
//! host so it can be reached. Registration and recovery are authorized by
//! signing a one-time challenge with the node key.

use bitcoin::hex::{DisplayHex, FromHex};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use transport::DynTransport;
use types::{GreenlightCredentials, GreenlightNodeConfig, Network};

use super::signer::NodeSigner;
use crate::node_api::{NodeError, NodeResult};

/// What a challenge is going to authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeScope {
    /// Registration of a new node
    Register,
    /// Recovery of credentials for an existing node
    Recover,
}

impl ChallengeScope {
    fn as_str(&self) -> &'static str {
        match self {
            ChallengeScope::Register => "register",
            ChallengeScope::Recover => "recover",
        }
    }
}

#[derive(Deserialize)]
struct ChallengeResponse {
    challenge: String,
}

#[derive(Deserialize)]
struct CredentialsResponse {
    device_cert: String,
    device_key: String,
}

impl From<CredentialsResponse> for GreenlightCredentials {
    fn from(r: CredentialsResponse) -> Self {
        GreenlightCredentials {
            device_key: r.device_key.into_bytes(),
            device_cert: r.device_cert.into_bytes(),
        }
    }
}

#[derive(Deserialize)]
struct ScheduleResponse {
    node_uri: String,
}

/// JSON-RPC client of the provider's scheduler.
pub struct Scheduler {
    transport: DynTransport,
    network: Network,
}

impl Scheduler {
    /// Create a scheduler client over `transport` for nodes on `network`.
    pub fn new(transport: DynTransport, network: Network) -> Self { Self { transport, network } }

    /// Endpoint of the underlying transport.
    pub fn endpoint(&self) -> &str { self.transport.endpoint() }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> NodeResult<T> {
        let result = self.transport.send(method, &[params]).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Requests a one-time challenge for `node_id`.
    pub async fn get_challenge(&self, node_id: &str, scope: ChallengeScope) -> NodeResult<Vec<u8>> {
        let response: ChallengeResponse = self
            .call("get_challenge", json!({ "node_id": node_id, "scope": scope.as_str() }))
            .await?;
        Vec::<u8>::from_hex(&response.challenge)
            .map_err(|e| NodeError::InvalidResponse(format!("challenge is not hex: {}", e)))
    }

    /// Registers the node owned by `signer`.
    ///
    /// Registration needs exactly one of partner credentials and an invite
    /// code; otherwise the scheduler is not contacted.
    pub async fn register(
        &self,
        signer: &NodeSigner,
        config: &GreenlightNodeConfig,
    ) -> NodeResult<GreenlightCredentials> {
        match (&config.partner_credentials, &config.invite_code) {
            (None, None) => {
                return Err(NodeError::Credentials(
                    "registering a new node requires partner credentials or an invite code"
                        .to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(NodeError::Credentials(
                    "cannot specify both invite code and partner credentials".to_string(),
                ))
            }
            _ => {}
        }

        let node_id = signer.node_id();
        let challenge = self.get_challenge(&node_id, ChallengeScope::Register).await?;
        let mut params = json!({
            "node_id": node_id,
            "network": self.network.as_str(),
            "challenge": challenge.as_slice().to_lower_hex_string(),
            "signature": signer.sign_challenge(&challenge),
        });
        if let Some(invite_code) = &config.invite_code {
            params["invite_code"] = json!(invite_code);
        }
        if let Some(partner) = &config.partner_credentials {
            params["partner_cert"] = json!(String::from_utf8_lossy(&partner.device_cert));
            params["partner_key"] = json!(String::from_utf8_lossy(&partner.device_key));
        }

        tracing::info!("registering node {} on {}", node_id, self.network);
        let response: CredentialsResponse = self.call("register", params).await?;
        Ok(response.into())
    }

    /// Recovers device credentials for the node owned by `signer`.
    pub async fn recover(&self, signer: &NodeSigner) -> NodeResult<GreenlightCredentials> {
        let node_id = signer.node_id();
        let challenge = self.get_challenge(&node_id, ChallengeScope::Recover).await?;
        let params = json!({
            "node_id": node_id,
            "network": self.network.as_str(),
            "challenge": challenge.as_slice().to_lower_hex_string(),
            "signature": signer.sign_challenge(&challenge),
        });

        tracing::info!("recovering node {} on {}", node_id, self.network);
        let response: CredentialsResponse = self.call("recover", params).await?;
        Ok(response.into())
    }

    /// Schedules the node and returns the URI it can be reached at.
    pub async fn schedule(&self, node_id: &str) -> NodeResult<String> {
        let response: ScheduleResponse = self.call("schedule", json!({ "node_id": node_id })).await?;
        if response.node_uri.is_empty() {
            return Err(NodeError::InvalidResponse("scheduler returned an empty node uri".to_string()));
        }
        tracing::debug!("node {} scheduled at {}", node_id, response.node_uri);
        Ok(response.node_uri)
    }
}
