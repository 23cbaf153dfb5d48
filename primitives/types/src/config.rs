use serde::{Deserialize, Serialize};

use crate::environment::{EnvironmentType, Network};

/// Device credentials issued by the node provider's scheduler.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreenlightCredentials {
    /// PEM-encoded device private key
    pub device_key: Vec<u8>,
    /// PEM-encoded device certificate
    pub device_cert: Vec<u8>,
}

impl std::fmt::Debug for GreenlightCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreenlightCredentials")
            .field("device_key", &"<redacted>")
            .field("device_cert", &format!("{} bytes", self.device_cert.len()))
            .finish()
    }
}

/// Registration settings for a Greenlight-hosted node.
///
/// A new node is registered either with partner credentials or with an
/// invite code, never both; existing nodes need neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GreenlightNodeConfig {
    /// Partner device credentials used to register new nodes
    pub partner_credentials: Option<GreenlightCredentials>,
    /// Invite code used to register new nodes
    pub invite_code: Option<String>,
}

/// Node backend selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeConfig {
    /// A node hosted by Greenlight
    Greenlight {
        /// Registration settings
        config: GreenlightNodeConfig,
    },
}

/// SDK configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Provider deployment this configuration was built for
    pub environment: EnvironmentType,
    /// JSON-RPC endpoint of the provider's scheduler
    pub scheduler_url: String,
    /// Directory holding the SDK's persistent state
    pub working_dir: String,
    /// Chain the node runs on
    pub network: Network,
    /// API key sent to the scheduler, if any
    pub api_key: Option<String>,
    /// Timeout applied to every scheduler and node request
    pub request_timeout_sec: u64,
    /// Interval of the background sync loop
    pub sync_interval_sec: u64,
    /// Node backend selector with credentials
    pub node_config: NodeConfig,
}

/// Arguments of a connect call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// SDK configuration
    pub config: Config,
    /// Seed derived from the user's mnemonic
    pub seed: Vec<u8>,
}
