//! Node API Trait
//!
//! This module defines the [`NodeApi`] trait every node backend implements,
//! the [`NodeError`] taxonomy backends report, and the [`CredentialStore`]
//! through which backends persist the credentials they obtain.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use transport::TransportError;
use types::{GreenlightCredentials, NodeState};

/// Result alias for node operations
pub type NodeResult<T, E = NodeError> = Result<T, E>;

/// Errors reported by node backends
#[derive(Debug, Error)]
pub enum NodeError {
    /// Any failure without a more specific class
    #[error("Generic: {0}")]
    Generic(String),

    /// The scheduler or the node could not be reached
    #[error("Service connectivity: {0}")]
    ServiceConnectivity(String),

    /// Credentials are missing, unusable, or belong to another seed
    #[error("Credentials: {0}")]
    Credentials(String),

    /// The scheduler or the node answered with something unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The credential store failed
    #[error("Persistence: {0}")]
    Persistence(String),
}

impl From<TransportError> for NodeError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http(_) | TransportError::Timeout(_) => {
                NodeError::ServiceConnectivity(err.to_string())
            }
            TransportError::Serialization(_) | TransportError::InvalidFormat(_) => {
                NodeError::InvalidResponse(err.to_string())
            }
            TransportError::Rpc(_) | TransportError::Other(_) => NodeError::Generic(err.to_string()),
        }
    }
}

impl From<bitcoin::bip32::Error> for NodeError {
    fn from(err: bitcoin::bip32::Error) -> Self { NodeError::Generic(err.to_string()) }
}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self { NodeError::InvalidResponse(err.to_string()) }
}

/// Interface the SDK services use to drive a Lightning node.
///
/// Implementations must be shareable across tasks: the services call
/// [`NodeApi::pull_changed`] both from user requests and from the
/// background sync loop.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Public key of the node, hex encoded.
    fn node_id(&self) -> String;

    /// Makes the node reachable. Must be called before [`NodeApi::pull_changed`].
    async fn start(&self) -> NodeResult<()>;

    /// Fetches a fresh snapshot of the node state.
    async fn pull_changed(&self) -> NodeResult<NodeState>;

    /// Signs `message` with the node key.
    async fn sign_message(&self, message: &str) -> NodeResult<String>;

    /// Whether `signature` over `message` was made by `pubkey`.
    async fn check_message(&self, message: &str, pubkey: &str, signature: &str)
        -> NodeResult<bool>;

    /// Runs a read-only node command and returns its JSON output.
    async fn execute_command(&self, command: &str) -> NodeResult<String>;
}

/// Credentials as persisted by a [`CredentialStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Device credentials issued by the scheduler
    pub credentials: GreenlightCredentials,
    /// BIP-32 fingerprint of the seed the credentials were issued for
    pub seed_fingerprint: String,
}

/// Persistent slot for node credentials.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored credentials, if any.
    fn get_gl_credentials(&self) -> NodeResult<Option<StoredCredentials>>;

    /// Replaces the stored credentials.
    fn set_gl_credentials(&self, credentials: StoredCredentials) -> NodeResult<()>;
}
