//! SDK error taxonomy.

use adapters::NodeError;
use logging::LoggingError;
use thiserror::Error;

/// Result alias for SDK operations
pub type SdkResult<T, E = SdkError> = Result<T, E>;

/// Errors returned by the SDK surface
#[derive(Debug, Error)]
pub enum SdkError {
    /// The phrase is not a valid BIP-39 English mnemonic
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// The seed cannot own a node
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    /// The node backend failed
    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    /// Reading or writing the SDK storage failed
    #[error("Persistence: {0}")]
    Persistence(String),

    /// The log stream could not be installed
    #[error("Log stream: {0}")]
    LogStream(#[from] LoggingError),

    /// The requested data is not available yet
    #[error("Not ready: {0}")]
    NotReady(String),

    /// The services were already disconnected
    #[error("Services are not connected")]
    NotConnected,

    /// Any failure without a more specific class
    #[error("Generic: {0}")]
    Generic(String),
}

impl From<bip39::Error> for SdkError {
    fn from(err: bip39::Error) -> Self { SdkError::InvalidMnemonic(err.to_string()) }
}

impl From<std::io::Error> for SdkError {
    fn from(err: std::io::Error) -> Self { SdkError::Persistence(err.to_string()) }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self { SdkError::Persistence(err.to_string()) }
}
