use serde::{Deserialize, Serialize};

/// Message to sign with the node key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignMessageRequest {
    /// Text to sign
    pub message: String,
}

/// Signature over a [`SignMessageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignMessageResponse {
    /// zbase32-encoded recoverable signature
    pub signature: String,
}

/// Signed message to verify against a node public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckMessageRequest {
    /// Text that was signed
    pub message: String,
    /// Expected signer, hex compressed public key
    pub pubkey: String,
    /// zbase32-encoded recoverable signature
    pub signature: String,
}

/// Outcome of a [`CheckMessageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckMessageResponse {
    /// Whether `pubkey` signed `message`
    pub is_valid: bool,
}
