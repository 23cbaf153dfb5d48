//! Node key derivation and challenge signing.
//!
//! The node key is the secp256k1 key at [`NODE_KEY_PATH`] below the seed's
//! BIP-32 master key. Its compressed public key is the node id the
//! scheduler knows the node by, and signatures with it prove ownership of
//! the node during registration and recovery.
//!
//! Messages are signed the way Lightning nodes sign them: a recoverable
//! signature over the double SHA-256 of [`SIGNED_MESSAGE_PREFIX`] followed by
//! the message, prefixed with `31 + recovery id` and zbase32-encoded.

use std::str::FromStr;

use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::hashes::{sha256, sha256d, Hash};
use bitcoin::hex::DisplayHex;
use bitcoin::secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use bitcoin::secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use types::Network;

use crate::node_api::{NodeError, NodeResult};

/// Derivation path of the node key below the master key.
pub const NODE_KEY_PATH: &str = "m/0'";
/// Prefix hashed in front of every signed message.
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"Lightning Signed Message:";

const RECOVERY_ID_OFFSET: u8 = 31;

/// Holds the node key derived from a seed.
pub struct NodeSigner {
    secp: Secp256k1<All>,
    node_key: SecretKey,
    node_id: PublicKey,
    seed_fingerprint: String,
}

impl NodeSigner {
    /// Derives the node key for `network` from `seed`.
    pub fn new(seed: &[u8], network: Network) -> NodeResult<Self> {
        if seed.len() < 32 {
            return Err(NodeError::Credentials(format!(
                "seed must be at least 32 bytes, got {}",
                seed.len()
            )));
        }

        let secp = Secp256k1::new();
        let master = Xpriv::new_master(bitcoin::Network::from(network), seed)?;
        let path = DerivationPath::from_str(NODE_KEY_PATH)?;
        let node_key = master.derive_priv(&secp, &path)?.private_key;
        let node_id = PublicKey::from_secret_key(&secp, &node_key);
        let seed_fingerprint = master.fingerprint(&secp).to_string();

        Ok(Self { secp, node_key, node_id, seed_fingerprint })
    }

    /// Compressed node public key, hex.
    pub fn node_id(&self) -> String { self.node_id.to_string() }

    /// Fingerprint of the seed's master key, hex.
    pub fn seed_fingerprint(&self) -> &str { &self.seed_fingerprint }

    /// Signs a scheduler challenge: ECDSA over SHA-256 of the challenge, compact encoding, hex.
    pub fn sign_challenge(&self, challenge: &[u8]) -> String {
        let digest = sha256::Hash::hash(challenge);
        let message = Message::from_digest(digest.to_byte_array());
        let signature = self.secp.sign_ecdsa(&message, &self.node_key);
        signature.serialize_compact().as_slice().to_lower_hex_string()
    }

    /// Signs `message` with the node key, zbase32.
    pub fn sign_message(&self, message: &[u8]) -> String {
        let signature = self.secp.sign_ecdsa_recoverable(&message_digest(message), &self.node_key);
        let (recovery_id, compact) = signature.serialize_compact();
        let mut bytes = Vec::with_capacity(65);
        bytes.push(RECOVERY_ID_OFFSET + recovery_id.to_i32() as u8);
        bytes.extend_from_slice(&compact);
        zbase32::encode_full_bytes(&bytes)
    }
}

fn message_digest(message: &[u8]) -> Message {
    let mut data = SIGNED_MESSAGE_PREFIX.to_vec();
    data.extend_from_slice(message);
    Message::from_digest(sha256d::Hash::hash(&data).to_byte_array())
}

/// Whether `signature` over `message` was made by the key of `pubkey`.
///
/// Malformed signatures are reported as invalid.
pub fn verify_message(message: &[u8], signature: &str, pubkey: &PublicKey) -> bool {
    let Ok(bytes) = zbase32::decode_full_bytes_str(signature) else {
        return false;
    };
    let Some((&header, compact)) = bytes.split_first() else {
        return false;
    };
    if compact.len() != 64 || header < RECOVERY_ID_OFFSET {
        return false;
    }
    let Ok(recovery_id) = RecoveryId::from_i32(i32::from(header - RECOVERY_ID_OFFSET)) else {
        return false;
    };
    let Ok(signature) = RecoverableSignature::from_compact(compact, recovery_id) else {
        return false;
    };

    Secp256k1::verification_only()
        .recover_ecdsa(&message_digest(message), &signature)
        .map_or(false, |recovered| recovered == *pubkey)
}
