use serde::{Deserialize, Serialize};

/// An on-chain output owned by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentTransactionOutput {
    /// Funding transaction id, hex
    pub txid: String,
    /// Output index
    pub outnum: u32,
    /// Output value
    pub amount_millisatoshi: u64,
    /// Receiving address
    pub address: String,
    /// Whether the output is reserved by a pending transaction
    pub reserved: bool,
}

/// Snapshot of the node's identity, balances and liquidity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NodeState {
    /// Node public key, hex
    pub id: String,
    /// Chain height the node has processed
    pub block_height: u32,
    /// Spendable balance of all usable channels
    pub channels_balance_msat: u64,
    /// Unreserved on-chain funds, confirmed or not
    pub onchain_balance_msat: u64,
    /// On-chain outputs
    pub utxos: Vec<UnspentTransactionOutput>,
    /// Largest amount currently payable
    pub max_payable_msat: u64,
    /// Largest amount the node may still hold
    pub max_receivable_msat: u64,
    /// Largest amount of a single payment
    pub max_single_payment_amount_msat: u64,
    /// Balance locked as channel reserve
    pub max_chan_reserve_msats: u64,
    /// Ids of currently connected peers
    pub connected_peers: Vec<String>,
    /// Largest amount receivable through a single channel
    pub inbound_liquidity_msats: u64,
}
