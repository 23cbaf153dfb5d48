//! Node state derivation from the node's `getinfo`, `listfunds`, `listpeers`
//! and `listpeerchannels` responses.

use serde::Deserialize;
use types::{NodeState, UnspentTransactionOutput};

/// Largest amount of a single payment.
pub const MAX_PAYMENT_AMOUNT_MSAT: u64 = 4_294_967_000;
/// Largest balance the node is allowed to hold in channels.
pub const MAX_INBOUND_LIQUIDITY_MSAT: u64 = 4_000_000_000;

/// Channel state in which a channel is usable for payments.
const CHANNEL_NORMAL: &str = "CHANNELD_NORMAL";

#[derive(Debug, Deserialize)]
pub(crate) struct GetinfoResponse {
    pub(crate) id: String,
    pub(crate) blockheight: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListfundsOutput {
    txid: String,
    output: u32,
    amount_msat: u64,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    reserved: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListfundsResponse {
    #[serde(default)]
    outputs: Vec<ListfundsOutput>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Peer {
    id: String,
    #[serde(default)]
    connected: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListpeersResponse {
    #[serde(default)]
    peers: Vec<Peer>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PeerChannel {
    state: String,
    #[serde(default)]
    spendable_msat: Option<u64>,
    #[serde(default)]
    receivable_msat: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListpeerchannelsResponse {
    #[serde(default)]
    channels: Vec<PeerChannel>,
}

/// Combines the node responses into a [`NodeState`].
pub(crate) fn build_node_state(
    info: GetinfoResponse,
    funds: ListfundsResponse,
    peers: ListpeersResponse,
    peer_channels: ListpeerchannelsResponse,
) -> NodeState {
    let opened: Vec<&PeerChannel> =
        peer_channels.channels.iter().filter(|c| c.state == CHANNEL_NORMAL).collect();

    let channels_balance: u64 = opened.iter().map(|c| c.spendable_msat.unwrap_or_default()).sum();
    let max_payable = channels_balance;
    let inbound_liquidity =
        opened.iter().map(|c| c.receivable_msat.unwrap_or_default()).max().unwrap_or_default();

    let connected_peers: Vec<String> =
        peers.peers.into_iter().filter(|p| p.connected).map(|p| p.id).collect();

    // unconfirmed outputs count, reserved ones do not
    let onchain_balance: u64 =
        funds.outputs.iter().filter(|o| !o.reserved).map(|o| o.amount_msat).sum();

    let utxos = funds
        .outputs
        .into_iter()
        .map(|o| UnspentTransactionOutput {
            txid: o.txid,
            outnum: o.output,
            amount_millisatoshi: o.amount_msat,
            address: o.address.unwrap_or_default(),
            reserved: o.reserved,
        })
        .collect();

    NodeState {
        id: info.id,
        block_height: info.blockheight,
        channels_balance_msat: channels_balance,
        onchain_balance_msat: onchain_balance,
        utxos,
        max_payable_msat: max_payable,
        max_receivable_msat: MAX_INBOUND_LIQUIDITY_MSAT.saturating_sub(channels_balance),
        max_single_payment_amount_msat: MAX_PAYMENT_AMOUNT_MSAT,
        max_chan_reserve_msats: channels_balance - max_payable.min(channels_balance),
        connected_peers,
        inbound_liquidity_msats: inbound_liquidity,
    }
}
