//! Read-only node commands exposed for diagnostics.

use std::fmt;
use std::str::FromStr;

/// Node RPC a caller may run through [`crate::NodeApi::execute_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCommand {
    /// Node identity and chain height
    GetInfo,
    /// On-chain outputs and channel funds
    ListFunds,
    /// Known peers
    ListPeers,
    /// Channels with their peers
    ListPeerChannels,
    /// Invoices created by the node
    ListInvoices,
    /// Outgoing payments
    ListPayments,
}

impl NodeCommand {
    /// Returns the RPC method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCommand::GetInfo => "getinfo",
            NodeCommand::ListFunds => "listfunds",
            NodeCommand::ListPeers => "listpeers",
            NodeCommand::ListPeerChannels => "listpeerchannels",
            NodeCommand::ListInvoices => "listinvoices",
            NodeCommand::ListPayments => "listpays",
        }
    }
}

impl FromStr for NodeCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "getinfo" => Ok(NodeCommand::GetInfo),
            "listfunds" => Ok(NodeCommand::ListFunds),
            "listpeers" => Ok(NodeCommand::ListPeers),
            "listpeerchannels" => Ok(NodeCommand::ListPeerChannels),
            "listinvoices" => Ok(NodeCommand::ListInvoices),
            "listpayments" | "listpays" => Ok(NodeCommand::ListPayments),
            _ => Err(format!("command not found: {}", s)),
        }
    }
}

impl fmt::Display for NodeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
