use serde::{Deserialize, Serialize};

use crate::node::NodeState;

/// Notification delivered to an event listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BreezEvent {
    /// The node observed a new chain tip
    NewBlock {
        /// Height of the new tip
        block: u32,
    },
    /// The synced node state differs from the previous one
    NodeStateChanged {
        /// The freshly synced state
        node_state: NodeState,
    },
    /// A sync with the node completed
    Synced,
}
