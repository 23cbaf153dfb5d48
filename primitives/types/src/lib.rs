#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Plain data records exchanged with the SDK
//!
//! This crate defines the value types that cross the SDK boundary: log entries
//! and their severity filter, event notifications, the configuration record,
//! the connect request and the node state returned by node info queries.
//! None of these types carry behavior beyond construction, parsing and
//! display; all of them are serializable so they can be persisted, printed
//! as JSON, or handed across a foreign-function binding.

/// Environment and network selectors.
///
/// `EnvironmentType` picks the provider deployment (production or staging);
/// `Network` picks the Bitcoin chain the node runs on.
pub mod environment;
/// Event notifications raised by the SDK.
pub mod event;
/// Log entries and severity filters.
pub mod log;
/// Node backend configuration, the SDK configuration record and the connect request.
pub mod config;
/// Node state as reported by the node backend.
pub mod node;
/// Requests and responses of message signing with the node key.
pub mod message;

pub use config::{Config, ConnectRequest, GreenlightCredentials, GreenlightNodeConfig, NodeConfig};
pub use environment::{EnvironmentType, Network};
pub use event::BreezEvent;
pub use log::{LevelFilter, LogEntry};
pub use message::{
    CheckMessageRequest, CheckMessageResponse, SignMessageRequest, SignMessageResponse,
};
pub use node::{NodeState, UnspentTransactionOutput};
