#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! lnsdk Core
//!
//! Client SDK for a Lightning node hosted by a Greenlight-style provider.
//! The typical flow is:
//!
//! 1. install a log stream ([`binding::set_log_stream`]),
//! 2. derive a seed from a mnemonic ([`mnemonic_to_seed`]),
//! 3. build a configuration ([`default_config`]),
//! 4. connect ([`BreezServices::connect`] or [`binding::connect`]),
//! 5. query the node ([`BreezServices::node_info`]).
//!
//! Async callers use [`BreezServices`] directly; the [`binding`] module
//! offers the same calls as blocking functions.

pub mod binding;
pub mod config;
pub mod error;
pub mod events;
pub mod persist;
pub mod seed;
pub mod services;

pub use config::default_config;
pub use error::{SdkError, SdkResult};
pub use events::{EventDispatcher, EventListener};
pub use logging::LogStream;
pub use persist::SdkStorage;
pub use seed::{generate_mnemonic, mnemonic_to_seed};
pub use services::{BreezServices, BreezServicesBuilder};
