#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Node Backend Adapters
//!
//! This crate defines the seam between the SDK services and the Lightning
//! node they drive. [`NodeApi`] is the interface the services call; each
//! backend implements it on top of a [`transport::Transport`]. The only
//! backend today is [`greenlight::Greenlight`], a node hosted by a remote
//! provider that is registered, recovered and scheduled through the
//! provider's scheduler.
//!
//! Persisting the credentials a backend obtains is the caller's concern and
//! is reached through [`CredentialStore`].

pub mod greenlight;
pub mod node_api;

pub use greenlight::Greenlight;
pub use node_api::{CredentialStore, NodeApi, NodeError, NodeResult, StoredCredentials};
