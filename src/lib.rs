// SPDX-License-Identifier: CC0-1.0

//! lnsdk umbrella crate.
//!
//! This crate primarily serves as the workspace root and re-exports the SDK
//! surface of `lnsdk-core`.
//!
//! All functional code lives in the workspace member crates under
//! directories such as `sdk`, `adapters`, and `primitives`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(deprecated_in_future)]
#![doc(test(attr(warn(unused))))]

pub use sdk::*;

/// Miscellaneous metadata about the lnsdk workspace.
pub mod lnsdk_meta {
    /// Version string for the umbrella crate, as reported by Cargo.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
