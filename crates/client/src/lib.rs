// Path: crates/client/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Drone Miner Clients
//!
//! Concrete implementations of the `drone-api` collaborator traits that talk to
//! the outside world: the capability service over HTTP and the mining contract
//! over JSON-RPC.

/// HTTP client for the capability-issuing service.
pub mod capability;
/// EVM chain client for the mining contract.
pub mod evm;

pub use capability::HttpCapabilityService;
pub use evm::EvmChainClient;

/// Truncates a response body for inclusion in an error message.
pub(crate) fn ascii_snippet(body: &str) -> String {
    const MAX: usize = 512;
    let s = body.trim();
    let s = match s.char_indices().nth(MAX) {
        Some((idx, _)) => s.get(..idx).unwrap_or(s),
        None => s,
    };
    s.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
