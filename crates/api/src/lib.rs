// Path: crates/api/src/lib.rs

//! # Drone Miner API Crate Lints
//!
//! Panics are disallowed in non-test code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # Drone Miner API
//!
//! The traits at every seam between the mining core and the outside world. The
//! core depends only on these; concrete adapters live in `drone-client`.

/// The `CapabilityService` trait for the remote signing service.
pub mod capability;
/// Read and write access to the mining contract.
pub mod chain;
/// Notification hooks invoked by the mining loop.
pub mod events;
/// Durable storage for session snapshots.
pub mod state;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::capability::CapabilityService;
    pub use crate::chain::{ChainClient, ChainReader, ChainWriter, DestroyCall, ReceiptStatus};
    pub use crate::events::{EventSink, NopEventSink};
    pub use crate::state::{NopStateSink, StateSink};
}
