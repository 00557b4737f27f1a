// Path: crates/miner/src/lib.rs
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

//! # Drone Miner Core
//!
//! The block destruction loop and the components it owns:
//!
//! * [`cache::CapabilityCache`] keeps a signed capability and its local budget.
//! * [`executor::TransactionExecutor`] runs simulate → submit → receipt and
//!   folds every failure into a typed [`drone_types::outcome::DestroyOutcome`].
//! * [`tracker::ResourceTracker`] estimates battery between on-chain resyncs.
//! * [`miner::Miner`] drives iterations until the battery is depleted or it is
//!   told to stop.
//!
//! Setup checks and drone discovery live in [`session`].

pub mod cache;
pub mod classify;
pub mod clock;
pub mod events;
pub mod executor;
pub mod miner;
pub mod session;
pub mod state;
pub mod tracker;

pub use cache::CapabilityCache;
pub use classify::classify;
pub use clock::{Clock, ManualClock, SystemClock};
pub use events::LogEventSink;
pub use executor::TransactionExecutor;
pub use miner::{Miner, MinerOptions, MinerState, StopHandle};
pub use state::JsonFileStateSink;
pub use tracker::ResourceTracker;
