// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
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

//! # Drone Miner Types
//!
//! The foundational library of the drone miner workspace: capability tokens,
//! target locations, license/battery state, session statistics, configuration
//! and the error enums shared by every other crate.
//!
//! ## Architectural Role
//!
//! `drone-types` has no async or network dependencies and sits at the bottom of
//! the dependency graph, so collaborator traits (`drone-api`), adapters
//! (`drone-client`) and the mining core (`drone-core`) can all agree on one
//! canonical definition of the data they exchange.

/// Capability tokens issued by the remote signing service.
pub mod capability;
/// Miner configuration loaded from TOML.
pub mod config;
/// A unified set of error types used across the workspace.
pub mod error;
/// On-chain license and battery state.
pub mod license;
/// Target locations and their display decomposition.
pub mod location;
/// Typed outcomes of a block destruction attempt.
pub mod outcome;
/// Session statistics and durable snapshots.
pub mod stats;
