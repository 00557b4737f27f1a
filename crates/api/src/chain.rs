// Path: crates/api/src/chain.rs
//! Defines the read and write interfaces to the mining contract.
//!
//! All on-chain quantities are unsigned integers; wei amounts use `u128`.

use async_trait::async_trait;
use drone_types::capability::SignedCapability;
use drone_types::error::ChainError;
use drone_types::license::LicenseStatus;
use drone_types::location::Location;
use std::time::Duration;

/// A fully specified `destroyBlock` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyCall {
    /// The drone license performing the destruction.
    pub drone_id: u64,
    /// The target block.
    pub location: Location,
    /// The authorization presented to the contract.
    pub capability: SignedCapability,
    /// Value attached to the transaction (the per-operation fee).
    pub value: u128,
    /// Gas limit for the real submission.
    pub gas_limit: u64,
}

/// The final status of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    /// Execution succeeded.
    Success,
    /// Execution reverted.
    Failed,
}

/// Read-only contract and account queries.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Native balance of `address` in wei.
    async fn balance_of(&self, address: &str) -> Result<u128, ChainError>;
    /// Whether `wallet` may mine with `drone_id` (owner or delegate).
    async fn is_authorized(&self, drone_id: u64, wallet: &str) -> Result<bool, ChainError>;
    /// Authoritative license and battery state.
    async fn license_status(&self, drone_id: u64) -> Result<LicenseStatus, ChainError>;
    /// Current owner of the drone.
    async fn owner_of(&self, drone_id: u64) -> Result<String, ChainError>;
    /// Value that must accompany each destroy call.
    async fn fee_per_operation(&self) -> Result<u128, ChainError>;
}

/// State-changing contract access.
#[async_trait]
pub trait ChainWriter: Send + Sync {
    /// Evaluates the call against current state without committing. Errors on revert.
    async fn simulate(&self, call: &DestroyCall) -> Result<(), ChainError>;
    /// Signs and broadcasts the call; returns the transaction hash.
    async fn submit(&self, call: &DestroyCall) -> Result<String, ChainError>;
    /// Waits for the receipt of `tx_hash`, bounded by `timeout`.
    async fn wait_for_receipt(
        &self,
        tx_hash: &str,
        timeout: Duration,
    ) -> Result<ReceiptStatus, ChainError>;
}

/// A full chain client.
pub trait ChainClient: ChainReader + ChainWriter {}

impl<T> ChainClient for T where T: ChainReader + ChainWriter + ?Sized {}
