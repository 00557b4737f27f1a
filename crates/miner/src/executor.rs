// Path: crates/miner/src/executor.rs
//! Simulate, submit, confirm. Every failure becomes a [`DestroyOutcome`].

use crate::classify::classify;
use drone_api::chain::{ChainClient, DestroyCall, ReceiptStatus};
use drone_types::capability::SignedCapability;
use drone_types::location::Location;
use drone_types::outcome::{DestroyOutcome, FailureKind};
use std::sync::Arc;
use std::time::Duration;

/// Gas limit attached to every submission.
pub const DEFAULT_GAS_LIMIT: u64 = 500_000;
/// Upper bound on waiting for a receipt.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes `destroyBlock` calls. Performs no retries.
pub struct TransactionExecutor {
    chain: Arc<dyn ChainClient>,
    gas_limit: u64,
    receipt_timeout: Duration,
}

impl TransactionExecutor {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self {
            chain,
            gas_limit: DEFAULT_GAS_LIMIT,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
        }
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// Attempts to destroy the tile at `location`.
    ///
    /// A failed simulation returns immediately and nothing is broadcast.
    pub async fn destroy(
        &self,
        drone_id: u64,
        location: Location,
        capability: &SignedCapability,
        fee_per_operation: u128,
    ) -> DestroyOutcome {
        let call = DestroyCall {
            drone_id,
            location,
            capability: capability.clone(),
            value: fee_per_operation,
            gas_limit: self.gas_limit,
        };

        if let Err(e) = self.chain.simulate(&call).await {
            let kind = classify(&e.to_string());
            tracing::debug!(target: "executor", %location, error = %e, kind = kind.code(), "simulation rejected");
            return DestroyOutcome::from_failure(kind, None);
        }

        let tx_hash = match self.chain.submit(&call).await {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(target: "executor", %location, error = %e, "submission failed");
                return DestroyOutcome::from_failure(classify(&e.to_string()), None);
            }
        };
        tracing::debug!(target: "executor", %location, tx = %tx_hash, "submitted");

        match self
            .chain
            .wait_for_receipt(&tx_hash, self.receipt_timeout)
            .await
        {
            Ok(ReceiptStatus::Success) => DestroyOutcome::Destroyed { tx_hash },
            Ok(ReceiptStatus::Failed) => {
                DestroyOutcome::from_failure(FailureKind::RevertedOnChain, Some(tx_hash))
            }
            Err(e) => {
                tracing::warn!(target: "executor", tx = %tx_hash, error = %e, "receipt wait failed");
                DestroyOutcome::from_failure(classify(&e.to_string()), Some(tx_hash))
            }
        }
    }
}
