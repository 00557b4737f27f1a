// Path: crates/miner/src/cache.rs
//! A single cached capability with a locally tracked budget.
//!
//! The local budget is advisory. The contract is the authority, and a
//! capability it rejects is dropped via [`CapabilityCache::invalidate`].

use crate::clock::Clock;
use drone_api::capability::CapabilityService;
use drone_types::capability::{AllowedModes, CapabilityRequest, SignedCapability};
use drone_types::error::CapabilityError;
use std::sync::Arc;

/// Seconds before expiry at which a cached capability stops being reused.
pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 30;

#[derive(Debug, Clone)]
struct Entry {
    signed: SignedCapability,
    remaining_budget: u32,
}

/// Caches one capability for a (wallet, drone) pair and refreshes it on demand.
pub struct CapabilityCache {
    service: Arc<dyn CapabilityService>,
    clock: Arc<dyn Clock>,
    request: CapabilityRequest,
    safety_margin_secs: u64,
    entry: Option<Entry>,
}

impl CapabilityCache {
    pub fn new(
        service: Arc<dyn CapabilityService>,
        clock: Arc<dyn Clock>,
        wallet: impl Into<String>,
        drone_id: u64,
    ) -> Self {
        Self {
            service,
            clock,
            request: CapabilityRequest {
                wallet: wallet.into(),
                allowed_modes: AllowedModes::MINE,
                drone_id,
            },
            safety_margin_secs: DEFAULT_SAFETY_MARGIN_SECS,
            entry: None,
        }
    }

    pub fn with_safety_margin(mut self, secs: u64) -> Self {
        self.safety_margin_secs = secs;
        self
    }

    fn usable(&self, entry: &Entry, cost: u32) -> bool {
        let now = self.clock.now_secs();
        now.saturating_add(self.safety_margin_secs) < entry.signed.capability.expires_at
            && entry.remaining_budget >= cost
    }

    /// True when the next `acquire(cost)` would have to contact the service.
    pub fn needs_refresh(&self, cost: u32) -> bool {
        match &self.entry {
            Some(entry) => !self.usable(entry, cost),
            None => true,
        }
    }

    /// Returns a capability able to pay for `cost` operations, charging it locally.
    ///
    /// Reuses the cached capability when it is outside the safety margin and its
    /// remaining budget covers `cost`; otherwise fetches a new one and replaces
    /// the entry. A fresh capability whose budget is below `cost` is rejected.
    pub async fn acquire(&mut self, cost: u32) -> Result<SignedCapability, CapabilityError> {
        let reusable = self
            .entry
            .as_ref()
            .is_some_and(|entry| self.usable(entry, cost));
        if reusable {
            if let Some(entry) = self.entry.as_mut() {
                entry.remaining_budget -= cost;
                return Ok(entry.signed.clone());
            }
        }

        let signed = self.service.request(&self.request).await?;
        let budget = signed.capability.budget;
        if budget < cost {
            self.entry = None;
            return Err(CapabilityError::BudgetBelowCost { budget, cost });
        }
        tracing::debug!(
            target: "capability",
            nonce = signed.capability.nonce,
            budget,
            expires_at = signed.capability.expires_at,
            "cached fresh capability"
        );
        self.entry = Some(Entry {
            signed: signed.clone(),
            remaining_budget: budget - cost,
        });
        Ok(signed)
    }

    /// Locally tracked budget; zero when nothing is cached.
    pub fn remaining_budget(&self) -> u32 {
        self.entry.as_ref().map_or(0, |e| e.remaining_budget)
    }

    /// Drops the cached capability.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn current(&self) -> Option<&SignedCapability> {
        self.entry.as_ref().map(|e| &e.signed)
    }
}
