// Path: crates/miner/src/tracker.rs
//! Local battery estimate, corrected periodically from the license contract.

use drone_api::chain::ChainReader;
use drone_types::error::ChainError;
use drone_types::license::{BatteryLevel, LicenseStatus};

/// Successful operations between on-chain resyncs.
pub const DEFAULT_RESYNC_INTERVAL: u64 = 25;

/// Tracks the battery between authoritative reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTracker {
    current: u64,
    max: u64,
    resync_interval: u64,
}

impl ResourceTracker {
    pub fn new(initial: BatteryLevel) -> Self {
        Self {
            current: initial.current,
            max: initial.max,
            resync_interval: DEFAULT_RESYNC_INTERVAL,
        }
    }

    pub fn from_status(status: &LicenseStatus) -> Self {
        Self::new(status.battery())
    }

    pub fn with_resync_interval(mut self, interval: u64) -> Self {
        self.resync_interval = interval.max(1);
        self
    }

    pub fn battery(&self) -> BatteryLevel {
        BatteryLevel {
            current: self.current,
            max: self.max,
        }
    }

    /// One successful destruction costs one unit. Never goes below zero.
    pub fn decrement_on_success(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// True on every `resync_interval`-th success.
    pub fn should_resync(&self, success_count: u64) -> bool {
        success_count > 0 && success_count % self.resync_interval == 0
    }

    /// Replaces the estimate with the contract's view. On error the estimate is unchanged.
    pub async fn resync_from_chain<C>(
        &mut self,
        chain: &C,
        drone_id: u64,
    ) -> Result<BatteryLevel, ChainError>
    where
        C: ChainReader + ?Sized,
    {
        let status = chain.license_status(drone_id).await?;
        self.current = status.current_battery;
        self.max = status.max_battery;
        Ok(self.battery())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_should_resync_every_interval() {
        let tracker = ResourceTracker::new(BatteryLevel { current: 10, max: 10 });
        assert!(!tracker.should_resync(0));
        let hits: Vec<u64> = (1..=100).filter(|n| tracker.should_resync(*n)).collect();
        assert_eq!(hits, vec![25, 50, 75, 100]);

        let tracker = tracker.with_resync_interval(3);
        assert!(tracker.should_resync(3));
        assert!(!tracker.should_resync(4));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let tracker = ResourceTracker::new(BatteryLevel::default()).with_resync_interval(0);
        assert!(tracker.should_resync(1));
    }

    proptest! {
        #[test]
        fn decrement_floors_at_zero(start in 0u64..50, successes in 0usize..120) {
            let mut tracker = ResourceTracker::new(BatteryLevel { current: start, max: 50 });
            for _ in 0..successes {
                tracker.decrement_on_success();
            }
            let expected = start.saturating_sub(successes as u64);
            prop_assert_eq!(tracker.battery().current, expected);
            prop_assert_eq!(tracker.battery().max, 50);
        }
    }
}
