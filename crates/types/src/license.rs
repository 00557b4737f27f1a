// Path: crates/types/src/license.rs
//! On-chain license state. The contract is the single source of truth for the
//! battery; anything held locally is an estimate.

use serde::{Deserialize, Serialize};

/// Authoritative license status as reported by `getLicenseStatus`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LicenseStatus {
    /// License tier.
    pub tier: u8,
    /// License level.
    pub level: u8,
    /// Battery capacity.
    pub max_battery: u64,
    /// Battery remaining.
    pub current_battery: u64,
    /// Cumulative blocks destroyed by this license.
    pub total_destroyed: u64,
}

impl LicenseStatus {
    /// The battery pair used by the resource tracker.
    pub fn battery(&self) -> BatteryLevel {
        BatteryLevel {
            current: self.current_battery,
            max: self.max_battery,
        }
    }
}

/// A `(current, max)` battery reading.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatteryLevel {
    /// Battery remaining.
    pub current: u64,
    /// Battery capacity.
    pub max: u64,
}

impl BatteryLevel {
    /// True once nothing is left to spend.
    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Remaining charge in percent of capacity, 0 when capacity is unknown.
    pub fn percent(&self) -> u64 {
        if self.max == 0 {
            return 0;
        }
        self.current.min(self.max) * 100 / self.max
    }
}
