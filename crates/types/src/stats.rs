// Path: crates/types/src/stats.rs
//! Mining session statistics and the snapshot persisted for status reporting.

use serde::{Deserialize, Serialize};

/// Monotonically increasing counters for one mining session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MiningStats {
    /// Blocks confirmed destroyed by this session.
    pub blocks_destroyed: u64,
    /// Attempts that hit an already-destroyed tile.
    pub already_destroyed: u64,
    /// Failed iterations, including infrastructure failures.
    pub errors: u64,
    /// Capability fetches performed by the loop.
    pub capability_refreshes: u64,
    /// Session start (unix seconds).
    pub started_at: u64,
    /// The most recent error message, for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl MiningStats {
    /// Fresh counters stamped with the session start time.
    pub fn new(started_at: u64) -> Self {
        Self {
            started_at,
            ..Default::default()
        }
    }

    /// Total iterations that reached an outcome.
    pub fn attempts(&self) -> u64 {
        self.blocks_destroyed + self.already_destroyed + self.errors
    }
}

/// The durable record written periodically during a session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// OS process id of the miner.
    pub process_id: u32,
    /// Session start (unix seconds).
    pub start_time: u64,
    /// Counters at the time of the snapshot.
    pub stats: MiningStats,
}

/// Why a mining session ended.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The battery ran out; the expected end of a shift.
    Depleted,
    /// Operator cancellation or the configured block cap.
    Stopped,
}

/// The summary returned when the mining loop exits.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Why the loop ended.
    pub reason: ShutdownReason,
    /// Final counters.
    pub stats: MiningStats,
}
