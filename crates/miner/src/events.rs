// Path: crates/miner/src/events.rs
//! An [`EventSink`] that turns mining events into structured log lines.

use drone_api::events::EventSink;
use drone_types::location::Location;
use drone_types::stats::MiningStats;

/// Logs every event under the `miner` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn on_destroyed(&self, location: &Location, tx_hash: &str) {
        tracing::info!(
            target: "miner",
            event = "destroyed",
            container_id = location.container_id,
            block_id = location.block_id,
            %location,
            tx = %tx_hash
        );
    }

    fn on_already_processed(&self, location: &Location) {
        tracing::debug!(target: "miner", event = "already_processed", %location);
    }

    fn on_error(&self, message: &str) {
        tracing::warn!(target: "miner", event = "error", error = %message);
    }

    fn on_capability_refresh(&self, budget: u32) {
        tracing::info!(target: "miner", event = "capability_refresh", budget);
    }

    fn on_resource_depleted(&self) {
        tracing::warn!(target: "miner", event = "resource_depleted", "battery depleted, shift ended");
    }

    fn on_stats_updated(&self, stats: &MiningStats) {
        tracing::debug!(
            target: "miner",
            event = "stats",
            destroyed = stats.blocks_destroyed,
            already = stats.already_destroyed,
            errors = stats.errors,
            refreshes = stats.capability_refreshes
        );
    }
}
