// Path: crates/api/src/events.rs
//! Notification hooks invoked by the mining loop. Every method defaults to a
//! no-op so sinks implement only what they render.

use drone_types::location::Location;
use drone_types::stats::MiningStats;

/// Receives mining loop notifications.
pub trait EventSink: Send + Sync {
    /// A block was destroyed and confirmed.
    fn on_destroyed(&self, _location: &Location, _tx_hash: &str) {}
    /// The target had already been destroyed.
    fn on_already_processed(&self, _location: &Location) {}
    /// An iteration failed.
    fn on_error(&self, _message: &str) {}
    /// A fresh capability was fetched with `budget` units.
    fn on_capability_refresh(&self, _budget: u32) {}
    /// The battery ran out; the loop is stopping.
    fn on_resource_depleted(&self) {}
    /// Counters changed.
    fn on_stats_updated(&self, _stats: &MiningStats) {}
}

/// An event sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopEventSink;

impl EventSink for NopEventSink {}
