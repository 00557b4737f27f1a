// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns the configured mining metrics sink, or a no-op sink if none was installed.
pub fn mining_metrics() -> &'static dyn MiningMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns the configured error metrics sink, or a no-op sink if none was installed.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns the configured outbound-request metrics sink, or a no-op sink if none was installed.
pub fn rpc_metrics() -> &'static dyn RpcMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics produced by the mining loop.
pub trait MiningMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter of confirmed block destructions.
    fn inc_blocks_destroyed(&self);
    /// Increments the counter of already-destroyed targets.
    fn inc_already_processed(&self);
    /// Increments the counter of capability fetches, including the first.
    fn inc_capability_refreshes(&self);
    /// Sets the battery gauges from the local estimate.
    fn set_battery(&self, current: u64, max: u64);
    /// Observes the wall-clock duration of one loop iteration.
    fn observe_iteration_duration(&self, duration_secs: f64);
    /// Sets a gauge vector to indicate the current loop state.
    fn set_session_state(&self, state_name: &str);
}
impl MiningMetricsSink for NopSink {
    fn inc_blocks_destroyed(&self) {}
    fn inc_already_processed(&self) {}
    fn inc_capability_refreshes(&self) {}
    fn set_battery(&self, _current: u64, _max: u64) {}
    fn observe_iteration_duration(&self, _duration_secs: f64) {}
    fn set_session_state(&self, _state_name: &str) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and code.
    fn inc_error(&self, kind: &'static str, code: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _code: &'static str) {}
}

/// A sink for outbound requests to the chain node and the capability service.
pub trait RpcMetricsSink: Send + Sync + std::fmt::Debug {
    /// Observes the latency of an outbound request, labeled by route.
    fn observe_request_duration(&self, route: &str, duration_secs: f64);
    /// Increments a counter for outbound requests, labeled by route and outcome.
    fn inc_requests_total(&self, route: &str, outcome: &str);
}
impl RpcMetricsSink for NopSink {
    fn observe_request_duration(&self, _route: &str, _duration_secs: f64) {}
    fn inc_requests_total(&self, _route: &str, _outcome: &str) {}
}

/// A unified sink that implements all domain-specific traits, providing a single
/// point of implementation for metrics backends like Prometheus.
pub trait MetricsSink: MiningMetricsSink + ErrorMetricsSink + RpcMetricsSink {}

// Blanket implementation to allow any type that implements all sub-traits
// to be used as a `MetricsSink`.
impl<T> MetricsSink for T where T: MiningMetricsSink + ErrorMetricsSink + RpcMetricsSink {}
