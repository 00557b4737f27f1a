// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_gauge, register_gauge_vec, register_histogram,
    register_histogram_vec, register_int_counter, register_int_counter_vec, Gauge, GaugeVec,
    Histogram, HistogramVec, IntCounter, IntCounterVec,
};

// --- Metric Statics ---
// Initialized exactly once by `install`.

static BLOCKS_DESTROYED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ALREADY_PROCESSED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static CAPABILITY_REFRESHES_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static BATTERY_CURRENT: OnceCell<Gauge> = OnceCell::new();
static BATTERY_MAX: OnceCell<Gauge> = OnceCell::new();
static SESSION_STATE: OnceCell<GaugeVec> = OnceCell::new();
static ITERATION_DURATION_SECONDS: OnceCell<Histogram> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static RPC_REQUESTS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static RPC_REQUEST_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();

const SESSION_STATES: [&str; 4] = ["idle", "running", "stopping", "stopped"];

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

impl MiningMetricsSink for PrometheusSink {
    fn inc_blocks_destroyed(&self) {
        if let Some(m) = BLOCKS_DESTROYED_TOTAL.get() {
            m.inc();
        }
    }
    fn inc_already_processed(&self) {
        if let Some(m) = ALREADY_PROCESSED_TOTAL.get() {
            m.inc();
        }
    }
    fn inc_capability_refreshes(&self) {
        if let Some(m) = CAPABILITY_REFRESHES_TOTAL.get() {
            m.inc();
        }
    }
    fn set_battery(&self, current: u64, max: u64) {
        if let Some(m) = BATTERY_CURRENT.get() {
            m.set(current as f64);
        }
        if let Some(m) = BATTERY_MAX.get() {
            m.set(max as f64);
        }
    }
    fn observe_iteration_duration(&self, duration_secs: f64) {
        if let Some(m) = ITERATION_DURATION_SECONDS.get() {
            m.observe(duration_secs);
        }
    }
    fn set_session_state(&self, state_name: &str) {
        if let Some(m) = SESSION_STATE.get() {
            for state in SESSION_STATES {
                m.with_label_values(&[state])
                    .set(if state == state_name { 1.0 } else { 0.0 });
            }
        }
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, code: &'static str) {
        if let Some(m) = ERRORS_TOTAL.get() {
            m.with_label_values(&[kind, code]).inc();
        }
    }
}

impl RpcMetricsSink for PrometheusSink {
    fn observe_request_duration(&self, route: &str, duration_secs: f64) {
        if let Some(m) = RPC_REQUEST_DURATION_SECONDS.get() {
            m.with_label_values(&[route]).observe(duration_secs);
        }
    }
    fn inc_requests_total(&self, route: &str, outcome: &str) {
        if let Some(m) = RPC_REQUESTS_TOTAL.get() {
            m.with_label_values(&[route, outcome]).inc();
        }
    }
}

fn set_once<T>(cell: &OnceCell<T>, value: T) -> Result<(), prometheus::Error> {
    cell.set(value).map_err(|_| prometheus::Error::AlreadyReg)
}

/// Registers all Prometheus collectors and returns a static reference to the sink.
/// Must be called at most once per process; a second call fails with `AlreadyReg`.
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    set_once(
        &BLOCKS_DESTROYED_TOTAL,
        register_int_counter!(
            "drone_miner_blocks_destroyed_total",
            "Total blocks destroyed and confirmed by this process."
        )?,
    )?;
    set_once(
        &ALREADY_PROCESSED_TOTAL,
        register_int_counter!(
            "drone_miner_already_processed_total",
            "Total attempts that targeted an already-destroyed tile."
        )?,
    )?;
    set_once(
        &CAPABILITY_REFRESHES_TOTAL,
        register_int_counter!(
            "drone_miner_capability_refreshes_total",
            "Total capability fetches performed by the mining loop."
        )?,
    )?;
    set_once(
        &BATTERY_CURRENT,
        register_gauge!(
            "drone_miner_battery_current",
            "Local estimate of the remaining license battery."
        )?,
    )?;
    set_once(
        &BATTERY_MAX,
        register_gauge!("drone_miner_battery_max", "License battery capacity.")?,
    )?;
    set_once(
        &SESSION_STATE,
        register_gauge_vec!(
            "drone_miner_session_state",
            "Current mining loop state (1 if active, 0 otherwise).",
            &["state"]
        )?,
    )?;
    set_once(
        &ITERATION_DURATION_SECONDS,
        register_histogram!(
            "drone_miner_iteration_duration_seconds",
            "Latency of a single mining loop iteration.",
            exponential_buckets(0.01, 2.0, 14)?
        )?,
    )?;
    set_once(
        &ERRORS_TOTAL,
        register_int_counter_vec!(
            "drone_miner_errors_total",
            "Total number of errors, categorized by kind and code.",
            &["kind", "code"]
        )?,
    )?;
    set_once(
        &RPC_REQUESTS_TOTAL,
        register_int_counter_vec!(
            "drone_miner_rpc_requests_total",
            "Total outbound requests to the chain node and capability service.",
            &["route", "outcome"]
        )?,
    )?;
    set_once(
        &RPC_REQUEST_DURATION_SECONDS,
        register_histogram_vec!(
            "drone_miner_rpc_request_duration_seconds",
            "Latency of outbound requests.",
            &["route"],
            exponential_buckets(0.001, 2.0, 15)?
        )?,
    )?;

    static SINK: PrometheusSink = PrometheusSink;
    Ok(&SINK)
}
