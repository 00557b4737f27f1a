// Path: crates/miner/src/miner.rs
//! The mining loop.
//!
//! One iteration picks a random tile, makes sure a capability is cached,
//! runs the executor and folds the outcome into the session counters. Nothing
//! inside an iteration escapes: every failure is counted and the loop moves on,
//! except a depleted battery which ends the session.

use crate::cache::CapabilityCache;
use crate::classify::classify;
use crate::clock::{Clock, SystemClock};
use crate::executor::TransactionExecutor;
use crate::tracker::ResourceTracker;
use drone_api::chain::ChainClient;
use drone_api::events::{EventSink, NopEventSink};
use drone_api::state::{NopStateSink, StateSink};
use drone_telemetry::sinks::{error_metrics, mining_metrics};
use drone_telemetry::time::IterationTimer;
use drone_types::config::MiningConfig;
use drone_types::error::{ErrorCode, MinerError};
use drone_types::license::BatteryLevel;
use drone_types::location::{Location, CONTAINERS_PER_LAYER, TILES_PER_CONTAINER};
use drone_types::outcome::{DestroyOutcome, Recovery};
use drone_types::stats::{MiningStats, SessionReport, SessionSnapshot, ShutdownReason};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle of a [`Miner`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinerState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl MinerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }
}

/// Requests a cooperative stop. Observed between iterations.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-session parameters of the loop.
#[derive(Debug, Clone)]
pub struct MinerOptions {
    pub drone_id: u64,
    /// Fixed for the whole session; read once during setup.
    pub fee_per_operation: u128,
    pub operation_cost: u32,
    pub throttle: Duration,
    /// Successful operations between state snapshots.
    pub persist_interval: u64,
    /// Iteration cap; `None` runs until depleted or stopped.
    pub max_blocks: Option<u64>,
    /// Seeds target selection. Random when unset.
    pub seed: Option<u64>,
}

impl MinerOptions {
    pub fn new(drone_id: u64, fee_per_operation: u128) -> Self {
        Self {
            drone_id,
            fee_per_operation,
            operation_cost: 1,
            throttle: Duration::from_millis(100),
            persist_interval: 10,
            max_blocks: None,
            seed: None,
        }
    }

    pub fn from_config(config: &MiningConfig, drone_id: u64, fee_per_operation: u128) -> Self {
        Self {
            drone_id,
            fee_per_operation,
            operation_cost: config.operation_cost,
            throttle: Duration::from_millis(config.throttle_ms),
            persist_interval: config.persist_interval.max(1),
            max_blocks: config.max_blocks,
            seed: None,
        }
    }
}

/// Drives the destroy loop for one drone.
pub struct Miner {
    options: MinerOptions,
    chain: Arc<dyn ChainClient>,
    cache: CapabilityCache,
    executor: TransactionExecutor,
    tracker: ResourceTracker,
    events: Arc<dyn EventSink>,
    state_sink: Arc<dyn StateSink>,
    clock: Arc<dyn Clock>,
    stats: MiningStats,
    state: MinerState,
    stop: StopHandle,
    depleted: bool,
    iterations: u64,
    rng: StdRng,
}

impl Miner {
    pub fn new(
        options: MinerOptions,
        chain: Arc<dyn ChainClient>,
        cache: CapabilityCache,
        tracker: ResourceTracker,
    ) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            executor: TransactionExecutor::new(chain.clone()),
            stats: MiningStats::new(clock.now_secs()),
            options,
            chain,
            cache,
            tracker,
            events: Arc::new(NopEventSink),
            state_sink: Arc::new(NopStateSink),
            clock,
            state: MinerState::Idle,
            stop: StopHandle::default(),
            depleted: false,
            iterations: 0,
            rng,
        }
    }

    pub fn with_executor(mut self, executor: TransactionExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_state_sink(mut self, state_sink: Arc<dyn StateSink>) -> Self {
        self.state_sink = state_sink;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.stats.started_at = clock.now_secs();
        self.clock = clock;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn state(&self) -> MinerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == MinerState::Running
    }

    pub fn stats(&self) -> &MiningStats {
        &self.stats
    }

    pub fn battery(&self) -> BatteryLevel {
        self.tracker.battery()
    }

    pub fn cache(&self) -> &CapabilityCache {
        &self.cache
    }

    /// Runs iterations until the battery is depleted, a stop is requested, or
    /// the iteration cap is reached.
    pub async fn run(&mut self) -> SessionReport {
        if self.state == MinerState::Stopped {
            return self.report();
        }
        self.stats.started_at = self.clock.now_secs();
        self.set_state(MinerState::Running);
        let battery = self.tracker.battery();
        mining_metrics().set_battery(battery.current, battery.max);
        tracing::info!(
            target: "miner",
            drone_id = self.options.drone_id,
            fee = %self.options.fee_per_operation,
            battery = battery.current,
            max_battery = battery.max,
            "mining session started"
        );

        loop {
            if self.stop.is_stopped() {
                self.set_state(MinerState::Stopping);
            }
            if self
                .options
                .max_blocks
                .is_some_and(|max| self.iterations >= max)
            {
                tracing::info!(target: "miner", iterations = self.iterations, "iteration cap reached");
                self.set_state(MinerState::Stopping);
            }
            if self.state != MinerState::Running {
                break;
            }

            self.iteration().await;
            self.iterations += 1;

            if self.state == MinerState::Running && !self.options.throttle.is_zero() {
                tokio::time::sleep(self.options.throttle).await;
            }
        }

        self.set_state(MinerState::Stopped);
        let report = self.report();
        tracing::info!(
            target: "miner",
            reason = ?report.reason,
            destroyed = report.stats.blocks_destroyed,
            already = report.stats.already_destroyed,
            errors = report.stats.errors,
            "mining session ended"
        );
        report
    }

    fn report(&self) -> SessionReport {
        SessionReport {
            reason: if self.depleted {
                ShutdownReason::Depleted
            } else {
                ShutdownReason::Stopped
            },
            stats: self.stats.clone(),
        }
    }

    fn set_state(&mut self, state: MinerState) {
        if self.state != state {
            tracing::debug!(target: "miner", from = self.state.as_str(), to = state.as_str(), "state change");
        }
        self.state = state;
        mining_metrics().set_session_state(state.as_str());
    }

    fn next_target(&mut self) -> Location {
        Location::new(
            self.rng.gen_range(0..CONTAINERS_PER_LAYER),
            self.rng.gen_range(0..TILES_PER_CONTAINER),
        )
    }

    async fn iteration(&mut self) {
        let _timer = IterationTimer::new(mining_metrics());
        let location = self.next_target();
        let cost = self.options.operation_cost;

        let refreshing = self.cache.needs_refresh(cost);
        match self.cache.acquire(cost).await {
            Ok(capability) => {
                if refreshing {
                    self.stats.capability_refreshes += 1;
                    mining_metrics().inc_capability_refreshes();
                    self.events
                        .on_capability_refresh(capability.capability.budget);
                }
                let outcome = self
                    .executor
                    .destroy(
                        self.options.drone_id,
                        location,
                        &capability,
                        self.options.fee_per_operation,
                    )
                    .await;
                self.apply_outcome(location, outcome).await;
            }
            Err(e) => self.record_exception(MinerError::from(e)),
        }

        let battery = self.tracker.battery();
        mining_metrics().set_battery(battery.current, battery.max);
        self.events.on_stats_updated(&self.stats);
    }

    async fn apply_outcome(&mut self, location: Location, outcome: DestroyOutcome) {
        match outcome {
            DestroyOutcome::Destroyed { tx_hash } => {
                self.stats.blocks_destroyed += 1;
                self.tracker.decrement_on_success();
                mining_metrics().inc_blocks_destroyed();
                self.events.on_destroyed(&location, &tx_hash);

                let successes = self.stats.blocks_destroyed;
                if self.tracker.should_resync(successes) {
                    match self
                        .tracker
                        .resync_from_chain(&*self.chain, self.options.drone_id)
                        .await
                    {
                        Ok(battery) => tracing::debug!(
                            target: "miner",
                            current = battery.current,
                            max = battery.max,
                            "battery resynced"
                        ),
                        Err(e) => tracing::warn!(
                            target: "miner",
                            error = %e,
                            "battery resync failed, keeping local estimate"
                        ),
                    }
                }
                if successes % self.options.persist_interval.max(1) == 0 {
                    self.persist();
                }
            }
            DestroyOutcome::AlreadyProcessed => {
                self.stats.already_destroyed += 1;
                mining_metrics().inc_already_processed();
                self.events.on_already_processed(&location);
            }
            DestroyOutcome::Failed { kind, tx_hash } => {
                let message = match &tx_hash {
                    Some(hash) => format!("{} (tx {})", kind, hash),
                    None => kind.to_string(),
                };
                self.stats.errors += 1;
                self.stats.last_error = Some(message.clone());
                error_metrics().inc_error("outcome", kind.code());
                self.events.on_error(&message);

                match kind.recovery() {
                    Recovery::Refresh => self.cache.invalidate(),
                    Recovery::Terminate => {
                        self.depleted = true;
                        self.events.on_resource_depleted();
                        self.set_state(MinerState::Stopping);
                    }
                    Recovery::Ignore | Recovery::Retry => {}
                }
            }
        }
    }

    fn record_exception(&mut self, error: MinerError) {
        let message = error.to_string();
        tracing::warn!(target: "miner", code = error.code(), error = %message, "iteration failed");
        self.stats.errors += 1;
        error_metrics().inc_error("exception", error.code());
        self.events.on_error(&message);
        if classify(&message).is_capability_related() {
            self.cache.invalidate();
        }
        self.stats.last_error = Some(message);
    }

    fn persist(&self) {
        let snapshot = SessionSnapshot {
            process_id: std::process::id(),
            start_time: self.stats.started_at,
            stats: self.stats.clone(),
        };
        if let Err(e) = self.state_sink.save(&snapshot) {
            tracing::warn!(target: "miner", error = %e, "failed to persist session snapshot");
        }
    }
}
