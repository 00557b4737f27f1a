// Path: crates/miner/tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use drone_api::capability::CapabilityService;
use drone_api::chain::{ChainReader, ChainWriter, DestroyCall, ReceiptStatus};
use drone_api::events::EventSink;
use drone_api::state::StateSink;
use drone_core::cache::CapabilityCache;
use drone_core::clock::ManualClock;
use drone_core::miner::{Miner, MinerOptions, StopHandle};
use drone_core::tracker::ResourceTracker;
use drone_types::capability::{Capability, CapabilityRequest, SignedCapability};
use drone_types::error::{CapabilityError, ChainError, StateSinkError};
use drone_types::license::{BatteryLevel, LicenseStatus};
use drone_types::location::Location;
use drone_types::stats::{MiningStats, SessionSnapshot};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DRONE_ID: u64 = 7;
pub const WALLET: &str = "0x00000000000000000000000000000000000000bb";
pub const FEE: u128 = 1_000;

/// A chain whose simulate results are scripted per call.
#[derive(Default)]
pub struct MockChain {
    script: Mutex<VecDeque<Option<String>>>,
    default_revert: Mutex<Option<String>>,
    receipt_failed: AtomicBool,
    submit_error: Mutex<Option<String>>,
    receipt_error: Mutex<Option<String>>,
    license_fails: AtomicBool,
    pub battery: AtomicU64,
    pub simulates: AtomicU64,
    pub submits: AtomicU64,
    pub license_reads: AtomicU64,
    pub last_value: AtomicU64,
}

impl MockChain {
    pub fn new(battery: u64) -> Arc<Self> {
        let chain = Self::default();
        chain.battery.store(battery, Ordering::SeqCst);
        Arc::new(chain)
    }

    /// Queues simulate results; `None` is a clean simulation.
    pub fn script(&self, results: impl IntoIterator<Item = Option<&'static str>>) {
        let mut q = self.script.lock().unwrap();
        q.extend(results.into_iter().map(|r| r.map(str::to_string)));
    }

    pub fn always_revert(&self, message: &str) {
        *self.default_revert.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_receipts(&self) {
        self.receipt_failed.store(true, Ordering::SeqCst);
    }

    /// Makes every submission fail with an RPC error carrying `message`.
    pub fn fail_submits(&self, message: &str) {
        *self.submit_error.lock().unwrap() = Some(message.to_string());
    }

    /// Makes every receipt wait fail with an RPC error carrying `message`.
    pub fn fail_receipt_waits(&self, message: &str) {
        *self.receipt_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_license_reads(&self) {
        self.license_fails.store(true, Ordering::SeqCst);
    }

    pub fn count(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn balance_of(&self, _address: &str) -> Result<u128, ChainError> {
        Ok(10 * FEE)
    }

    async fn is_authorized(&self, drone_id: u64, _wallet: &str) -> Result<bool, ChainError> {
        Ok(drone_id == DRONE_ID)
    }

    async fn license_status(&self, _drone_id: u64) -> Result<LicenseStatus, ChainError> {
        self.license_reads.fetch_add(1, Ordering::SeqCst);
        if self.license_fails.load(Ordering::SeqCst) {
            return Err(ChainError::Rpc("connection refused".into()));
        }
        Ok(LicenseStatus {
            tier: 1,
            level: 1,
            max_battery: 100,
            current_battery: self.battery.load(Ordering::SeqCst),
            total_destroyed: 0,
        })
    }

    async fn owner_of(&self, _drone_id: u64) -> Result<String, ChainError> {
        Ok(WALLET.into())
    }

    async fn fee_per_operation(&self) -> Result<u128, ChainError> {
        Ok(FEE)
    }
}

#[async_trait]
impl ChainWriter for MockChain {
    async fn simulate(&self, _call: &DestroyCall) -> Result<(), ChainError> {
        self.simulates.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.lock().unwrap().pop_front();
        let outcome = match scripted {
            Some(result) => result,
            None => self.default_revert.lock().unwrap().clone(),
        };
        match outcome {
            Some(msg) => Err(ChainError::Reverted(msg)),
            None => Ok(()),
        }
    }

    async fn submit(&self, call: &DestroyCall) -> Result<String, ChainError> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(msg) = self.submit_error.lock().unwrap().clone() {
            return Err(ChainError::Rpc(msg));
        }
        self.last_value.store(call.value as u64, Ordering::SeqCst);
        let _ = self
            .battery
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |b| Some(b.saturating_sub(1)));
        Ok(format!("0x{:064x}", n))
    }

    async fn wait_for_receipt(
        &self,
        _tx_hash: &str,
        _timeout: Duration,
    ) -> Result<ReceiptStatus, ChainError> {
        if let Some(msg) = self.receipt_error.lock().unwrap().clone() {
            return Err(ChainError::Rpc(msg));
        }
        if self.receipt_failed.load(Ordering::SeqCst) {
            Ok(ReceiptStatus::Failed)
        } else {
            Ok(ReceiptStatus::Success)
        }
    }
}

/// Issues capabilities with a fixed budget. Requests can be scripted to fail.
pub struct CountingService {
    pub calls: AtomicU64,
    budget: u32,
    expires_at: AtomicU64,
    script: Mutex<VecDeque<Option<CapabilityError>>>,
}

impl CountingService {
    pub fn new(budget: u32) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU64::new(0),
            budget,
            expires_at: AtomicU64::new(1_000_000),
            script: Mutex::new(VecDeque::new()),
        })
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Expiry stamped on capabilities issued from now on.
    pub fn set_expires_at(&self, expires_at: u64) {
        self.expires_at.store(expires_at, Ordering::SeqCst);
    }

    /// Queues per-request results; `None` issues a capability as usual.
    pub fn script(&self, results: impl IntoIterator<Item = Option<CapabilityError>>) {
        self.script.lock().unwrap().extend(results);
    }
}

#[async_trait]
impl CapabilityService for CountingService {
    async fn request(&self, req: &CapabilityRequest) -> Result<SignedCapability, CapabilityError> {
        let nonce = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(Some(error)) = self.script.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(SignedCapability {
            capability: Capability {
                wallet: req.wallet.clone(),
                allowed_modes: req.allowed_modes,
                nonce,
                issued_at: 1_000,
                expires_at: self.expires_at.load(Ordering::SeqCst),
                budget: self.budget,
            },
            signature: "0xabcd".into(),
        })
    }
}

/// Records every event it sees.
#[derive(Default)]
pub struct RecordingEvents {
    pub destroyed: Mutex<Vec<(Location, String)>>,
    pub already: AtomicU64,
    pub errors: Mutex<Vec<String>>,
    pub refreshes: Mutex<Vec<u32>>,
    pub depleted: AtomicU64,
    pub stats_updates: AtomicU64,
    /// Stops the miner once this many blocks are destroyed.
    pub stop_after: Mutex<Option<(u64, StopHandle)>>,
}

impl EventSink for RecordingEvents {
    fn on_destroyed(&self, location: &Location, tx_hash: &str) {
        self.destroyed
            .lock()
            .unwrap()
            .push((*location, tx_hash.to_string()));
    }

    fn on_already_processed(&self, _location: &Location) {
        self.already.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn on_capability_refresh(&self, budget: u32) {
        self.refreshes.lock().unwrap().push(budget);
    }

    fn on_resource_depleted(&self) {
        self.depleted.fetch_add(1, Ordering::SeqCst);
    }

    fn on_stats_updated(&self, stats: &MiningStats) {
        self.stats_updates.fetch_add(1, Ordering::SeqCst);
        if let Some((after, handle)) = self.stop_after.lock().unwrap().as_ref() {
            if stats.blocks_destroyed >= *after {
                handle.stop();
            }
        }
    }
}

/// Keeps every snapshot in memory.
#[derive(Default)]
pub struct MemoryState {
    pub saved: Mutex<Vec<SessionSnapshot>>,
}

impl StateSink for MemoryState {
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StateSinkError> {
        self.saved.lock().unwrap().push(snapshot.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StateSinkError> {
        self.saved.lock().unwrap().clear();
        Ok(())
    }

    fn load(&self) -> Result<Option<SessionSnapshot>, StateSinkError> {
        Ok(self.saved.lock().unwrap().last().cloned())
    }
}

pub struct Harness {
    pub chain: Arc<MockChain>,
    pub service: Arc<CountingService>,
    pub events: Arc<RecordingEvents>,
    pub state: Arc<MemoryState>,
    pub clock: Arc<ManualClock>,
    pub miner: Miner,
}

/// A miner with zero throttle, a fixed seed and an iteration cap.
pub fn harness(battery: u64, budget: u32, max_blocks: Option<u64>) -> Harness {
    harness_with(battery, budget, |options| {
        options.throttle = Duration::ZERO;
        options.max_blocks = max_blocks;
    })
}

/// A miner with a fixed seed and default options, adjusted by `configure`.
pub fn harness_with(
    battery: u64,
    budget: u32,
    configure: impl FnOnce(&mut MinerOptions),
) -> Harness {
    let chain = MockChain::new(battery);
    let service = CountingService::new(budget);
    let events = Arc::new(RecordingEvents::default());
    let state = Arc::new(MemoryState::default());
    let clock = Arc::new(ManualClock::new(1_000));

    let cache = CapabilityCache::new(service.clone(), clock.clone(), WALLET, DRONE_ID);
    let tracker = ResourceTracker::new(BatteryLevel {
        current: battery,
        max: 100,
    });
    let mut options = MinerOptions::new(DRONE_ID, FEE);
    options.seed = Some(42);
    configure(&mut options);

    let miner = Miner::new(options, chain.clone(), cache, tracker)
        .with_event_sink(events.clone())
        .with_state_sink(state.clone())
        .with_clock(clock.clone());

    Harness {
        chain,
        service,
        events,
        state,
        clock,
        miner,
    }
}
