// Path: crates/miner/tests/mining_loop.rs
mod common;

use common::{harness, harness_with, MockChain};
use drone_core::miner::MinerState;
use drone_types::error::CapabilityError;
use drone_types::location::{CONTAINERS_PER_LAYER, TILES_PER_CONTAINER};
use drone_types::stats::ShutdownReason;
use proptest::prelude::*;
use std::sync::atomic::Ordering;
use std::time::Duration;

#[tokio::test]
async fn test_depleted_battery_ends_session_after_one_iteration() {
    let mut h = harness(50, 100, Some(10));
    h.chain
        .always_revert("execution reverted: Battery depleted - shift ended");

    let report = h.miner.run().await;

    assert_eq!(report.reason, ShutdownReason::Depleted);
    assert_eq!(report.stats.errors, 1);
    assert_eq!(report.stats.blocks_destroyed, 0);
    assert_eq!(h.events.depleted.load(Ordering::SeqCst), 1);
    assert_eq!(MockChain::count(&h.chain.simulates), 1);
    assert_eq!(MockChain::count(&h.chain.submits), 0);
    assert_eq!(h.miner.state(), MinerState::Stopped);
    assert!(!h.miner.is_running());
}

#[tokio::test]
async fn test_resync_happens_on_every_25th_success() {
    let mut h = harness(100, 1_000, Some(24));
    h.miner.run().await;
    assert_eq!(MockChain::count(&h.chain.license_reads), 0);

    let mut h = harness(100, 1_000, Some(25));
    h.miner.run().await;
    assert_eq!(MockChain::count(&h.chain.license_reads), 1);

    let mut h = harness(100, 1_000, Some(49));
    let report = h.miner.run().await;
    assert_eq!(report.stats.blocks_destroyed, 49);
    assert_eq!(MockChain::count(&h.chain.license_reads), 1);

    let mut h = harness(100, 1_000, Some(50));
    h.miner.run().await;
    assert_eq!(MockChain::count(&h.chain.license_reads), 2);
}

#[tokio::test]
async fn test_resync_replaces_local_estimate() {
    let mut h = harness(100, 1_000, Some(25));
    // The chain burns two units per block; the tracker only knows about one.
    h.chain.battery.store(60, Ordering::SeqCst);
    h.miner.run().await;
    assert_eq!(h.miner.battery().current, 35);
}

#[tokio::test]
async fn test_resync_failure_is_not_fatal() {
    let mut h = harness(100, 1_000, Some(30));
    h.chain.fail_license_reads();
    let report = h.miner.run().await;

    assert_eq!(report.reason, ShutdownReason::Stopped);
    assert_eq!(report.stats.blocks_destroyed, 30);
    assert_eq!(report.stats.errors, 0);
    assert_eq!(h.miner.battery().current, 70);
}

#[tokio::test]
async fn test_snapshots_every_ten_successes() {
    let mut h = harness(100, 1_000, Some(25));
    h.miner.run().await;

    let saved = h.state.saved.lock().unwrap();
    let counts: Vec<u64> = saved.iter().map(|s| s.stats.blocks_destroyed).collect();
    assert_eq!(counts, vec![10, 20]);
    assert!(saved.iter().all(|s| s.start_time == 1_000));
    assert!(saved.iter().all(|s| s.process_id == std::process::id()));
}

#[tokio::test]
async fn test_counters_and_events_across_outcomes() {
    let mut h = harness(100, 1_000, Some(5));
    h.chain.script([
        None,
        Some("execution reverted: Already destroyed"),
        Some("execution reverted: Invalid container"),
        None,
        Some("reverted with reason: \"Paused\""),
    ]);

    let report = h.miner.run().await;

    assert_eq!(report.reason, ShutdownReason::Stopped);
    assert_eq!(report.stats.blocks_destroyed, 2);
    assert_eq!(report.stats.already_destroyed, 1);
    assert_eq!(report.stats.errors, 2);
    assert_eq!(report.stats.attempts(), 5);
    assert_eq!(report.stats.last_error.as_deref(), Some("reverted: Paused"));
    assert_eq!(h.events.destroyed.lock().unwrap().len(), 2);
    assert_eq!(h.events.already.load(Ordering::SeqCst), 1);
    assert_eq!(h.events.errors.lock().unwrap().len(), 2);
    assert_eq!(h.events.stats_updates.load(Ordering::SeqCst), 5);
    assert_eq!(h.miner.battery().current, 98);
}

#[tokio::test]
async fn test_capability_failure_invalidates_cache() {
    let mut h = harness(100, 1_000, Some(3));
    h.chain
        .script([None, Some("execution reverted: Capability expired"), None]);

    let report = h.miner.run().await;

    assert_eq!(h.service.calls(), 2);
    assert_eq!(report.stats.capability_refreshes, 2);
    assert_eq!(*h.events.refreshes.lock().unwrap(), vec![1_000, 1_000]);
    assert_eq!(report.stats.blocks_destroyed, 2);
}

#[tokio::test]
async fn test_non_capability_failure_keeps_cache() {
    let mut h = harness(100, 1_000, Some(3));
    h.chain
        .script([None, Some("execution reverted: Invalid tile"), None]);

    let report = h.miner.run().await;

    assert_eq!(h.service.calls(), 1);
    assert_eq!(report.stats.capability_refreshes, 1);
}

#[tokio::test]
async fn test_small_budget_refreshes_each_time_it_runs_out() {
    let mut h = harness(100, 2, Some(6));
    let report = h.miner.run().await;
    assert_eq!(h.service.calls(), 3);
    assert_eq!(report.stats.capability_refreshes, 3);
}

fn http_error(status: u16, body: &str) -> CapabilityError {
    CapabilityError::Http {
        status,
        body: body.into(),
    }
}

#[tokio::test]
async fn test_capability_service_outage_is_counted_and_loop_continues() {
    let mut h = harness(100, 1_000, Some(3));
    h.service.script([Some(http_error(503, "down"))]);

    let report = h.miner.run().await;

    assert_eq!(report.reason, ShutdownReason::Stopped);
    assert_eq!(report.stats.errors, 1);
    assert_eq!(report.stats.blocks_destroyed, 2);
    assert_eq!(report.stats.capability_refreshes, 1);
    assert_eq!(
        report.stats.last_error.as_deref(),
        Some("capability service returned HTTP 503: down")
    );
    assert_eq!(h.service.calls(), 2);
    assert_eq!(MockChain::count(&h.chain.simulates), 2);
    assert_eq!(h.events.errors.lock().unwrap().len(), 1);
    assert_eq!(h.events.stats_updates.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_capability_related_fetch_error_invalidates_cache() {
    let mut h = harness(100, 1_000, Some(2));
    // Inside the 30s safety margin, so the second iteration must refetch.
    h.service.set_expires_at(1_020);
    h.service
        .script([None, Some(http_error(403, "Capability expired"))]);

    let report = h.miner.run().await;

    assert_eq!(report.stats.blocks_destroyed, 1);
    assert_eq!(report.stats.errors, 1);
    assert_eq!(h.service.calls(), 2);
    assert!(h.miner.cache().current().is_none());
    assert!(h.miner.cache().needs_refresh(1));
}

#[tokio::test]
async fn test_unrelated_fetch_error_keeps_stale_entry() {
    let mut h = harness(100, 1_000, Some(2));
    h.service.set_expires_at(1_020);
    h.service.script([None, Some(http_error(503, "down"))]);

    let report = h.miner.run().await;

    assert_eq!(report.stats.errors, 1);
    let cached = h.miner.cache().current().map(|c| c.capability.nonce);
    assert_eq!(cached, Some(1));
}

#[tokio::test]
async fn test_next_iteration_fetches_after_capability_error() {
    let mut h = harness(100, 1_000, Some(3));
    h.service.set_expires_at(1_020);
    h.service
        .script([None, Some(http_error(403, "Capability expired")), None]);

    let report = h.miner.run().await;

    assert_eq!(h.service.calls(), 3);
    assert_eq!(report.stats.blocks_destroyed, 2);
    assert_eq!(report.stats.capability_refreshes, 2);
    assert_eq!(
        h.miner.cache().current().map(|c| c.capability.nonce),
        Some(3)
    );
}

#[tokio::test(start_paused = true)]
async fn test_default_throttle_skips_sleep_after_depletion() {
    let mut h = harness_with(100, 1_000, |_| {});
    h.chain.script([
        None,
        None,
        Some("execution reverted: Battery depleted - shift ended"),
    ]);

    let started = tokio::time::Instant::now();
    let report = h.miner.run().await;

    assert_eq!(report.reason, ShutdownReason::Depleted);
    assert_eq!(report.stats.attempts(), 3);
    // Two 100ms pauses between three iterations, none after the last.
    assert_eq!(started.elapsed(), Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_zero_throttle_never_sleeps() {
    let mut h = harness(100, 1_000, Some(5));

    let started = tokio::time::Instant::now();
    h.miner.run().await;

    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn test_stop_before_run_executes_nothing() {
    let mut h = harness(100, 1_000, None);
    h.miner.stop_handle().stop();

    let report = h.miner.run().await;

    assert_eq!(report.reason, ShutdownReason::Stopped);
    assert_eq!(report.stats.attempts(), 0);
    assert_eq!(MockChain::count(&h.chain.simulates), 0);
    assert_eq!(h.miner.state(), MinerState::Stopped);
}

#[tokio::test]
async fn test_stop_is_observed_at_iteration_boundary() {
    let mut h = harness(100, 1_000, None);
    *h.events.stop_after.lock().unwrap() = Some((3, h.miner.stop_handle()));

    let report = h.miner.run().await;

    assert_eq!(report.reason, ShutdownReason::Stopped);
    assert_eq!(report.stats.blocks_destroyed, 3);
    assert_eq!(MockChain::count(&h.chain.simulates), 3);
}

#[tokio::test]
async fn test_stopped_is_terminal() {
    let mut h = harness(100, 1_000, Some(2));
    let first = h.miner.run().await;
    let second = h.miner.run().await;

    assert_eq!(first, second);
    assert_eq!(MockChain::count(&h.chain.simulates), 2);
}

#[tokio::test]
async fn test_targets_stay_in_bounds() {
    let mut h = harness(100, 1_000, Some(40));
    h.miner.run().await;
    for (location, _) in h.events.destroyed.lock().unwrap().iter() {
        assert!(location.container_id < CONTAINERS_PER_LAYER);
        assert!(location.block_id < TILES_PER_CONTAINER);
        assert!(location.in_bounds());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn battery_estimate_never_underflows(start in 0u64..20, iterations in 0u64..40) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let current = rt.block_on(async {
            let mut h = harness(start, 1_000, Some(iterations));
            h.miner.run().await;
            h.miner.battery().current
        });
        // The mock chain burns the same one unit per block, so a resync agrees.
        prop_assert_eq!(current, start.saturating_sub(iterations));
    }
}
