// Path: crates/cli/src/commands/mine.rs

use crate::commands::validate::print_setup;
use crate::util;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use drone_api::state::StateSink;
use drone_client::HttpCapabilityService;
use drone_core::cache::CapabilityCache;
use drone_core::clock::SystemClock;
use drone_core::executor::TransactionExecutor;
use drone_core::miner::{Miner, MinerOptions};
use drone_core::session::validate_setup;
use drone_core::state::JsonFileStateSink;
use drone_core::tracker::ResourceTracker;
use drone_core::LogEventSink;
use drone_types::config::MinerConfig;
use drone_types::stats::{SessionReport, ShutdownReason};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Parser, Debug)]
pub struct MineArgs {
    /// Overrides `drone_id` from the config file.
    #[clap(long)]
    pub drone_id: Option<u64>,

    /// Stop after this many iterations.
    #[clap(long)]
    pub max_blocks: Option<u64>,

    /// Seed for target selection, for reproducible runs.
    #[clap(long)]
    pub seed: Option<u64>,
}

pub async fn run(mut config: MinerConfig, args: MineArgs) -> Result<()> {
    if let Some(id) = args.drone_id {
        config.drone_id = id;
    }
    if args.max_blocks.is_some() {
        config.mining.max_blocks = args.max_blocks;
    }
    let drone_id = config.drone_id;

    let metrics_shutdown = start_metrics(&config)?;

    let (chain, wallet) = util::connect_chain(&config)?;
    let setup = validate_setup(
        &*chain,
        drone_id,
        &wallet,
        config.mining.min_balance_wei.map(u128::from),
    )
    .await
    .context("Setup validation failed")?;
    print_setup(&setup);

    let state_sink = Arc::new(JsonFileStateSink::new(&config.state_file));
    state_sink
        .clear()
        .with_context(|| format!("Failed to clear {}", config.state_file.display()))?;

    let service = Arc::new(
        HttpCapabilityService::new(&config.capability_endpoint, util::http_timeout(&config))
            .context("Failed to build capability client")?,
    );
    let cache = CapabilityCache::new(service, Arc::new(SystemClock), wallet.clone(), drone_id)
        .with_safety_margin(config.mining.capability_safety_margin_secs);
    let tracker = ResourceTracker::from_status(&setup.license)
        .with_resync_interval(config.mining.resync_interval);
    let executor = TransactionExecutor::new(chain.clone())
        .with_gas_limit(config.mining.gas_limit)
        .with_receipt_timeout(Duration::from_secs(config.mining.receipt_timeout_secs));

    let mut options = MinerOptions::from_config(&config.mining, drone_id, setup.fee_per_operation);
    options.seed = args.seed;

    let mut miner = Miner::new(options, chain, cache, tracker)
        .with_executor(executor)
        .with_event_sink(Arc::new(LogEventSink))
        .with_state_sink(state_sink.clone());

    let stop = miner.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(target: "cli", "Ctrl-C received, stopping after the current iteration");
            stop.stop();
        }
    });

    println!("Mining with drone #{}. Press Ctrl-C to stop.", drone_id);
    drone_telemetry::http::set_ready(true);
    let report = miner.run().await;
    drone_telemetry::http::set_ready(false);

    if let Err(e) = state_sink.clear() {
        tracing::warn!(target: "cli", error = %e, "Failed to clear session state");
    }
    if let Some(tx) = metrics_shutdown {
        let _ = tx.send(());
    }

    print_report(&report);
    Ok(())
}

/// Installs the Prometheus sink and serves it when a listen address is configured.
fn start_metrics(config: &MinerConfig) -> Result<Option<oneshot::Sender<()>>> {
    let Some(addr) = &config.telemetry.metrics_listen_address else {
        return Ok(None);
    };
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid metrics_listen_address '{}'", addr))?;
    let sink = drone_telemetry::prometheus::install()?;
    drone_telemetry::sinks::SINK
        .set(sink)
        .map_err(|_| anyhow!("Metrics sink was already installed"))?;

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(drone_telemetry::http::run_server(addr, async move {
        let _ = rx.await;
    }));
    Ok(Some(tx))
}

fn print_report(report: &SessionReport) {
    let stats = &report.stats;
    match report.reason {
        ShutdownReason::Depleted => println!("Shift complete: battery depleted."),
        ShutdownReason::Stopped => println!("Session stopped."),
    }
    println!("  Destroyed:         {}", stats.blocks_destroyed);
    println!("  Already destroyed: {}", stats.already_destroyed);
    println!("  Errors:            {}", stats.errors);
    println!("  Capability fetches: {}", stats.capability_refreshes);
    if let Some(err) = &stats.last_error {
        println!("  Last error:        {}", err);
    }
}
