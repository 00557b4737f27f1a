// Path: crates/cli/src/commands/discover.rs

use crate::util;
use anyhow::{ensure, Result};
use clap::Parser;
use drone_api::chain::ChainReader;
use drone_core::session::discover_authorized_drones;
use drone_types::config::MinerConfig;

#[derive(Parser, Debug)]
pub struct DiscoverArgs {
    /// First drone id to check.
    #[clap(long, default_value_t = 1)]
    pub from: u64,

    /// Last drone id to check. Defaults to `discovery.max_drone_id`.
    #[clap(long)]
    pub to: Option<u64>,

    /// Concurrent lookups per batch. Defaults to `discovery.batch_size`.
    #[clap(long)]
    pub batch_size: Option<usize>,
}

pub async fn run(config: MinerConfig, args: DiscoverArgs) -> Result<()> {
    let to = args.to.unwrap_or(config.discovery.max_drone_id);
    ensure!(args.from <= to, "--from ({}) must not exceed --to ({})", args.from, to);
    let batch_size = args.batch_size.unwrap_or(config.discovery.batch_size);

    let (chain, wallet) = util::connect_chain(&config)?;
    let candidates: Vec<u64> = (args.from..=to).collect();
    tracing::info!(
        target: "cli",
        wallet = %wallet,
        from = args.from,
        to,
        batch_size,
        "discovering authorized drones"
    );
    let found = discover_authorized_drones(&*chain, &wallet, &candidates, batch_size).await;

    if found.is_empty() {
        println!("No drones in #{}..#{} are authorized for {}.", args.from, to, wallet);
        return Ok(());
    }
    println!("Authorized drones for {}:", wallet);
    for id in found {
        match chain.license_status(id).await {
            Ok(status) => {
                let battery = status.battery();
                println!(
                    "  #{:<6} battery {}/{} ({}%)",
                    id,
                    battery.current,
                    battery.max,
                    battery.percent()
                );
            }
            Err(e) => println!("  #{:<6} battery unavailable: {}", id, e),
        }
    }
    Ok(())
}
