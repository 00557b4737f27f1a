// Path: crates/cli/src/commands/status.rs

use crate::util;
use anyhow::{Context, Result};
use clap::Parser;
use drone_api::chain::ChainReader;
use drone_api::state::StateSink;
use drone_core::state::JsonFileStateSink;
use drone_types::config::MinerConfig;

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Overrides `drone_id` from the config file.
    #[clap(long)]
    pub drone_id: Option<u64>,

    /// Only read the local snapshot; do not contact the chain.
    #[clap(long)]
    pub offline: bool,

    /// Print the snapshot as JSON.
    #[clap(long)]
    pub json: bool,
}

pub async fn run(config: MinerConfig, args: StatusArgs) -> Result<()> {
    let sink = JsonFileStateSink::new(&config.state_file);
    let snapshot = sink
        .load()
        .with_context(|| format!("Failed to read {}", config.state_file.display()))?;

    match (&snapshot, args.json) {
        (Some(snapshot), true) => println!("{}", serde_json::to_string_pretty(snapshot)?),
        (Some(snapshot), false) => {
            let stats = &snapshot.stats;
            println!("Session (pid {}):", snapshot.process_id);
            println!("  Started:   {}", snapshot.start_time);
            println!("  Destroyed: {}", stats.blocks_destroyed);
            println!("  Already:   {}", stats.already_destroyed);
            println!("  Errors:    {}", stats.errors);
            println!("  Refreshes: {}", stats.capability_refreshes);
            if let Some(err) = &stats.last_error {
                println!("  Last error: {}", err);
            }
        }
        (None, true) => println!("null"),
        (None, false) => println!("No active session."),
    }

    if args.offline || args.json {
        return Ok(());
    }

    let drone_id = args.drone_id.unwrap_or(config.drone_id);
    let (chain, _wallet) = util::connect_chain(&config)?;
    let status = chain
        .license_status(drone_id)
        .await
        .context("Failed to read license status")?;
    let owner = chain
        .owner_of(drone_id)
        .await
        .context("Failed to read drone owner")?;
    let battery = status.battery();
    println!("Drone #{}:", drone_id);
    println!("  Owner:    {}", owner);
    println!("  License:  tier {} level {}", status.tier, status.level);
    println!(
        "  Battery:  {}/{} ({}%)",
        battery.current,
        battery.max,
        battery.percent()
    );
    println!("  Lifetime: {} blocks destroyed", status.total_destroyed);
    Ok(())
}
