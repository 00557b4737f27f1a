// Path: crates/cli/src/commands/validate.rs

use crate::util;
use anyhow::{Context, Result};
use clap::Parser;
use drone_core::session::{validate_setup, SetupReport};
use drone_types::config::MinerConfig;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Overrides `drone_id` from the config file.
    #[clap(long)]
    pub drone_id: Option<u64>,
}

pub async fn run(config: MinerConfig, args: ValidateArgs) -> Result<()> {
    let drone_id = args.drone_id.unwrap_or(config.drone_id);
    let (chain, wallet) = util::connect_chain(&config)?;
    let report = validate_setup(
        &*chain,
        drone_id,
        &wallet,
        config.mining.min_balance_wei.map(u128::from),
    )
    .await
    .context("Setup validation failed")?;
    print_setup(&report);
    println!("Ready to mine.");
    Ok(())
}

pub fn print_setup(report: &SetupReport) {
    let battery = report.license.battery();
    println!("Drone #{}", report.drone_id);
    println!("  Wallet:   {}", report.wallet);
    println!("  Balance:  {}", util::format_wei(report.balance));
    println!("  Fee/op:   {}", util::format_wei(report.fee_per_operation));
    println!(
        "  License:  tier {} level {}",
        report.license.tier, report.license.level
    );
    println!(
        "  Battery:  {}/{} ({}%)",
        battery.current,
        battery.max,
        battery.percent()
    );
    println!("  Lifetime: {} blocks destroyed", report.license.total_destroyed);
}
