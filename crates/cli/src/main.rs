// Path: crates/cli/src/main.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Drone Miner CLI
//!
//! Runs mining sessions and the checks around them.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod util;

use commands::*;

#[derive(Parser, Debug)]
#[clap(
    name = "drone-miner",
    version,
    about = "Destroys blocks with a licensed drone until its battery runs out.",
    long_about = "Fetches signed capabilities, simulates and submits destroyBlock transactions, and tracks the license battery. The signing key is read from DRONE_MINER_PRIVATE_KEY."
)]
struct Cli {
    /// Path to the miner configuration file.
    #[clap(long, short, global = true, default_value = "miner.toml")]
    config: PathBuf,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate setup and run a mining session.
    Mine(mine::MineArgs),

    /// Run the pre-flight checks only.
    Validate(validate::ValidateArgs),

    /// List drones the configured wallet may mine with.
    Discover(discover::DiscoverArgs),

    /// Show the last session snapshot and the drone's on-chain status.
    Status(status::StatusArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = util::load_config(&cli.config)?;
    drone_telemetry::init::init_tracing(config.telemetry.log_format)?;

    match cli.command {
        Commands::Mine(args) => mine::run(config, args).await,
        Commands::Validate(args) => validate::run(config, args).await,
        Commands::Discover(args) => discover::run(config, args).await,
        Commands::Status(args) => status::run(config, args).await,
    }
}
