// Path: crates/cli/src/util.rs

use anyhow::{Context, Result};
use drone_api::chain::ChainClient;
use drone_types::config::MinerConfig;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable holding the hex-encoded signing key.
pub const PRIVATE_KEY_ENV: &str = "DRONE_MINER_PRIVATE_KEY";

const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

pub fn load_config(path: &Path) -> Result<MinerConfig> {
    MinerConfig::load(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

pub fn http_timeout(config: &MinerConfig) -> Duration {
    Duration::from_secs(config.http_timeout_secs)
}

/// Connects a signing chain client and returns it with the signer's address.
pub fn connect_chain(config: &MinerConfig) -> Result<(Arc<dyn ChainClient>, String)> {
    let key = std::env::var(PRIVATE_KEY_ENV)
        .with_context(|| format!("{} is not set", PRIVATE_KEY_ENV))?;
    let client = drone_client::evm::connect(
        &config.rpc_url,
        &config.contract_address,
        &key,
        http_timeout(config),
    )
    .context("Failed to build chain client")?;
    let wallet = client.wallet();
    let chain: Arc<dyn ChainClient> = Arc::new(client);
    Ok((chain, wallet))
}

/// Formats a wei amount as ether with six decimals.
pub fn format_wei(wei: u128) -> String {
    let whole = wei / WEI_PER_ETH;
    let micro = (wei % WEI_PER_ETH) / 1_000_000_000_000;
    format!("{}.{:06} ETH", whole, micro)
}
