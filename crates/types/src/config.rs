// Path: crates/types/src/config.rs
//! Miner configuration. Every tunable has a serde default so a minimal file only
//! names the endpoints and the drone.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level miner configuration (`miner.toml`).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MinerConfig {
    /// JSON-RPC endpoint of the chain node.
    pub rpc_url: String,
    /// Base URL of the capability service; requests go to `{endpoint}/capability`.
    pub capability_endpoint: String,
    /// Address of the mining contract.
    pub contract_address: String,
    /// The drone (license) to mine with.
    pub drone_id: u64,
    /// Where the session snapshot is written.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    /// Timeout applied to every capability and RPC HTTP request.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Mining loop tunables.
    #[serde(default)]
    pub mining: MiningConfig,
    /// Authorized-drone discovery tunables.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    /// Logging and metrics.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Mining loop tunables.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MiningConfig {
    /// Delay between iterations.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Gas limit for each destroy transaction.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Upper bound on the receipt wait.
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
    /// Resync the battery from chain every N successful operations.
    #[serde(default = "default_resync_interval")]
    pub resync_interval: u64,
    /// Persist a session snapshot every N successful operations.
    #[serde(default = "default_persist_interval")]
    pub persist_interval: u64,
    /// A cached capability is treated as expired this many seconds early.
    #[serde(default = "default_capability_safety_margin_secs")]
    pub capability_safety_margin_secs: u64,
    /// Budget units charged per destroy.
    #[serde(default = "default_operation_cost")]
    pub operation_cost: u32,
    /// Stop after this many iterations.
    #[serde(default)]
    pub max_blocks: Option<u64>,
    /// Minimum wallet balance required at startup. Defaults to one fee.
    #[serde(default)]
    pub min_balance_wei: Option<u64>,
}

fn default_state_file() -> PathBuf {
    PathBuf::from("./data/session.json")
}
fn default_http_timeout_secs() -> u64 {
    15
}
fn default_throttle_ms() -> u64 {
    100
}
fn default_gas_limit() -> u64 {
    500_000
}
fn default_receipt_timeout_secs() -> u64 {
    30
}
fn default_resync_interval() -> u64 {
    25
}
fn default_persist_interval() -> u64 {
    10
}
fn default_capability_safety_margin_secs() -> u64 {
    30
}
fn default_operation_cost() -> u32 {
    1
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            gas_limit: default_gas_limit(),
            receipt_timeout_secs: default_receipt_timeout_secs(),
            resync_interval: default_resync_interval(),
            persist_interval: default_persist_interval(),
            capability_safety_margin_secs: default_capability_safety_margin_secs(),
            operation_cost: default_operation_cost(),
            max_blocks: None,
            min_balance_wei: None,
        }
    }
}

/// Authorized-drone discovery tunables.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiscoveryConfig {
    /// Concurrent `isAuthorized` lookups per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Highest drone id probed.
    #[serde(default = "default_max_drone_id")]
    pub max_drone_id: u64,
}

fn default_batch_size() -> usize {
    10
}
fn default_max_drone_id() -> u64 {
    100
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_drone_id: default_max_drone_id(),
        }
    }
}

/// Log output format.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable lines.
    Text,
}

/// Logging and metrics configuration.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TelemetryConfig {
    /// Serve `/metrics` on this address when set (e.g. `127.0.0.1:9615`).
    #[serde(default)]
    pub metrics_listen_address: Option<String>,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

impl MinerConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Rejects values the miner cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &str) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            }
        }
        if self.rpc_url.trim().is_empty() {
            return Err(invalid("rpc_url", "must not be empty"));
        }
        if self.capability_endpoint.trim().is_empty() {
            return Err(invalid("capability_endpoint", "must not be empty"));
        }
        if !self.contract_address.starts_with("0x") || self.contract_address.len() != 42 {
            return Err(invalid(
                "contract_address",
                "must be a 0x-prefixed 20-byte hex address",
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(invalid("http_timeout_secs", "must be greater than zero"));
        }
        let m = &self.mining;
        if m.gas_limit == 0 {
            return Err(invalid("mining.gas_limit", "must be greater than zero"));
        }
        if m.receipt_timeout_secs == 0 {
            return Err(invalid("mining.receipt_timeout_secs", "must be greater than zero"));
        }
        if m.resync_interval == 0 {
            return Err(invalid("mining.resync_interval", "must be greater than zero"));
        }
        if m.persist_interval == 0 {
            return Err(invalid("mining.persist_interval", "must be greater than zero"));
        }
        if m.operation_cost == 0 {
            return Err(invalid("mining.operation_cost", "must be greater than zero"));
        }
        if self.discovery.batch_size == 0 {
            return Err(invalid("discovery.batch_size", "must be greater than zero"));
        }
        Ok(())
    }
}
