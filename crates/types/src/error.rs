// Path: crates/types/src/error.rs
//! Core error types for the drone miner.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors from the remote capability service.
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// The service answered with a non-success status.
    #[error("capability service returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },
    /// The request never completed.
    #[error("capability request failed: {0}")]
    Transport(String),
    /// The response body could not be decoded.
    #[error("malformed capability response: {0}")]
    Decode(String),
    /// A freshly issued token cannot pay for the requested operation.
    #[error("capability budget {budget} is below operation cost {cost}")]
    BudgetBelowCost {
        /// Budget of the fresh token.
        budget: u32,
        /// Requested cost.
        cost: u32,
    },
}

impl ErrorCode for CapabilityError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http { .. } => "CAPABILITY_HTTP",
            Self::Transport(_) => "CAPABILITY_TRANSPORT",
            Self::Decode(_) => "CAPABILITY_DECODE",
            Self::BudgetBelowCost { .. } => "CAPABILITY_BUDGET_BELOW_COST",
        }
    }
}

/// Errors from chain reads and writes.
#[derive(Error, Debug)]
pub enum ChainError {
    /// The node or contract reverted the call. Carries the raw revert text.
    #[error("{0}")]
    Reverted(String),
    /// A transport or JSON-RPC failure.
    #[error("rpc error: {0}")]
    Rpc(String),
    /// The receipt did not arrive in time.
    #[error("timed out after {0}s waiting for receipt of {1}")]
    ReceiptTimeout(u64, String),
    /// An address or hash string could not be parsed.
    #[error("invalid hex value '{0}'")]
    InvalidHex(String),
}

impl ErrorCode for ChainError {
    fn code(&self) -> &'static str {
        match self {
            Self::Reverted(_) => "CHAIN_REVERTED",
            Self::Rpc(_) => "CHAIN_RPC",
            Self::ReceiptTimeout(..) => "CHAIN_RECEIPT_TIMEOUT",
            Self::InvalidHex(_) => "CHAIN_INVALID_HEX",
        }
    }
}

/// Pre-loop validation failures. Always fatal; reported before mining starts.
#[derive(Error, Debug)]
pub enum SetupError {
    /// The wallet cannot pay for a single operation.
    #[error("insufficient funds: balance {balance} wei, need at least {required} wei")]
    InsufficientFunds {
        /// Current balance.
        balance: u128,
        /// Required minimum.
        required: u128,
    },
    /// The wallet is neither owner nor delegate of the drone.
    #[error("wallet {wallet} is not authorized for drone #{drone_id}")]
    NotAuthorized {
        /// The drone checked.
        drone_id: u64,
        /// The wallet checked.
        wallet: String,
    },
    /// The battery is already empty.
    #[error("drone #{drone_id} battery is empty")]
    BatteryEmpty {
        /// The drone checked.
        drone_id: u64,
    },
    /// A chain read failed during validation.
    #[error("chain read failed during setup: {0}")]
    Chain(#[from] ChainError),
}

impl ErrorCode for SetupError {
    fn code(&self) -> &'static str {
        match self {
            Self::InsufficientFunds { .. } => "SETUP_INSUFFICIENT_FUNDS",
            Self::NotAuthorized { .. } => "SETUP_NOT_AUTHORIZED",
            Self::BatteryEmpty { .. } => "SETUP_BATTERY_EMPTY",
            Self::Chain(_) => "SETUP_CHAIN",
        }
    }
}

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path attempted.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The TOML did not parse.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range or missing.
    #[error("invalid config value for '{field}': {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "CONFIG_IO",
            Self::Parse(_) => "CONFIG_PARSE",
            Self::Invalid { .. } => "CONFIG_INVALID",
        }
    }
}

/// Failures from the durable state sink.
#[derive(Error, Debug)]
pub enum StateSinkError {
    /// Filesystem failure.
    #[error("state file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// Snapshot (de)serialization failure.
    #[error("state file encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ErrorCode for StateSinkError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "STATE_IO",
            Self::Encoding(_) => "STATE_ENCODING",
        }
    }
}

/// The umbrella error for one mining iteration or session.
#[derive(Error, Debug)]
pub enum MinerError {
    /// Capability acquisition failed.
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    /// A chain call failed.
    #[error(transparent)]
    Chain(#[from] ChainError),
    /// Setup validation failed.
    #[error(transparent)]
    Setup(#[from] SetupError),
    /// Configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Snapshot persistence failed.
    #[error(transparent)]
    State(#[from] StateSinkError),
}

impl ErrorCode for MinerError {
    fn code(&self) -> &'static str {
        match self {
            Self::Capability(e) => e.code(),
            Self::Chain(e) => e.code(),
            Self::Setup(e) => e.code(),
            Self::Config(e) => e.code(),
            Self::State(e) => e.code(),
        }
    }
}
