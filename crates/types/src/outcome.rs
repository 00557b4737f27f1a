// Path: crates/types/src/outcome.rs
//! Typed outcomes of a block destruction attempt and the recovery each implies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the mining loop reacts to a failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Not an error; count it and move on.
    Ignore,
    /// Drop the cached capability so the next iteration fetches a fresh one.
    Refresh,
    /// Count the error and continue with the next random target.
    Retry,
    /// End the session.
    Terminate,
}

/// A classified failure from simulation, submission or receipt wait.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "detail")]
pub enum FailureKind {
    /// The tile was destroyed by an earlier transaction.
    AlreadyProcessed,
    /// The capability's validity window has closed.
    CapabilityExpired,
    /// The capability's on-chain budget is spent.
    CapabilityExhausted,
    /// A budget check failed.
    BudgetExhausted,
    /// The wallet is not authorized for the drone.
    NotAuthorized,
    /// The contract rejected the capability signature.
    InvalidSignature,
    /// The license battery is empty; the shift is over.
    ResourceDepleted,
    /// The container or tile index was rejected.
    InvalidTarget,
    /// The value sent did not cover the jackpot fee.
    FeeTooLow,
    /// A revert with an explicit reason not covered above.
    GenericRevert(String),
    /// The transaction was mined but its receipt reports failure.
    RevertedOnChain,
    /// Nothing in the table matched; carries the (truncated) message.
    Unknown(String),
}

impl FailureKind {
    /// True for failures cured by fetching a new capability.
    pub fn is_capability_related(&self) -> bool {
        matches!(
            self,
            Self::CapabilityExpired
                | Self::CapabilityExhausted
                | Self::BudgetExhausted
                | Self::InvalidSignature
        )
    }

    /// True when the session cannot continue.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ResourceDepleted)
    }

    /// The recovery strategy for this kind.
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::AlreadyProcessed => Recovery::Ignore,
            k if k.is_terminal() => Recovery::Terminate,
            k if k.is_capability_related() => Recovery::Refresh,
            _ => Recovery::Retry,
        }
    }

    /// A stable, machine-readable label for logs and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyProcessed => "ALREADY_PROCESSED",
            Self::CapabilityExpired => "CAPABILITY_EXPIRED",
            Self::CapabilityExhausted => "CAPABILITY_EXHAUSTED",
            Self::BudgetExhausted => "BUDGET_EXHAUSTED",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::ResourceDepleted => "RESOURCE_DEPLETED",
            Self::InvalidTarget => "INVALID_TARGET",
            Self::FeeTooLow => "FEE_TOO_LOW",
            Self::GenericRevert(_) => "GENERIC_REVERT",
            Self::RevertedOnChain => "REVERTED_ON_CHAIN",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyProcessed => write!(f, "tile already destroyed"),
            Self::CapabilityExpired => write!(f, "capability expired"),
            Self::CapabilityExhausted => write!(f, "capability exhausted"),
            Self::BudgetExhausted => write!(f, "budget exhausted"),
            Self::NotAuthorized => write!(f, "wallet not authorized for drone"),
            Self::InvalidSignature => write!(f, "invalid capability signature"),
            Self::ResourceDepleted => write!(f, "battery depleted, shift ended"),
            Self::InvalidTarget => write!(f, "invalid target location"),
            Self::FeeTooLow => write!(f, "jackpot fee too low"),
            Self::GenericRevert(reason) => write!(f, "reverted: {}", reason),
            Self::RevertedOnChain => write!(f, "transaction reverted on-chain"),
            Self::Unknown(msg) => write!(f, "{}", msg),
        }
    }
}

/// The terminal result of one `destroy` call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum DestroyOutcome {
    /// The transaction was mined successfully.
    Destroyed {
        /// Hash of the confirmed transaction.
        tx_hash: String,
    },
    /// The tile had already been destroyed; an idempotent no-op.
    AlreadyProcessed,
    /// The attempt failed.
    Failed {
        /// Classified failure.
        kind: FailureKind,
        /// Hash of the submitted transaction, if submission happened.
        tx_hash: Option<String>,
    },
}

impl DestroyOutcome {
    /// Builds the outcome for a classified failure, folding the idempotent case.
    pub fn from_failure(kind: FailureKind, tx_hash: Option<String>) -> Self {
        match kind {
            FailureKind::AlreadyProcessed => Self::AlreadyProcessed,
            kind => Self::Failed { kind, tx_hash },
        }
    }

    /// True only for a confirmed destruction.
    pub fn success(&self) -> bool {
        matches!(self, Self::Destroyed { .. })
    }

    /// True for the idempotent already-destroyed outcome.
    pub fn already_processed(&self) -> bool {
        matches!(self, Self::AlreadyProcessed)
    }

    /// The transaction hash, when one exists.
    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            Self::Destroyed { tx_hash } => Some(tx_hash),
            Self::Failed { tx_hash, .. } => tx_hash.as_deref(),
            Self::AlreadyProcessed => None,
        }
    }

    /// The failure kind, for failed attempts.
    pub fn failure(&self) -> Option<&FailureKind> {
        match self {
            Self::Failed { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// A human-readable error, for failed attempts.
    pub fn error(&self) -> Option<String> {
        self.failure().map(|k| k.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_mapping() {
        assert_eq!(FailureKind::AlreadyProcessed.recovery(), Recovery::Ignore);
        assert_eq!(FailureKind::CapabilityExpired.recovery(), Recovery::Refresh);
        assert_eq!(FailureKind::CapabilityExhausted.recovery(), Recovery::Refresh);
        assert_eq!(FailureKind::BudgetExhausted.recovery(), Recovery::Refresh);
        assert_eq!(FailureKind::InvalidSignature.recovery(), Recovery::Refresh);
        assert_eq!(FailureKind::ResourceDepleted.recovery(), Recovery::Terminate);
        for k in [
            FailureKind::NotAuthorized,
            FailureKind::InvalidTarget,
            FailureKind::FeeTooLow,
            FailureKind::RevertedOnChain,
            FailureKind::GenericRevert("x".into()),
            FailureKind::Unknown("y".into()),
        ] {
            assert_eq!(k.recovery(), Recovery::Retry, "{:?}", k);
        }
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = DestroyOutcome::Destroyed {
            tx_hash: "0x01".into(),
        };
        assert!(ok.success());
        assert_eq!(ok.tx_hash(), Some("0x01"));
        assert!(ok.error().is_none());

        let folded = DestroyOutcome::from_failure(FailureKind::AlreadyProcessed, None);
        assert!(folded.already_processed());
        assert!(!folded.success());

        let reverted =
            DestroyOutcome::from_failure(FailureKind::RevertedOnChain, Some("0x02".into()));
        assert_eq!(reverted.tx_hash(), Some("0x02"));
        assert_eq!(
            reverted.error().as_deref(),
            Some("transaction reverted on-chain")
        );
    }
}
