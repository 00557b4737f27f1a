// Path: crates/miner/src/classify.rs
//! Maps raw failure text from the chain client onto [`FailureKind`].
//!
//! Matching is case-insensitive and ordered: the first row whose needle occurs
//! in the message wins. "Capability budget too low" must therefore reach the
//! budget row before anything more generic, and a message mentioning both an
//! already-destroyed tile and an expired capability is idempotent.

use drone_types::outcome::FailureKind;
use once_cell::sync::Lazy;
use regex::Regex;

/// Longest message carried in [`FailureKind::Unknown`].
pub const MAX_UNKNOWN_LEN: usize = 200;

type Row = (&'static [&'static str], fn() -> FailureKind);

const TABLE: &[Row] = &[
    (&["already destroyed", "tile already"], || FailureKind::AlreadyProcessed),
    (&["capability expired"], || FailureKind::CapabilityExpired),
    (&["capability exhausted"], || FailureKind::CapabilityExhausted),
    (&["budget too low", "budget"], || FailureKind::BudgetExhausted),
    (&["not authorized"], || FailureKind::NotAuthorized),
    (&["invalid capability signature"], || FailureKind::InvalidSignature),
    (&["battery depleted", "shift ended"], || FailureKind::ResourceDepleted),
    (&["invalid container", "invalid tile"], || FailureKind::InvalidTarget),
    (&["jackpot fee"], || FailureKind::FeeTooLow),
];

static REVERT_REASON: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(?i)reverted with reason[:\s]+"?([^"]+)"?"#).ok());

/// Classifies a failure message. Pure; never panics.
pub fn classify(message: &str) -> FailureKind {
    let lower = message.to_lowercase();

    for (needles, kind) in TABLE {
        if needles.iter().any(|n| lower.contains(n)) {
            return kind();
        }
    }

    if let Some(reason) = revert_reason(message) {
        if reason.to_lowercase().contains("already") {
            return FailureKind::AlreadyProcessed;
        }
        return FailureKind::GenericRevert(reason);
    }

    FailureKind::Unknown(truncate(message, MAX_UNKNOWN_LEN))
}

fn revert_reason(message: &str) -> Option<String> {
    let re = REVERT_REASON.as_ref()?;
    let caps = re.captures(message)?;
    let reason = caps.get(1)?.as_str().trim();
    (!reason.is_empty()).then(|| reason.to_string())
}

fn truncate(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((idx, _)) => message.get(..idx).unwrap_or(message).to_string(),
        None => message.to_string(),
    }
}
