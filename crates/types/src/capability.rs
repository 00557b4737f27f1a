// Path: crates/types/src/capability.rs
//! Capability tokens: signed, time-boxed, budget-limited authorizations scoped to
//! a single (wallet, drone) pair.

use serde::{Deserialize, Deserializer, Serialize};

bitflags::bitflags! {
    /// A bitmask of the operation categories a capability permits.
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[serde(from = "u8", into = "u8")]
    pub struct AllowedModes: u8 {
        /// Destroying blocks.
        const MINE = 0b0001;
        /// Spending rewards.
        const SPEND = 0b0010;
        /// Inscribing messages.
        const INSCRIBE = 0b0100;
    }
}

impl From<u8> for AllowedModes {
    fn from(bits: u8) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl From<AllowedModes> for u8 {
    fn from(modes: AllowedModes) -> Self {
        modes.bits()
    }
}

/// An authorization issued by the capability service. Immutable once issued.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    /// The authorized signer address.
    pub wallet: String,
    /// Permitted operation categories.
    pub allowed_modes: AllowedModes,
    /// Unique per-issuance counter preventing replay.
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub nonce: u64,
    /// Start of the validity window (unix seconds, inclusive).
    pub issued_at: u64,
    /// End of the validity window (unix seconds, exclusive).
    pub expires_at: u64,
    /// Maximum number of chargeable operations this token authorizes.
    pub budget: u32,
}

impl Capability {
    /// Returns true if `now` falls inside `[issued_at, expires_at)`.
    pub fn is_valid_at(&self, now: u64) -> bool {
        now >= self.issued_at && now < self.expires_at
    }

    /// Seconds left before expiry, saturating at zero.
    pub fn seconds_remaining(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}

/// A capability paired with the service's signature over its fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SignedCapability {
    /// The authorization itself.
    pub capability: Capability,
    /// 0x-prefixed hex signature, verified on-chain.
    pub signature: String,
}

/// The JSON body posted to `{endpoint}/capability`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRequest {
    /// The wallet the token is requested for.
    pub wallet: String,
    /// The requested operation categories.
    pub allowed_modes: AllowedModes,
    /// The drone (license) the token is scoped to.
    pub drone_id: u64,
}

// Nonces are chain-width integers and some issuers send them as decimal strings.
fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.trim().parse::<u64>().map_err(serde::de::Error::custom),
    }
}
