// Path: crates/miner/src/session.rs
//! Pre-flight checks run before the mining loop, and drone discovery.

use drone_api::chain::ChainReader;
use drone_types::error::SetupError;
use drone_types::license::LicenseStatus;
use futures::future::join_all;

/// Default number of concurrent `isAuthorized` lookups.
pub const DEFAULT_DISCOVERY_BATCH: usize = 10;

/// Everything the loop needs from a successful pre-flight check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub drone_id: u64,
    pub wallet: String,
    pub balance: u128,
    /// Fee attached to every destroy call for the session.
    pub fee_per_operation: u128,
    pub license: LicenseStatus,
}

/// Verifies that `wallet` can mine with `drone_id` right now.
///
/// The balance must cover `min_balance` or one operation's fee, whichever is
/// larger; the wallet must be owner or delegate; the battery must not be empty.
pub async fn validate_setup<C>(
    chain: &C,
    drone_id: u64,
    wallet: &str,
    min_balance: Option<u128>,
) -> Result<SetupReport, SetupError>
where
    C: ChainReader + ?Sized,
{
    let fee = chain.fee_per_operation().await?;
    let balance = chain.balance_of(wallet).await?;
    let required = min_balance.map_or(fee, |min| min.max(fee));
    if balance < required {
        return Err(SetupError::InsufficientFunds { balance, required });
    }

    if !chain.is_authorized(drone_id, wallet).await? {
        return Err(SetupError::NotAuthorized {
            drone_id,
            wallet: wallet.to_string(),
        });
    }

    let license = chain.license_status(drone_id).await?;
    if license.battery().is_empty() {
        return Err(SetupError::BatteryEmpty { drone_id });
    }

    tracing::info!(
        target: "setup",
        drone_id,
        wallet,
        balance = %balance,
        fee = %fee,
        battery = license.current_battery,
        max_battery = license.max_battery,
        "setup validated"
    );
    Ok(SetupReport {
        drone_id,
        wallet: wallet.to_string(),
        balance,
        fee_per_operation: fee,
        license,
    })
}

/// Returns the candidates `wallet` is authorized for, in candidate order.
///
/// Lookups run concurrently within each batch; a batch completes before the
/// next starts. A failed lookup counts as not authorized.
pub async fn discover_authorized_drones<C>(
    chain: &C,
    wallet: &str,
    candidates: &[u64],
    batch_size: usize,
) -> Vec<u64>
where
    C: ChainReader + ?Sized,
{
    let mut found = Vec::new();
    for batch in candidates.chunks(batch_size.max(1)) {
        let lookups = batch.iter().map(|&id| async move {
            match chain.is_authorized(id, wallet).await {
                Ok(authorized) => (id, authorized),
                Err(e) => {
                    tracing::warn!(target: "setup", drone_id = id, error = %e, "authorization lookup failed");
                    (id, false)
                }
            }
        });
        found.extend(
            join_all(lookups)
                .await
                .into_iter()
                .filter_map(|(id, ok)| ok.then_some(id)),
        );
    }
    found
}
