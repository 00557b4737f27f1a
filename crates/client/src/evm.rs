// Path: crates/client/src/evm.rs
//! JSON-RPC client for the mining contract, built on `alloy`.
//!
//! Every request is bounded by a per-client timeout. Revert messages are
//! surfaced verbatim as [`ChainError::Reverted`] so the failure classifier can
//! match on the contract's reason strings.

use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::transports::http::{Client, Http};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use drone_api::chain::{ChainReader, ChainWriter, DestroyCall, ReceiptStatus};
use drone_telemetry::rpc_metrics;
use drone_types::capability::SignedCapability;
use drone_types::error::ChainError;
use drone_types::license::LicenseStatus;
use std::future::Future;
use std::str::FromStr;
use std::time::{Duration, Instant};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

sol! {
    #[sol(rpc)]
    contract DroneMiner {
        #[derive(Debug)]
        struct Capability {
            address wallet;
            uint8 allowedModes;
            uint256 nonce;
            uint64 issuedAt;
            uint64 expiresAt;
            uint32 budget;
        }

        function destroyBlock(
            uint256 droneId,
            uint256 containerId,
            uint256 tileId,
            Capability calldata cap,
            bytes calldata signature
        ) external payable;

        function isAuthorized(uint256 droneId, address wallet) external view returns (bool authorized);

        function getLicenseStatus(uint256 droneId)
            external
            view
            returns (uint8 tier, uint8 level, uint32 maxBattery, uint32 currentBattery, uint256 totalDestroyed);

        function ownerOf(uint256 droneId) external view returns (address owner);

        function jackpotFee() external view returns (uint256 fee);
    }
}

/// Chain client bound to one signer and one contract deployment.
#[derive(Clone, Debug)]
pub struct EvmChainClient<P> {
    provider: P,
    contract: Address,
    wallet: Address,
    request_timeout: Duration,
}

/// Builds a signing HTTP provider and wraps it in an [`EvmChainClient`].
pub fn connect(
    rpc_url: &str,
    contract: &str,
    private_key: &str,
    request_timeout: Duration,
) -> Result<EvmChainClient<impl Provider<Http<Client>> + Clone + 'static>> {
    let signer = PrivateKeySigner::from_str(private_key.trim().trim_start_matches("0x"))
        .map_err(|e| anyhow!("invalid private key: {}", e))?;
    let wallet = signer.address();
    let url = rpc_url
        .parse::<alloy::transports::http::reqwest::Url>()
        .with_context(|| format!("invalid rpc url '{}'", rpc_url))?;
    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);
    let contract = Address::from_str(contract)
        .map_err(|e| anyhow!("invalid contract address '{}': {}", contract, e))?;
    Ok(EvmChainClient {
        provider,
        contract,
        wallet,
        request_timeout,
    })
}

impl<P> EvmChainClient<P>
where
    P: Provider<Http<Client>> + Clone + 'static,
{
    /// The signer's address, checksummed.
    pub fn wallet(&self) -> String {
        self.wallet.to_checksum(None)
    }

    async fn timed<T, F>(&self, route: &'static str, fut: F) -> Result<T, ChainError>
    where
        F: Future<Output = Result<T, ChainError>>,
    {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(r) => r,
            Err(_) => Err(ChainError::Rpc(format!(
                "{} timed out after {}ms",
                route,
                self.request_timeout.as_millis()
            ))),
        };
        rpc_metrics().observe_request_duration(route, started.elapsed().as_secs_f64());
        rpc_metrics().inc_requests_total(route, if result.is_ok() { "ok" } else { "error" });
        result
    }
}

fn parse_address(s: &str) -> Result<Address, ChainError> {
    Address::from_str(s.trim()).map_err(|_| ChainError::InvalidHex(s.to_string()))
}

fn to_u128(v: U256) -> u128 {
    u128::try_from(v).unwrap_or(u128::MAX)
}

fn map_contract_error(err: alloy::contract::Error) -> ChainError {
    let msg = err.to_string();
    if msg.to_ascii_lowercase().contains("revert") {
        ChainError::Reverted(msg)
    } else {
        ChainError::Rpc(msg)
    }
}

fn encode_capability(
    signed: &SignedCapability,
) -> Result<(DroneMiner::Capability, Bytes), ChainError> {
    let cap = &signed.capability;
    let encoded = DroneMiner::Capability {
        wallet: parse_address(&cap.wallet)?,
        allowedModes: cap.allowed_modes.bits(),
        nonce: U256::from(cap.nonce),
        issuedAt: cap.issued_at,
        expiresAt: cap.expires_at,
        budget: cap.budget,
    };
    let signature = Bytes::from_str(&signed.signature)
        .map_err(|_| ChainError::InvalidHex(signed.signature.clone()))?;
    Ok((encoded, signature))
}

#[async_trait]
impl<P> ChainReader for EvmChainClient<P>
where
    P: Provider<Http<Client>> + Clone + 'static,
{
    async fn balance_of(&self, address: &str) -> Result<u128, ChainError> {
        let addr = parse_address(address)?;
        self.timed("chain.balance", async {
            let balance = self
                .provider
                .get_balance(addr)
                .await
                .map_err(|e| ChainError::Rpc(e.to_string()))?;
            Ok(to_u128(balance))
        })
        .await
    }

    async fn is_authorized(&self, drone_id: u64, wallet: &str) -> Result<bool, ChainError> {
        let wallet = parse_address(wallet)?;
        let miner = DroneMiner::new(self.contract, self.provider.clone());
        self.timed("chain.is_authorized", async {
            let ret = miner
                .isAuthorized(U256::from(drone_id), wallet)
                .call()
                .await
                .map_err(map_contract_error)?;
            Ok(ret.authorized)
        })
        .await
    }

    async fn license_status(&self, drone_id: u64) -> Result<LicenseStatus, ChainError> {
        let miner = DroneMiner::new(self.contract, self.provider.clone());
        self.timed("chain.license_status", async {
            let ret = miner
                .getLicenseStatus(U256::from(drone_id))
                .call()
                .await
                .map_err(map_contract_error)?;
            Ok(LicenseStatus {
                tier: ret.tier,
                level: ret.level,
                max_battery: u64::from(ret.maxBattery),
                current_battery: u64::from(ret.currentBattery),
                total_destroyed: u64::try_from(ret.totalDestroyed).unwrap_or(u64::MAX),
            })
        })
        .await
    }

    async fn owner_of(&self, drone_id: u64) -> Result<String, ChainError> {
        let miner = DroneMiner::new(self.contract, self.provider.clone());
        self.timed("chain.owner_of", async {
            let ret = miner
                .ownerOf(U256::from(drone_id))
                .call()
                .await
                .map_err(map_contract_error)?;
            Ok(ret.owner.to_checksum(None))
        })
        .await
    }

    async fn fee_per_operation(&self) -> Result<u128, ChainError> {
        let miner = DroneMiner::new(self.contract, self.provider.clone());
        self.timed("chain.fee", async {
            let ret = miner.jackpotFee().call().await.map_err(map_contract_error)?;
            Ok(to_u128(ret.fee))
        })
        .await
    }
}

#[async_trait]
impl<P> ChainWriter for EvmChainClient<P>
where
    P: Provider<Http<Client>> + Clone + 'static,
{
    async fn simulate(&self, call: &DestroyCall) -> Result<(), ChainError> {
        let (cap, signature) = encode_capability(&call.capability)?;
        let miner = DroneMiner::new(self.contract, self.provider.clone());
        self.timed("chain.simulate", async {
            miner
                .destroyBlock(
                    U256::from(call.drone_id),
                    U256::from(call.location.container_id),
                    U256::from(call.location.block_id),
                    cap,
                    signature,
                )
                .from(self.wallet)
                .value(U256::from(call.value))
                .call()
                .await
                .map_err(map_contract_error)?;
            Ok(())
        })
        .await
    }

    async fn submit(&self, call: &DestroyCall) -> Result<String, ChainError> {
        let (cap, signature) = encode_capability(&call.capability)?;
        let miner = DroneMiner::new(self.contract, self.provider.clone());
        self.timed("chain.submit", async {
            let pending = miner
                .destroyBlock(
                    U256::from(call.drone_id),
                    U256::from(call.location.container_id),
                    U256::from(call.location.block_id),
                    cap,
                    signature,
                )
                .value(U256::from(call.value))
                .gas(call.gas_limit)
                .send()
                .await
                .map_err(map_contract_error)?;
            Ok(format!("{:#x}", pending.tx_hash()))
        })
        .await
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: &str,
        timeout: Duration,
    ) -> Result<ReceiptStatus, ChainError> {
        let hash =
            B256::from_str(tx_hash).map_err(|_| ChainError::InvalidHex(tx_hash.to_string()))?;
        let started = Instant::now();
        let poll = async {
            loop {
                match self.provider.get_transaction_receipt(hash).await {
                    Ok(Some(receipt)) => {
                        let status = if receipt.status() {
                            ReceiptStatus::Success
                        } else {
                            ReceiptStatus::Failed
                        };
                        return Ok::<ReceiptStatus, ChainError>(status);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::debug!(target: "chain", tx = %tx_hash, error = %e, "receipt poll failed");
                    }
                }
                tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
            }
        };
        let result = tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| ChainError::ReceiptTimeout(timeout.as_secs(), tx_hash.to_string()))
            .and_then(|r| r);
        rpc_metrics().observe_request_duration("chain.receipt", started.elapsed().as_secs_f64());
        rpc_metrics().inc_requests_total("chain.receipt", if result.is_ok() { "ok" } else { "error" });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_types::capability::{AllowedModes, Capability};

    fn signed(wallet: &str, signature: &str) -> SignedCapability {
        SignedCapability {
            capability: Capability {
                wallet: wallet.into(),
                allowed_modes: AllowedModes::MINE,
                nonce: 9,
                issued_at: 100,
                expires_at: 700,
                budget: 50,
            },
            signature: signature.into(),
        }
    }

    #[test]
    fn test_encode_capability_fields() {
        let (cap, sig) = encode_capability(&signed(
            "0x00000000000000000000000000000000000000aa",
            "0xdeadbeef",
        ))
        .unwrap();
        assert_eq!(cap.allowedModes, 1);
        assert_eq!(cap.nonce, U256::from(9u64));
        assert_eq!(cap.expiresAt, 700);
        assert_eq!(cap.budget, 50);
        assert_eq!(sig.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_encode_capability_rejects_bad_hex() {
        let err = encode_capability(&signed("0xnothex", "0x00")).unwrap_err();
        assert!(matches!(err, ChainError::InvalidHex(_)));
        let err = encode_capability(&signed(
            "0x00000000000000000000000000000000000000aa",
            "0xzz",
        ))
        .unwrap_err();
        assert!(matches!(err, ChainError::InvalidHex(_)));
    }

    #[test]
    fn test_u256_narrowing_saturates() {
        assert_eq!(to_u128(U256::from(5u64)), 5);
        assert_eq!(to_u128(U256::MAX), u128::MAX);
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_inputs() {
        let key = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
        let addr = "0x00000000000000000000000000000000000000aa";
        assert!(connect("http://127.0.0.1:8545", addr, "0x1234", Duration::from_secs(1)).is_err());
        assert!(connect("not a url", addr, key, Duration::from_secs(1)).is_err());
        assert!(connect("http://127.0.0.1:8545", "0xabc", key, Duration::from_secs(1)).is_err());
        let client = connect("http://127.0.0.1:8545", addr, key, Duration::from_secs(1)).unwrap();
        assert!(client.wallet().starts_with("0x"));
    }
}
