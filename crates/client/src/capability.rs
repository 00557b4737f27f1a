// Path: crates/client/src/capability.rs
//! Talks to `POST {endpoint}/capability`.

use crate::ascii_snippet;
use anyhow::Result;
use async_trait::async_trait;
use drone_api::capability::CapabilityService;
use drone_telemetry::rpc_metrics;
use drone_types::capability::{CapabilityRequest, SignedCapability};
use drone_types::error::CapabilityError;
use reqwest::Client;
use std::time::{Duration, Instant};

const ROUTE: &str = "capability";

/// Fetches capabilities from the remote signing service.
#[derive(Clone, Debug)]
pub struct HttpCapabilityService {
    endpoint: String,
    client: Client,
}

impl HttpCapabilityService {
    /// Creates a client for `endpoint` whose requests fail after `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    /// The full request URL.
    pub fn url(&self) -> String {
        format!("{}/capability", self.endpoint)
    }
}

#[async_trait]
impl CapabilityService for HttpCapabilityService {
    async fn request(&self, req: &CapabilityRequest) -> Result<SignedCapability, CapabilityError> {
        let started = Instant::now();
        let result = self.request_inner(req).await;
        rpc_metrics().observe_request_duration(ROUTE, started.elapsed().as_secs_f64());
        rpc_metrics().inc_requests_total(ROUTE, if result.is_ok() { "ok" } else { "error" });
        result
    }
}

impl HttpCapabilityService {
    async fn request_inner(
        &self,
        req: &CapabilityRequest,
    ) -> Result<SignedCapability, CapabilityError> {
        let url = self.url();
        tracing::debug!(
            target: "capability",
            url = %url,
            wallet = %req.wallet,
            drone_id = req.drone_id,
            "requesting capability"
        );
        let resp = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CapabilityError::Http {
                status: status.as_u16(),
                body: ascii_snippet(&body),
            });
        }

        let signed: SignedCapability = serde_json::from_str(&body).map_err(|e| {
            CapabilityError::Decode(format!("{}; body={}", e, ascii_snippet(&body)))
        })?;
        let sig_hex = signed.signature.trim_start_matches("0x");
        if sig_hex.is_empty() || hex::decode(sig_hex).is_err() {
            return Err(CapabilityError::Decode(format!(
                "signature is not hex: '{}'",
                signed.signature
            )));
        }
        Ok(signed)
    }
}
