// Path: crates/api/src/capability.rs
//! Defines the interface to the remote capability-issuing service.

use async_trait::async_trait;
use drone_types::capability::{CapabilityRequest, SignedCapability};
use drone_types::error::CapabilityError;

/// Issues signed capabilities. Each call is one network round-trip.
#[async_trait]
pub trait CapabilityService: Send + Sync {
    /// Requests a fresh capability for `(wallet, drone)`.
    ///
    /// A non-success response must surface as [`CapabilityError::Http`] carrying
    /// the status code and response body.
    async fn request(&self, req: &CapabilityRequest) -> Result<SignedCapability, CapabilityError>;
}
