//! External provider boundaries: identity verification and OTP delivery.
//!
//! Providers are async and fallible. A provider failure is terminal for the
//! attempt; the engine records the outcome and keeps no retry state.

use async_trait::async_trait;
use thiserror::Error;

use veridoc_core::EngineError;

/// Failure at an external provider boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Transport-level failure: timeout, connection refused, malformed
    /// response.
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    /// The provider answered but refused the request (quota, bad credentials,
    /// unsupported document type).
    #[error("provider rejected request: {0}")]
    Rejected(String),
}

impl From<ProviderError> for EngineError {
    fn from(err: ProviderError) -> Self {
        EngineError::provider(err.to_string())
    }
}

/// Result of an identity document check at the external verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCheckOutcome {
    /// Whether the document matched the supplied holder details.
    pub ok: bool,
    /// Human-readable provider message, recorded verbatim.
    pub message: String,
    /// The holder name the provider verified, when the check passed.
    pub verified_name: Option<String>,
}

/// External identity verification provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify_identity(
        &self,
        full_name: &str,
        id_type: &str,
        card_number: &str,
    ) -> Result<IdentityCheckOutcome, ProviderError>;
}

/// One-time-passcode delivery and verification provider.
#[async_trait]
pub trait OtpProvider: Send + Sync {
    async fn send_code(&self, recipient: &str) -> Result<(), ProviderError>;
    async fn verify_code(&self, recipient: &str, code: &str) -> Result<bool, ProviderError>;
}
