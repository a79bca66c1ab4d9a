//! Engine error model.

use thiserror::Error;

/// Result type used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine-level error.
///
/// Keep this focused on deterministic failures of the access-control and
/// verification core. The categories are deliberately coarse so callers can
/// decide between "form error", "not found", and "insufficient permissions"
/// rendering without string matching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed or missing input (empty justification, duplicate invite
    /// email, unknown permission id). Recovered locally, never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced account, invite, or document row is absent.
    #[error("not found")]
    NotFound,

    /// Actor lacks the required level or permission.
    ///
    /// Kept distinct from `Validation` so callers render "Insufficient
    /// Permissions" rather than a form error.
    #[error("insufficient permissions: {0}")]
    Authorization(String),

    /// State conflict: ambiguous document row match, replay of a consumed
    /// invite, token collision retries exhausted.
    #[error("conflict: {0}")]
    Conflict(String),

    /// External identity/OTP provider unreachable or rejecting. Terminal for
    /// the attempt; the engine keeps no retry state.
    #[error("provider failure: {0}")]
    Provider(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
