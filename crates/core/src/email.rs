//! Canonical email addresses.
//!
//! Every record in the engine is keyed by `(entity kind, email)`. Raw input
//! arrives in whatever casing and padding the upstream form produced, so the
//! canonical form (trimmed, lowercased) is enforced at construction and the
//! raw string is never stored.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A trimmed, lowercased email address.
///
/// Two addresses differing only in case or surrounding whitespace compare
/// equal. Validation is intentionally shallow (non-empty, contains `@`);
/// deliverability is the notification provider's problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> EngineResult<Self> {
        let canonical = raw.trim().to_lowercase();
        if canonical.is_empty() || !canonical.contains('@') {
            return Err(EngineError::validation(format!(
                "invalid email address: {raw:?}"
            )));
        }
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
