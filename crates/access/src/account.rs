//! Operator accounts and canonical normalization.
//!
//! Legacy operator records are loose: some carry `role`, some `level`, some
//! both; permission lists may reference ids that no longer exist; status is a
//! free-form string. [`OperatorAccount::normalize`] collapses all of that
//! into one canonical shape, which is the only shape the rest of the engine
//! ever sees.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use veridoc_core::{EmailAddress, EngineError, EngineResult};

use crate::catalog::{Permission, default_permissions, is_known_permission};
use crate::level::AdminLevel;

/// Operator account status (binary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OperatorStatus {
    /// Operator may act.
    #[default]
    Active,
    /// Operator is suspended; every permission check fails.
    Suspended,
}

impl OperatorStatus {
    /// Collapse a raw status string to the binary status.
    ///
    /// Only explicit suspension markers suspend; anything else (including
    /// unknown strings) reads as active, matching the legacy records.
    pub fn normalize(raw: &str) -> OperatorStatus {
        match raw.trim().to_lowercase().as_str() {
            "suspended" | "disabled" | "inactive" | "blocked" | "banned" | "0" | "false" => {
                OperatorStatus::Suspended
            }
            _ => OperatorStatus::Active,
        }
    }
}

/// A raw operator/invite record as persisted by the upstream platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOperatorRecord {
    pub email: String,
    pub display_name: String,
    /// Legacy role string (older records).
    pub role: Option<String>,
    /// Admin level string (newer records). Preferred over `role` when both
    /// are present.
    pub level: Option<String>,
    /// Explicit permission ids; may be empty (defaults apply) and may carry
    /// ids no longer in the catalog.
    pub permissions: Vec<String>,
    pub status: Option<String>,
}

/// Canonical operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorAccount {
    pub email: EmailAddress,
    pub display_name: String,
    pub level: AdminLevel,
    /// Sanitized explicit permission list. Empty means "use the level
    /// defaults"; see [`OperatorAccount::effective_permissions`].
    pub permissions: BTreeSet<Permission>,
    pub status: OperatorStatus,
}

impl OperatorAccount {
    /// Produce the canonical record used everywhere else in the engine.
    ///
    /// Unknown permission ids are dropped, not rejected: legacy records are
    /// read far more often than they are repaired.
    pub fn normalize(raw: &RawOperatorRecord) -> EngineResult<OperatorAccount> {
        let email = EmailAddress::parse(&raw.email)?;

        let level_source = raw
            .level
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(raw.role.as_deref())
            .unwrap_or("");
        let level = AdminLevel::normalize(level_source);

        let permissions = sanitize_permissions(&raw.permissions);
        let status = OperatorStatus::normalize(raw.status.as_deref().unwrap_or(""));

        Ok(OperatorAccount {
            email,
            display_name: raw.display_name.trim().to_string(),
            level,
            permissions,
            status,
        })
    }

    /// The permission set actually in force for this account.
    ///
    /// A non-empty explicit list wins; otherwise the level defaults apply.
    /// Always a subset of the catalog.
    pub fn effective_permissions(&self) -> BTreeSet<Permission> {
        if self.permissions.is_empty() {
            default_permissions(self.level)
        } else {
            self.permissions.clone()
        }
    }

    /// Pure predicate: does the effective set contain `id`?
    pub fn has_permission(&self, id: &str) -> bool {
        self.effective_permissions().iter().any(|p| p.as_str() == id)
    }

    /// Pure predicate: does the effective set contain any of `ids`?
    pub fn has_any_permission(&self, ids: &[&str]) -> bool {
        let effective = self.effective_permissions();
        ids.iter().any(|id| effective.iter().any(|p| p.as_str() == *id))
    }

    /// Authorization check for a mutating action.
    ///
    /// Suspended accounts fail every check regardless of their permission
    /// list.
    pub fn require_permission(&self, id: &str) -> EngineResult<()> {
        if self.status == OperatorStatus::Suspended {
            return Err(EngineError::authorization("account is suspended"));
        }
        if self.has_permission(id) {
            Ok(())
        } else {
            Err(EngineError::authorization(format!("missing permission '{id}'")))
        }
    }

    /// Level check for actions gated by level rather than a permission id
    /// (operator-lifecycle power).
    pub fn require_level(&self, level: AdminLevel) -> EngineResult<()> {
        if self.status == OperatorStatus::Suspended {
            return Err(EngineError::authorization("account is suspended"));
        }
        if self.level == level {
            Ok(())
        } else {
            Err(EngineError::authorization(format!(
                "requires {} level, account is {}",
                level, self.level
            )))
        }
    }

    pub fn suspend(&mut self) -> EngineResult<()> {
        if self.status == OperatorStatus::Suspended {
            return Err(EngineError::conflict("operator already suspended"));
        }
        self.status = OperatorStatus::Suspended;
        Ok(())
    }

    pub fn reactivate(&mut self) -> EngineResult<()> {
        if self.status == OperatorStatus::Active {
            return Err(EngineError::conflict("operator already active"));
        }
        self.status = OperatorStatus::Active;
        Ok(())
    }
}

/// Drop unknown ids and canonicalize the rest.
pub fn sanitize_permissions(ids: &[String]) -> BTreeSet<Permission> {
    ids.iter()
        .map(|id| id.trim().to_lowercase())
        .filter(|id| is_known_permission(id))
        .map(Permission::new)
        .collect()
}
