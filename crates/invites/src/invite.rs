//! Operator invite lifecycle.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use veridoc_access::{AdminLevel, OperatorAccount, Permission};
use veridoc_core::{EmailAddress, EngineError, EngineResult};

/// Invite validity window.
pub const INVITE_TTL_HOURS: i64 = 48;

/// Opaque, unique invite token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteToken(String);

impl InviteToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for InviteToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted invite status.
///
/// Expiry is **not** a stored status: it is computed at read time from
/// `expires_at`, so no background job is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Revoked,
}

/// An operator invite carrying a permission snapshot.
///
/// Once accepted, revoked, or expired an invite never returns to pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub token: InviteToken,
    pub email: EmailAddress,
    pub level: AdminLevel,
    /// Permission snapshot taken at issue time; becomes the explicit
    /// permission list of the account created on acceptance.
    pub permissions: BTreeSet<Permission>,
    pub invited_by: EmailAddress,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: InviteStatus,
    pub accepted_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Invite {
    /// Issue a new invite.
    ///
    /// Only a `Super`-level actor may issue operator invites. This is a
    /// level check, not a permission-id check: the invite grants
    /// operator-lifecycle power, which explicit permission lists must not be
    /// able to confer.
    pub fn issue(
        actor: &OperatorAccount,
        email: EmailAddress,
        level: AdminLevel,
        permissions: BTreeSet<Permission>,
        token: InviteToken,
        now: DateTime<Utc>,
    ) -> EngineResult<Invite> {
        actor.require_level(AdminLevel::Super)?;

        Ok(Invite {
            token,
            email,
            level,
            permissions,
            invited_by: actor.email.clone(),
            created_at: now,
            expires_at: now + Duration::hours(INVITE_TTL_HOURS),
            status: InviteStatus::Pending,
            accepted_at: None,
            revoked_at: None,
        })
    }

    /// Whether this invite can still be accepted at `now`.
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.status == InviteStatus::Pending && now <= self.expires_at
    }

    /// Consume the invite.
    ///
    /// Replay-safe: accepting an already-accepted, revoked, or expired
    /// invite fails and leaves the record unchanged.
    pub fn accept(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        match self.status {
            InviteStatus::Accepted => return Err(EngineError::conflict("invite already accepted")),
            InviteStatus::Revoked => return Err(EngineError::conflict("invite was revoked")),
            InviteStatus::Pending => {}
        }
        if now > self.expires_at {
            return Err(EngineError::conflict("invite has expired"));
        }

        self.status = InviteStatus::Accepted;
        self.accepted_at = Some(now);
        Ok(())
    }

    /// Revoke a pending invite.
    pub fn revoke(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        match self.status {
            InviteStatus::Accepted => return Err(EngineError::conflict("invite already accepted")),
            InviteStatus::Revoked => return Err(EngineError::conflict("invite already revoked")),
            InviteStatus::Pending => {}
        }

        self.status = InviteStatus::Revoked;
        self.revoked_at = Some(now);
        Ok(())
    }

    /// Build the operator account an accepted invite materializes into.
    pub fn into_account(self, display_name: String) -> OperatorAccount {
        OperatorAccount {
            email: self.email,
            display_name,
            level: self.level,
            permissions: self.permissions,
            status: Default::default(),
        }
    }
}

/// Soft-delete record: the full invite snapshot plus who removed it and why.
///
/// Invites are never physically discarded; deletion moves them into the
/// audit trash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashedInvite {
    pub invite: Invite,
    pub deleted_by: EmailAddress,
    pub reason: String,
    pub deleted_at: DateTime<Utc>,
}

impl TrashedInvite {
    pub fn new(
        invite: Invite,
        deleted_by: EmailAddress,
        reason: impl Into<String>,
        deleted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            invite,
            deleted_by,
            reason: reason.into(),
            deleted_at,
        }
    }
}
