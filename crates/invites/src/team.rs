//! Client-scoped team invites and members.
//!
//! Same shape as operator invites, but scoped to one client's own team and
//! gated by that client's verification state. Issuance is refused while the
//! client is not fully verified, and a verification downgrade cancels every
//! still-pending invite for that client.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use veridoc_core::{EmailAddress, EngineError, EngineResult};

use crate::invite::{INVITE_TTL_HOURS, InviteToken};

/// Cancellation reason recorded when a verification downgrade cascades into
/// the client's pending invites.
pub const CANCEL_REASON_VERIFICATION_REVOKED: &str = "verification-revoked";

/// Team invite status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum TeamInviteStatus {
    Pending,
    Accepted,
    Cancelled { reason: String },
}

/// An invite into one client's team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInvite {
    pub token: InviteToken,
    /// Owning client (tenant scope for the invite).
    pub client: EmailAddress,
    pub email: EmailAddress,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: TeamInviteStatus,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl TeamInvite {
    /// Issue a team invite for a client.
    ///
    /// `fully_verified` is the client's derived verification flag at call
    /// time; issuance is permitted only when it is set.
    pub fn issue(
        client: EmailAddress,
        email: EmailAddress,
        token: InviteToken,
        fully_verified: bool,
        now: DateTime<Utc>,
    ) -> EngineResult<TeamInvite> {
        if !fully_verified {
            return Err(EngineError::validation(
                "client must be fully verified before inviting team members",
            ));
        }

        Ok(TeamInvite {
            token,
            client,
            email,
            created_at: now,
            expires_at: now + Duration::hours(INVITE_TTL_HOURS),
            status: TeamInviteStatus::Pending,
            accepted_at: None,
        })
    }

    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.status == TeamInviteStatus::Pending && now <= self.expires_at
    }

    /// Consume the invite, producing the team member it materializes into.
    pub fn accept(&mut self, display_name: String, now: DateTime<Utc>) -> EngineResult<TeamMember> {
        match &self.status {
            TeamInviteStatus::Accepted => {
                return Err(EngineError::conflict("team invite already accepted"));
            }
            TeamInviteStatus::Cancelled { .. } => {
                return Err(EngineError::conflict("team invite was cancelled"));
            }
            TeamInviteStatus::Pending => {}
        }
        if now > self.expires_at {
            return Err(EngineError::conflict("team invite has expired"));
        }

        self.status = TeamInviteStatus::Accepted;
        self.accepted_at = Some(now);

        Ok(TeamMember {
            client: self.client.clone(),
            email: self.email.clone(),
            display_name,
            joined_at: now,
        })
    }

    /// Cancel a pending invite with a reason. Not valid on consumed invites.
    pub fn cancel(&mut self, reason: impl Into<String>) -> EngineResult<()> {
        match &self.status {
            TeamInviteStatus::Accepted => {
                return Err(EngineError::conflict("team invite already accepted"));
            }
            TeamInviteStatus::Cancelled { .. } => {
                return Err(EngineError::conflict("team invite already cancelled"));
            }
            TeamInviteStatus::Pending => {}
        }

        self.status = TeamInviteStatus::Cancelled {
            reason: reason.into(),
        };
        Ok(())
    }
}

/// A member of a client's team, materialized from an accepted invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub client: EmailAddress,
    pub email: EmailAddress,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
}

/// Cascade reducer: cancel every currently-pending invite for a client after
/// a verification downgrade. Accepted invites are untouched. Returns the
/// number of invites cancelled. Idempotent: re-running over the same slice
/// cancels nothing further.
pub fn cancel_pending_for_client(invites: &mut [TeamInvite], now: DateTime<Utc>) -> usize {
    let mut cancelled = 0;
    for invite in invites.iter_mut() {
        if invite.is_pending(now) && invite.cancel(CANCEL_REASON_VERIFICATION_REVOKED).is_ok() {
            cancelled += 1;
        }
    }
    cancelled
}
