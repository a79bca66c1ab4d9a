//! `veridoc-invites` — operator invite lifecycle and client team invites.
//!
//! Operator invites carry a permission snapshot and a 48-hour window; client
//! team invites are the structurally analogous flow scoped to one client's
//! own team, gated by the client's verification state.

pub mod invite;
pub mod team;

pub use invite::{INVITE_TTL_HOURS, Invite, InviteStatus, InviteToken, TrashedInvite};
pub use team::{
    CANCEL_REASON_VERIFICATION_REVOKED, TeamInvite, TeamInviteStatus, TeamMember,
    cancel_pending_for_client,
};
