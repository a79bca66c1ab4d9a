//! `veridoc-verification` — per-client three-step verification engine.
//!
//! Each client progresses through profile, identity, and business steps
//! independently. Identity is a two-party gate (automated check plus admin
//! approval); the derived fully-verified flag gates client team invites, and
//! every true-to-false transition of that flag emits
//! [`VerificationEvent::Downgraded`] for the cascade reducer.

pub mod client;

pub use client::{
    ApproveBusiness, ApproveIdentity, BusinessStep, BusinessType, ClientVerification,
    IdentityDocument, IdentityStep, ProfileDetails, RecordIdentityCheck, RevokeIdentityApproval,
    SetOverallStatus, SubmitBusinessDocument, SubmitIdentityDocument, SubmitProfile,
    UnlockIdentity, VerificationCommand, VerificationEvent,
};
