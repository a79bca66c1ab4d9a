//! Verification workflow service.
//!
//! Command pipeline: load the client's verification state, execute the
//! command deterministically, persist the evolved record with one write,
//! then publish the resulting events. The record is persisted before
//! publishing, so a publish failure never loses a state change.
//!
//! Also owns the client team-invite flow gated by the derived
//! fully-verified flag, and the cascade reducer that consumes `Downgraded`
//! events.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use veridoc_core::{EmailAddress, EngineError, EngineResult};
use veridoc_events::{EventBus, Subscription, execute};
use veridoc_invites::{TeamInvite, TeamMember, cancel_pending_for_client};
use veridoc_verification::{
    ClientVerification, RecordIdentityCheck, VerificationCommand, VerificationEvent,
};

use crate::providers::IdentityVerifier;
use crate::store::RecordStore;
use crate::token::issue_unique_token;

pub struct VerificationService<B> {
    verifications: Arc<dyn RecordStore<ClientVerification>>,
    team_invites: Arc<dyn RecordStore<Vec<TeamInvite>>>,
    team_members: Arc<dyn RecordStore<Vec<TeamMember>>>,
    bus: B,
}

impl<B> VerificationService<B>
where
    B: EventBus<VerificationEvent>,
{
    pub fn new(
        verifications: Arc<dyn RecordStore<ClientVerification>>,
        team_invites: Arc<dyn RecordStore<Vec<TeamInvite>>>,
        team_members: Arc<dyn RecordStore<Vec<TeamMember>>>,
        bus: B,
    ) -> Self {
        Self {
            verifications,
            team_invites,
            team_members,
            bus,
        }
    }

    /// Current verification state for a client; fresh state if nothing has
    /// been submitted yet.
    pub fn state_for(&self, client: &EmailAddress) -> ClientVerification {
        self.verifications
            .get(client)
            .unwrap_or_else(|| ClientVerification::empty(client.clone()))
    }

    /// Run one verification command through the load-execute-persist-publish
    /// pipeline.
    pub fn dispatch(&self, command: VerificationCommand) -> EngineResult<Vec<VerificationEvent>> {
        let client = command.client().clone();
        let mut state = self.state_for(&client);

        let events = execute(&mut state, &command)?;
        self.verifications.set(client.clone(), state);

        for event in events.clone() {
            self.bus
                .publish(event)
                .map_err(|err| EngineError::provider(format!("event publish failed: {err:?}")))?;
        }
        Ok(events)
    }

    /// Call the external identity verifier and record the outcome.
    ///
    /// A provider failure or timeout is recorded as a failed check, never
    /// surfaced as an engine error: the client re-uploads, the engine keeps
    /// no retry state.
    pub async fn run_identity_check<V>(
        &self,
        verifier: &V,
        client: EmailAddress,
        full_name: &str,
        id_type: &str,
        card_number: &str,
        deadline: Duration,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<VerificationEvent>>
    where
        V: IdentityVerifier + ?Sized,
    {
        let outcome =
            tokio::time::timeout(deadline, verifier.verify_identity(full_name, id_type, card_number))
                .await;

        let (passed, verified_name) = match outcome {
            Ok(Ok(result)) => {
                if !result.ok {
                    tracing::info!(client = %client, message = %result.message, "identity check failed");
                }
                (result.ok, result.verified_name)
            }
            Ok(Err(err)) => {
                tracing::warn!(client = %client, error = %err, "identity provider failed, recording failed check");
                (false, None)
            }
            Err(_) => {
                tracing::warn!(client = %client, "identity provider timed out, recording failed check");
                (false, None)
            }
        };

        self.dispatch(VerificationCommand::RecordIdentityCheck(
            RecordIdentityCheck {
                client,
                passed,
                verified_name,
                occurred_at: now,
            },
        ))
    }

    /// Issue a team invite for a client. Refused while the client is not
    /// fully verified.
    pub fn create_team_invite(
        &self,
        client: &EmailAddress,
        invitee: EmailAddress,
        now: DateTime<Utc>,
    ) -> EngineResult<TeamInvite> {
        let fully_verified = self.state_for(client).fully_verified();
        let mut invites = self.team_invites.get(client).unwrap_or_default();

        if invites
            .iter()
            .any(|inv| inv.email == invitee && inv.is_pending(now))
        {
            return Err(EngineError::validation(format!(
                "{} already has a pending team invite",
                invitee
            )));
        }

        let token =
            issue_unique_token(|candidate| invites.iter().any(|inv| &inv.token == candidate))?;
        let invite = TeamInvite::issue(client.clone(), invitee, token, fully_verified, now)?;

        invites.push(invite.clone());
        self.team_invites.set(client.clone(), invites);
        Ok(invite)
    }

    /// Accept a team invite by token, materializing the member.
    pub fn accept_team_invite(
        &self,
        client: &EmailAddress,
        token: &veridoc_invites::InviteToken,
        display_name: String,
        now: DateTime<Utc>,
    ) -> EngineResult<TeamMember> {
        let mut invites = self.team_invites.get(client).ok_or_else(EngineError::not_found)?;
        let invite = invites
            .iter_mut()
            .find(|inv| &inv.token == token)
            .ok_or_else(EngineError::not_found)?;

        let member = invite.accept(display_name, now)?;
        self.team_invites.set(client.clone(), invites);

        let mut members = self.team_members.get(client).unwrap_or_default();
        members.push(member.clone());
        self.team_members.set(client.clone(), members);
        Ok(member)
    }

    pub fn team_invites_for(&self, client: &EmailAddress) -> Vec<TeamInvite> {
        self.team_invites.get(client).unwrap_or_default()
    }

    pub fn team_members_for(&self, client: &EmailAddress) -> Vec<TeamMember> {
        self.team_members.get(client).unwrap_or_default()
    }

    /// Cascade reducer: react to one published event.
    ///
    /// Only `Downgraded` carries a reaction — every still-pending team
    /// invite for the client is cancelled. Idempotent, so at-least-once
    /// delivery is safe.
    pub fn apply_event(&self, event: &VerificationEvent, now: DateTime<Utc>) {
        if let VerificationEvent::Downgraded { client, .. } = event {
            let mut invites = self.team_invites.get(client).unwrap_or_default();
            let cancelled = cancel_pending_for_client(&mut invites, now);
            if cancelled > 0 {
                self.team_invites.set(client.clone(), invites);
                tracing::info!(
                    client = %client,
                    cancelled,
                    "verification downgrade cancelled pending team invites"
                );
            }
        }
    }

    /// Drain a subscription, applying every buffered event. Returns the
    /// number of events processed.
    pub fn drain_events(
        &self,
        subscription: &Subscription<VerificationEvent>,
        now: DateTime<Utc>,
    ) -> usize {
        let mut processed = 0;
        while let Ok(event) = subscription.try_recv() {
            self.apply_event(&event, now);
            processed += 1;
        }
        processed
    }
}
