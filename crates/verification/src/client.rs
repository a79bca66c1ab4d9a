use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use veridoc_core::{Aggregate, AggregateRoot, EmailAddress, EngineError};
use veridoc_events::Event;

/// Client business type.
///
/// `Individual` clients have no registration paperwork, so their business
/// step is always satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    #[default]
    Individual,
    Company,
    Partnership,
    Nonprofit,
}

impl BusinessType {
    pub fn is_individual(&self) -> bool {
        matches!(self, BusinessType::Individual)
    }
}

/// Client profile details.
///
/// The profile step is complete iff all four fields are present and
/// non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ProfileDetails {
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.phone, &self.address]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

/// Captured identity document fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDocument {
    pub doc_type: String,
    pub number: String,
    /// Reference to the uploaded file in external storage.
    pub file_ref: String,
}

/// Identity step sub-state: a two-party gate.
///
/// Complete iff the document is captured, the automated check has passed
/// (`verified_at` set), and an admin has approved. Approval locks the step;
/// edits are refused until an admin unlocks, and any permitted re-edit
/// clears both the automated result and the approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IdentityStep {
    pub document: Option<IdentityDocument>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_name: Option<String>,
    pub admin_approved: bool,
    pub locked: bool,
}

impl IdentityStep {
    pub fn is_complete(&self) -> bool {
        self.document.is_some() && self.verified_at.is_some() && self.admin_approved
    }
}

/// Business step sub-state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BusinessStep {
    /// Registration document file reference.
    pub registration_doc: Option<String>,
    pub admin_approved: bool,
    /// Free-form overall descriptor maintained by back-office tooling.
    pub overall_status: Option<String>,
}

impl BusinessStep {
    /// Whether the overall descriptor alone marks the client compliant.
    fn descriptor_approved(&self) -> bool {
        self.overall_status
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .is_some_and(|s| matches!(s.as_str(), "approved" | "verified" | "compliant"))
    }

    pub fn is_complete(&self, business_type: BusinessType) -> bool {
        if business_type.is_individual() {
            return true;
        }
        self.registration_doc.is_some() && (self.admin_approved || self.descriptor_approved())
    }
}

/// Aggregate root: one client's verification state.
///
/// # Invariants
/// - Steps flip independently; the state never auto-expires.
/// - The derived fully-verified flag is **not monotonic**: revocation
///   regresses it, and every true-to-false transition emits a
///   `Downgraded` event exactly once.
/// - A locked identity step rejects document edits until unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientVerification {
    client: EmailAddress,
    business_type: BusinessType,
    profile: ProfileDetails,
    identity: IdentityStep,
    business: BusinessStep,
    version: u64,
}

impl ClientVerification {
    /// Fresh state for a client with nothing submitted yet.
    pub fn empty(client: EmailAddress) -> Self {
        Self {
            client,
            business_type: BusinessType::default(),
            profile: ProfileDetails::default(),
            identity: IdentityStep::default(),
            business: BusinessStep::default(),
            version: 0,
        }
    }

    pub fn client(&self) -> &EmailAddress {
        &self.client
    }

    pub fn business_type(&self) -> BusinessType {
        self.business_type
    }

    pub fn profile(&self) -> &ProfileDetails {
        &self.profile
    }

    pub fn identity(&self) -> &IdentityStep {
        &self.identity
    }

    pub fn business(&self) -> &BusinessStep {
        &self.business
    }

    pub fn profile_complete(&self) -> bool {
        self.profile.is_complete()
    }

    pub fn identity_complete(&self) -> bool {
        self.identity.is_complete()
    }

    pub fn business_complete(&self) -> bool {
        self.business.is_complete(self.business_type)
    }

    /// Number of completed steps, out of three.
    pub fn completed_steps(&self) -> u8 {
        [
            self.profile_complete(),
            self.identity_complete(),
            self.business_complete(),
        ]
        .iter()
        .filter(|done| **done)
        .count() as u8
    }

    pub fn progress_ratio(&self) -> f64 {
        f64::from(self.completed_steps()) / 3.0
    }

    /// Derived flag gating client self-service (team invites).
    ///
    /// All three steps must be complete, and for non-individual clients the
    /// explicit admin business approval must be set — a descriptor-completed
    /// business step is not enough for the final gate.
    pub fn fully_verified(&self) -> bool {
        let final_business_approval =
            self.business_type.is_individual() || self.business.admin_approved;

        self.profile_complete()
            && self.identity_complete()
            && self.business_complete()
            && final_business_approval
    }
}

impl AggregateRoot for ClientVerification {
    type Id = EmailAddress;

    fn id(&self) -> &Self::Id {
        &self.client
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: client submits or updates profile details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitProfile {
    pub client: EmailAddress,
    pub business_type: BusinessType,
    pub profile: ProfileDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Command: client submits or replaces the identity document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitIdentityDocument {
    pub client: EmailAddress,
    pub document: IdentityDocument,
    pub occurred_at: DateTime<Utc>,
}

/// Command: record the automated identity check outcome.
///
/// A failed check is a recorded fact requiring re-upload, never an engine
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordIdentityCheck {
    pub client: EmailAddress,
    pub passed: bool,
    pub verified_name: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: admin approves the identity step (second party of the gate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveIdentity {
    pub client: EmailAddress,
    pub approved_by: EmailAddress,
    pub occurred_at: DateTime<Utc>,
}

/// Command: admin revokes a previously granted identity approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeIdentityApproval {
    pub client: EmailAddress,
    pub revoked_by: EmailAddress,
    pub occurred_at: DateTime<Utc>,
}

/// Command: admin unlocks the identity step so the client may re-edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockIdentity {
    pub client: EmailAddress,
    pub unlocked_by: EmailAddress,
    pub occurred_at: DateTime<Utc>,
}

/// Command: client submits or replaces the business registration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitBusinessDocument {
    pub client: EmailAddress,
    pub file_ref: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: admin grants the final business approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveBusiness {
    pub client: EmailAddress,
    pub approved_by: EmailAddress,
    pub occurred_at: DateTime<Utc>,
}

/// Command: back-office tooling sets the overall verification descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOverallStatus {
    pub client: EmailAddress,
    pub descriptor: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationCommand {
    SubmitProfile(SubmitProfile),
    SubmitIdentityDocument(SubmitIdentityDocument),
    RecordIdentityCheck(RecordIdentityCheck),
    ApproveIdentity(ApproveIdentity),
    RevokeIdentityApproval(RevokeIdentityApproval),
    UnlockIdentity(UnlockIdentity),
    SubmitBusinessDocument(SubmitBusinessDocument),
    ApproveBusiness(ApproveBusiness),
    SetOverallStatus(SetOverallStatus),
}

impl VerificationCommand {
    /// The client the command targets (the aggregate key).
    pub fn client(&self) -> &EmailAddress {
        match self {
            VerificationCommand::SubmitProfile(c) => &c.client,
            VerificationCommand::SubmitIdentityDocument(c) => &c.client,
            VerificationCommand::RecordIdentityCheck(c) => &c.client,
            VerificationCommand::ApproveIdentity(c) => &c.client,
            VerificationCommand::RevokeIdentityApproval(c) => &c.client,
            VerificationCommand::UnlockIdentity(c) => &c.client,
            VerificationCommand::SubmitBusinessDocument(c) => &c.client,
            VerificationCommand::ApproveBusiness(c) => &c.client,
            VerificationCommand::SetOverallStatus(c) => &c.client,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            VerificationCommand::SubmitProfile(c) => c.occurred_at,
            VerificationCommand::SubmitIdentityDocument(c) => c.occurred_at,
            VerificationCommand::RecordIdentityCheck(c) => c.occurred_at,
            VerificationCommand::ApproveIdentity(c) => c.occurred_at,
            VerificationCommand::RevokeIdentityApproval(c) => c.occurred_at,
            VerificationCommand::UnlockIdentity(c) => c.occurred_at,
            VerificationCommand::SubmitBusinessDocument(c) => c.occurred_at,
            VerificationCommand::ApproveBusiness(c) => c.occurred_at,
            VerificationCommand::SetOverallStatus(c) => c.occurred_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationEvent {
    ProfileSubmitted {
        client: EmailAddress,
        business_type: BusinessType,
        profile: ProfileDetails,
        occurred_at: DateTime<Utc>,
    },
    IdentityDocumentSubmitted {
        client: EmailAddress,
        document: IdentityDocument,
        occurred_at: DateTime<Utc>,
    },
    IdentityCheckPassed {
        client: EmailAddress,
        verified_name: Option<String>,
        occurred_at: DateTime<Utc>,
    },
    IdentityCheckFailed {
        client: EmailAddress,
        occurred_at: DateTime<Utc>,
    },
    IdentityApproved {
        client: EmailAddress,
        approved_by: EmailAddress,
        occurred_at: DateTime<Utc>,
    },
    IdentityApprovalRevoked {
        client: EmailAddress,
        revoked_by: EmailAddress,
        occurred_at: DateTime<Utc>,
    },
    IdentityUnlocked {
        client: EmailAddress,
        unlocked_by: EmailAddress,
        occurred_at: DateTime<Utc>,
    },
    BusinessDocumentSubmitted {
        client: EmailAddress,
        file_ref: String,
        occurred_at: DateTime<Utc>,
    },
    BusinessApproved {
        client: EmailAddress,
        approved_by: EmailAddress,
        occurred_at: DateTime<Utc>,
    },
    OverallStatusSet {
        client: EmailAddress,
        descriptor: String,
        occurred_at: DateTime<Utc>,
    },
    /// The derived fully-verified flag transitioned from true to false.
    ///
    /// Emitted exactly once per regression, after the causing event. One
    /// dedicated reducer consumes this and cancels the client's pending
    /// team invites.
    Downgraded {
        client: EmailAddress,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for VerificationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            VerificationEvent::ProfileSubmitted { .. } => "verification.profile.submitted",
            VerificationEvent::IdentityDocumentSubmitted { .. } => {
                "verification.identity.document_submitted"
            }
            VerificationEvent::IdentityCheckPassed { .. } => "verification.identity.check_passed",
            VerificationEvent::IdentityCheckFailed { .. } => "verification.identity.check_failed",
            VerificationEvent::IdentityApproved { .. } => "verification.identity.approved",
            VerificationEvent::IdentityApprovalRevoked { .. } => {
                "verification.identity.approval_revoked"
            }
            VerificationEvent::IdentityUnlocked { .. } => "verification.identity.unlocked",
            VerificationEvent::BusinessDocumentSubmitted { .. } => {
                "verification.business.document_submitted"
            }
            VerificationEvent::BusinessApproved { .. } => "verification.business.approved",
            VerificationEvent::OverallStatusSet { .. } => "verification.overall_status.set",
            VerificationEvent::Downgraded { .. } => "verification.downgraded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            VerificationEvent::ProfileSubmitted { occurred_at, .. }
            | VerificationEvent::IdentityDocumentSubmitted { occurred_at, .. }
            | VerificationEvent::IdentityCheckPassed { occurred_at, .. }
            | VerificationEvent::IdentityCheckFailed { occurred_at, .. }
            | VerificationEvent::IdentityApproved { occurred_at, .. }
            | VerificationEvent::IdentityApprovalRevoked { occurred_at, .. }
            | VerificationEvent::IdentityUnlocked { occurred_at, .. }
            | VerificationEvent::BusinessDocumentSubmitted { occurred_at, .. }
            | VerificationEvent::BusinessApproved { occurred_at, .. }
            | VerificationEvent::OverallStatusSet { occurred_at, .. }
            | VerificationEvent::Downgraded { occurred_at, .. } => *occurred_at,
        }
    }
}

impl Aggregate for ClientVerification {
    type Command = VerificationCommand;
    type Event = VerificationEvent;
    type Error = EngineError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            VerificationEvent::ProfileSubmitted {
                business_type,
                profile,
                ..
            } => {
                self.business_type = *business_type;
                self.profile = profile.clone();
            }
            VerificationEvent::IdentityDocumentSubmitted { document, .. } => {
                // A re-edit invalidates both parties of the gate.
                self.identity.document = Some(document.clone());
                self.identity.verified_at = None;
                self.identity.verified_name = None;
                self.identity.admin_approved = false;
            }
            VerificationEvent::IdentityCheckPassed {
                verified_name,
                occurred_at,
                ..
            } => {
                self.identity.verified_at = Some(*occurred_at);
                self.identity.verified_name = verified_name.clone();
            }
            VerificationEvent::IdentityCheckFailed { .. } => {
                self.identity.verified_at = None;
                self.identity.verified_name = None;
            }
            VerificationEvent::IdentityApproved { .. } => {
                self.identity.admin_approved = true;
                self.identity.locked = true;
            }
            VerificationEvent::IdentityApprovalRevoked { .. } => {
                self.identity.admin_approved = false;
                self.identity.locked = false;
            }
            VerificationEvent::IdentityUnlocked { .. } => {
                self.identity.locked = false;
            }
            VerificationEvent::BusinessDocumentSubmitted { file_ref, .. } => {
                self.business.registration_doc = Some(file_ref.clone());
                self.business.admin_approved = false;
            }
            VerificationEvent::BusinessApproved { .. } => {
                self.business.admin_approved = true;
            }
            VerificationEvent::OverallStatusSet { descriptor, .. } => {
                self.business.overall_status = Some(descriptor.clone());
            }
            VerificationEvent::Downgraded { .. } => {
                // Marker event; the regression itself was applied by the
                // causing event.
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let mut events = match command {
            VerificationCommand::SubmitProfile(cmd) => self.handle_submit_profile(cmd)?,
            VerificationCommand::SubmitIdentityDocument(cmd) => {
                self.handle_submit_identity_document(cmd)?
            }
            VerificationCommand::RecordIdentityCheck(cmd) => self.handle_record_check(cmd)?,
            VerificationCommand::ApproveIdentity(cmd) => self.handle_approve_identity(cmd)?,
            VerificationCommand::RevokeIdentityApproval(cmd) => self.handle_revoke_identity(cmd)?,
            VerificationCommand::UnlockIdentity(cmd) => self.handle_unlock_identity(cmd)?,
            VerificationCommand::SubmitBusinessDocument(cmd) => {
                self.handle_submit_business_document(cmd)?
            }
            VerificationCommand::ApproveBusiness(cmd) => self.handle_approve_business(cmd)?,
            VerificationCommand::SetOverallStatus(cmd) => self.handle_set_overall_status(cmd)?,
        };

        // Detect a fully-verified regression by probing the candidate events
        // against a copy of the current state.
        if self.fully_verified() {
            let mut probe = self.clone();
            for event in &events {
                probe.apply(event);
            }
            if !probe.fully_verified() {
                events.push(VerificationEvent::Downgraded {
                    client: self.client.clone(),
                    occurred_at: command.occurred_at(),
                });
            }
        }

        Ok(events)
    }
}

impl ClientVerification {
    fn ensure_client(&self, client: &EmailAddress) -> Result<(), EngineError> {
        if &self.client != client {
            return Err(EngineError::validation("client mismatch"));
        }
        Ok(())
    }

    fn handle_submit_profile(
        &self,
        cmd: &SubmitProfile,
    ) -> Result<Vec<VerificationEvent>, EngineError> {
        self.ensure_client(&cmd.client)?;

        Ok(vec![VerificationEvent::ProfileSubmitted {
            client: cmd.client.clone(),
            business_type: cmd.business_type,
            profile: cmd.profile.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_submit_identity_document(
        &self,
        cmd: &SubmitIdentityDocument,
    ) -> Result<Vec<VerificationEvent>, EngineError> {
        self.ensure_client(&cmd.client)?;

        if self.identity.locked {
            return Err(EngineError::conflict(
                "identity step is locked; an admin must unlock it before re-editing",
            ));
        }

        let doc = &cmd.document;
        if doc.doc_type.trim().is_empty()
            || doc.number.trim().is_empty()
            || doc.file_ref.trim().is_empty()
        {
            return Err(EngineError::validation(
                "identity document requires type, number, and file",
            ));
        }

        Ok(vec![VerificationEvent::IdentityDocumentSubmitted {
            client: cmd.client.clone(),
            document: cmd.document.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_record_check(
        &self,
        cmd: &RecordIdentityCheck,
    ) -> Result<Vec<VerificationEvent>, EngineError> {
        self.ensure_client(&cmd.client)?;

        if self.identity.document.is_none() {
            return Err(EngineError::validation(
                "no identity document captured for this client",
            ));
        }

        let event = if cmd.passed {
            VerificationEvent::IdentityCheckPassed {
                client: cmd.client.clone(),
                verified_name: cmd.verified_name.clone(),
                occurred_at: cmd.occurred_at,
            }
        } else {
            VerificationEvent::IdentityCheckFailed {
                client: cmd.client.clone(),
                occurred_at: cmd.occurred_at,
            }
        };

        Ok(vec![event])
    }

    fn handle_approve_identity(
        &self,
        cmd: &ApproveIdentity,
    ) -> Result<Vec<VerificationEvent>, EngineError> {
        self.ensure_client(&cmd.client)?;

        if self.identity.document.is_none() {
            return Err(EngineError::validation(
                "cannot approve identity without a captured document",
            ));
        }
        if self.identity.verified_at.is_none() {
            return Err(EngineError::validation(
                "cannot approve identity before the automated check passes",
            ));
        }
        if self.identity.admin_approved {
            return Err(EngineError::conflict("identity already approved"));
        }

        Ok(vec![VerificationEvent::IdentityApproved {
            client: cmd.client.clone(),
            approved_by: cmd.approved_by.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_revoke_identity(
        &self,
        cmd: &RevokeIdentityApproval,
    ) -> Result<Vec<VerificationEvent>, EngineError> {
        self.ensure_client(&cmd.client)?;

        if !self.identity.admin_approved {
            return Err(EngineError::conflict("identity approval is not granted"));
        }

        Ok(vec![VerificationEvent::IdentityApprovalRevoked {
            client: cmd.client.clone(),
            revoked_by: cmd.revoked_by.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_unlock_identity(
        &self,
        cmd: &UnlockIdentity,
    ) -> Result<Vec<VerificationEvent>, EngineError> {
        self.ensure_client(&cmd.client)?;

        if !self.identity.locked {
            return Err(EngineError::conflict("identity step is not locked"));
        }

        Ok(vec![VerificationEvent::IdentityUnlocked {
            client: cmd.client.clone(),
            unlocked_by: cmd.unlocked_by.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_submit_business_document(
        &self,
        cmd: &SubmitBusinessDocument,
    ) -> Result<Vec<VerificationEvent>, EngineError> {
        self.ensure_client(&cmd.client)?;

        if cmd.file_ref.trim().is_empty() {
            return Err(EngineError::validation("registration document file is required"));
        }

        Ok(vec![VerificationEvent::BusinessDocumentSubmitted {
            client: cmd.client.clone(),
            file_ref: cmd.file_ref.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_approve_business(
        &self,
        cmd: &ApproveBusiness,
    ) -> Result<Vec<VerificationEvent>, EngineError> {
        self.ensure_client(&cmd.client)?;

        if !self.business_type.is_individual() && self.business.registration_doc.is_none() {
            return Err(EngineError::validation(
                "cannot approve business without a registration document",
            ));
        }
        if self.business.admin_approved {
            return Err(EngineError::conflict("business already approved"));
        }

        Ok(vec![VerificationEvent::BusinessApproved {
            client: cmd.client.clone(),
            approved_by: cmd.approved_by.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_set_overall_status(
        &self,
        cmd: &SetOverallStatus,
    ) -> Result<Vec<VerificationEvent>, EngineError> {
        self.ensure_client(&cmd.client)?;

        if cmd.descriptor.trim().is_empty() {
            return Err(EngineError::validation("descriptor cannot be empty"));
        }

        Ok(vec![VerificationEvent::OverallStatusSet {
            client: cmd.client.clone(),
            descriptor: cmd.descriptor.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veridoc_events::execute;

    fn client() -> EmailAddress {
        EmailAddress::parse("client@corp.test").unwrap()
    }

    fn admin() -> EmailAddress {
        EmailAddress::parse("admin@veridoc.test").unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn full_profile() -> ProfileDetails {
        ProfileDetails {
            name: Some("Acme Trading".to_string()),
            email: Some("client@corp.test".to_string()),
            phone: Some("+2348012345678".to_string()),
            address: Some("1 Broad Street, Lagos".to_string()),
        }
    }

    fn id_doc() -> IdentityDocument {
        IdentityDocument {
            doc_type: "national_id".to_string(),
            number: "A1234567".to_string(),
            file_ref: "files/id-front.png".to_string(),
        }
    }

    fn submit_profile(state: &mut ClientVerification, business_type: BusinessType) {
        execute(
            state,
            &VerificationCommand::SubmitProfile(SubmitProfile {
                client: client(),
                business_type,
                profile: full_profile(),
                occurred_at: now(),
            }),
        )
        .unwrap();
    }

    fn pass_identity(state: &mut ClientVerification) {
        execute(
            state,
            &VerificationCommand::SubmitIdentityDocument(SubmitIdentityDocument {
                client: client(),
                document: id_doc(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        execute(
            state,
            &VerificationCommand::RecordIdentityCheck(RecordIdentityCheck {
                client: client(),
                passed: true,
                verified_name: Some("ACME TRADING".to_string()),
                occurred_at: now(),
            }),
        )
        .unwrap();
        execute(
            state,
            &VerificationCommand::ApproveIdentity(ApproveIdentity {
                client: client(),
                approved_by: admin(),
                occurred_at: now(),
            }),
        )
        .unwrap();
    }

    /// Fully verified individual client: 3/3 with no business document.
    fn verified_individual() -> ClientVerification {
        let mut state = ClientVerification::empty(client());
        submit_profile(&mut state, BusinessType::Individual);
        pass_identity(&mut state);
        state
    }

    #[test]
    fn profile_requires_all_four_fields() {
        let mut state = ClientVerification::empty(client());
        let mut profile = full_profile();
        profile.phone = Some("   ".to_string());

        execute(
            &mut state,
            &VerificationCommand::SubmitProfile(SubmitProfile {
                client: client(),
                business_type: BusinessType::Individual,
                profile,
                occurred_at: now(),
            }),
        )
        .unwrap();

        assert!(!state.profile_complete());
        submit_profile(&mut state, BusinessType::Individual);
        assert!(state.profile_complete());
    }

    #[test]
    fn identity_needs_both_parties_of_the_gate() {
        let mut state = ClientVerification::empty(client());
        submit_profile(&mut state, BusinessType::Individual);

        execute(
            &mut state,
            &VerificationCommand::SubmitIdentityDocument(SubmitIdentityDocument {
                client: client(),
                document: id_doc(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert!(!state.identity_complete());

        // Admin approval before the automated check passes is rejected.
        let err = state
            .handle(&VerificationCommand::ApproveIdentity(ApproveIdentity {
                client: client(),
                approved_by: admin(),
                occurred_at: now(),
            }))
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        execute(
            &mut state,
            &VerificationCommand::RecordIdentityCheck(RecordIdentityCheck {
                client: client(),
                passed: true,
                verified_name: None,
                occurred_at: now(),
            }),
        )
        .unwrap();
        // Automated success alone is not enough.
        assert!(!state.identity_complete());

        execute(
            &mut state,
            &VerificationCommand::ApproveIdentity(ApproveIdentity {
                client: client(),
                approved_by: admin(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert!(state.identity_complete());
    }

    #[test]
    fn failed_check_clears_verified_at() {
        let mut state = ClientVerification::empty(client());
        pass_identity(&mut state);
        // Revoke + unlock path not needed: simulate a later failed re-check
        // after unlock and re-submit.
        execute(
            &mut state,
            &VerificationCommand::RevokeIdentityApproval(RevokeIdentityApproval {
                client: client(),
                revoked_by: admin(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        execute(
            &mut state,
            &VerificationCommand::RecordIdentityCheck(RecordIdentityCheck {
                client: client(),
                passed: false,
                verified_name: None,
                occurred_at: now(),
            }),
        )
        .unwrap();

        assert!(state.identity().verified_at.is_none());
        assert!(!state.identity_complete());
    }

    #[test]
    fn approval_locks_identity_edits() {
        let mut state = verified_individual();
        assert!(state.identity().locked);

        let err = state
            .handle(&VerificationCommand::SubmitIdentityDocument(SubmitIdentityDocument {
                client: client(),
                document: id_doc(),
                occurred_at: now(),
            }))
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn unlock_then_reedit_returns_step_to_pending_and_downgrades() {
        let mut state = verified_individual();
        assert!(state.fully_verified());

        execute(
            &mut state,
            &VerificationCommand::UnlockIdentity(UnlockIdentity {
                client: client(),
                unlocked_by: admin(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        // Unlock alone keeps the approval; still fully verified.
        assert!(state.fully_verified());

        let events = execute(
            &mut state,
            &VerificationCommand::SubmitIdentityDocument(SubmitIdentityDocument {
                client: client(),
                document: id_doc(),
                occurred_at: now(),
            }),
        )
        .unwrap();

        assert!(state.identity().verified_at.is_none());
        assert!(!state.identity().admin_approved);
        assert!(!state.fully_verified());
        assert!(events
            .iter()
            .any(|e| matches!(e, VerificationEvent::Downgraded { .. })));
    }

    #[test]
    fn revocation_emits_downgraded_exactly_once() {
        let mut state = verified_individual();

        let events = execute(
            &mut state,
            &VerificationCommand::RevokeIdentityApproval(RevokeIdentityApproval {
                client: client(),
                revoked_by: admin(),
                occurred_at: now(),
            }),
        )
        .unwrap();

        let downgrades = events
            .iter()
            .filter(|e| matches!(e, VerificationEvent::Downgraded { .. }))
            .count();
        assert_eq!(downgrades, 1);
        assert!(!state.fully_verified());
    }

    #[test]
    fn no_downgrade_when_not_previously_verified() {
        let mut state = ClientVerification::empty(client());
        pass_identity(&mut state);
        // Profile never submitted: not fully verified before or after.
        let events = execute(
            &mut state,
            &VerificationCommand::RevokeIdentityApproval(RevokeIdentityApproval {
                client: client(),
                revoked_by: admin(),
                occurred_at: now(),
            }),
        )
        .unwrap();

        assert!(!events
            .iter()
            .any(|e| matches!(e, VerificationEvent::Downgraded { .. })));
    }

    #[test]
    fn individual_reaches_fully_verified_without_business_document() {
        let state = verified_individual();
        assert!(state.business().registration_doc.is_none());
        assert!(state.business_complete());
        assert!(state.fully_verified());
        assert_eq!(state.completed_steps(), 3);
    }

    #[test]
    fn company_requires_registration_document_and_final_approval() {
        let mut state = ClientVerification::empty(client());
        submit_profile(&mut state, BusinessType::Company);
        pass_identity(&mut state);
        assert!(!state.business_complete());
        assert!(!state.fully_verified());

        execute(
            &mut state,
            &VerificationCommand::SubmitBusinessDocument(SubmitBusinessDocument {
                client: client(),
                file_ref: "files/cac-cert.pdf".to_string(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert!(!state.business_complete());

        // Descriptor completes the step but not the final gate.
        execute(
            &mut state,
            &VerificationCommand::SetOverallStatus(SetOverallStatus {
                client: client(),
                descriptor: "Approved".to_string(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert!(state.business_complete());
        assert_eq!(state.completed_steps(), 3);
        assert!(!state.fully_verified());

        execute(
            &mut state,
            &VerificationCommand::ApproveBusiness(ApproveBusiness {
                client: client(),
                approved_by: admin(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert!(state.fully_verified());
    }

    #[test]
    fn business_reupload_clears_final_approval() {
        let mut state = ClientVerification::empty(client());
        submit_profile(&mut state, BusinessType::Company);
        pass_identity(&mut state);
        execute(
            &mut state,
            &VerificationCommand::SubmitBusinessDocument(SubmitBusinessDocument {
                client: client(),
                file_ref: "files/cac-cert.pdf".to_string(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        execute(
            &mut state,
            &VerificationCommand::ApproveBusiness(ApproveBusiness {
                client: client(),
                approved_by: admin(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert!(state.fully_verified());

        let events = execute(
            &mut state,
            &VerificationCommand::SubmitBusinessDocument(SubmitBusinessDocument {
                client: client(),
                file_ref: "files/cac-cert-v2.pdf".to_string(),
                occurred_at: now(),
            }),
        )
        .unwrap();

        assert!(!state.fully_verified());
        assert!(events
            .iter()
            .any(|e| matches!(e, VerificationEvent::Downgraded { .. })));
    }

    #[test]
    fn progress_ratio_counts_completed_steps() {
        let mut state = ClientVerification::empty(client());
        // Individual default: business step satisfied from the start.
        assert_eq!(state.completed_steps(), 1);

        submit_profile(&mut state, BusinessType::Individual);
        assert_eq!(state.completed_steps(), 2);
        assert!((state.progress_ratio() - 2.0 / 3.0).abs() < f64::EPSILON);

        pass_identity(&mut state);
        assert_eq!(state.completed_steps(), 3);
        assert!((state.progress_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn check_without_document_is_rejected() {
        let state = ClientVerification::empty(client());
        let err = state
            .handle(&VerificationCommand::RecordIdentityCheck(RecordIdentityCheck {
                client: client(),
                passed: true,
                verified_name: None,
                occurred_at: now(),
            }))
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
