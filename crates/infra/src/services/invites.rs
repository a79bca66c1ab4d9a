//! Operator invite service: issuance, acceptance, revocation, soft delete,
//! and the operator-lifecycle actions that hang off it.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use veridoc_access::{AdminLevel, OperatorAccount, account::sanitize_permissions};
use veridoc_core::{EmailAddress, EngineError, EngineResult};
use veridoc_invites::{Invite, InviteToken, TrashedInvite};

use crate::store::RecordStore;
use crate::token::issue_unique_token;

/// Operator invite and lifecycle service.
///
/// Invites are keyed by invitee email, so "one live invite per address" is
/// structural. Deleted invites move to the trash, never out of existence.
pub struct InviteService {
    invites: Arc<dyn RecordStore<Invite>>,
    operators: Arc<dyn RecordStore<OperatorAccount>>,
    trash: RwLock<Vec<TrashedInvite>>,
}

impl InviteService {
    pub fn new(
        invites: Arc<dyn RecordStore<Invite>>,
        operators: Arc<dyn RecordStore<OperatorAccount>>,
    ) -> Self {
        Self {
            invites,
            operators,
            trash: RwLock::new(Vec::new()),
        }
    }

    /// Issue an invite for a new operator.
    ///
    /// Fails when the address already belongs to an operator or carries a
    /// still-pending invite. Unknown permission ids in `permissions` are
    /// dropped during sanitization.
    pub fn create_invite(
        &self,
        actor: &OperatorAccount,
        email: EmailAddress,
        level: AdminLevel,
        permissions: &[String],
        now: DateTime<Utc>,
    ) -> EngineResult<Invite> {
        if self.operators.get(&email).is_some() {
            return Err(EngineError::validation(format!(
                "{} already has an operator account",
                email
            )));
        }
        if let Some(existing) = self.invites.get(&email) {
            if existing.is_pending(now) {
                return Err(EngineError::validation(format!(
                    "{} already has a pending invite",
                    email
                )));
            }
        }

        let token = issue_unique_token(|candidate| {
            self.invites.list().iter().any(|inv| &inv.token == candidate)
        })?;

        let invite = Invite::issue(
            actor,
            email.clone(),
            level,
            sanitize_permissions(permissions),
            token,
            now,
        )?;
        self.invites.set(email, invite.clone());

        tracing::info!(
            invitee = %invite.email,
            level = %invite.level,
            "operator invite issued"
        );
        Ok(invite)
    }

    /// Accept an invite by token, materializing the operator account.
    pub fn accept_invite(
        &self,
        token: &InviteToken,
        display_name: String,
        now: DateTime<Utc>,
    ) -> EngineResult<OperatorAccount> {
        let mut invite = self
            .invites
            .list()
            .into_iter()
            .find(|inv| &inv.token == token)
            .ok_or_else(EngineError::not_found)?;

        invite.accept(now)?;
        self.invites.set(invite.email.clone(), invite.clone());

        let account = invite.into_account(display_name);
        self.operators.set(account.email.clone(), account.clone());

        tracing::info!(operator = %account.email, "operator invite accepted");
        Ok(account)
    }

    /// Revoke a pending invite. Super level only.
    pub fn revoke_invite(
        &self,
        actor: &OperatorAccount,
        email: &EmailAddress,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        actor.require_level(AdminLevel::Super)?;

        let mut invite = self.invites.get(email).ok_or_else(EngineError::not_found)?;
        invite.revoke(now)?;
        self.invites.set(email.clone(), invite);
        Ok(())
    }

    /// Soft-delete an invite into the audit trash. Super level only.
    pub fn delete_invite(
        &self,
        actor: &OperatorAccount,
        email: &EmailAddress,
        reason: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        actor.require_level(AdminLevel::Super)?;

        let invite = self.invites.get(email).ok_or_else(EngineError::not_found)?;
        self.invites.delete(email);

        let mut trash = self
            .trash
            .write()
            .map_err(|_| EngineError::provider("invite trash lock poisoned"))?;
        trash.push(TrashedInvite::new(
            invite,
            actor.email.clone(),
            reason,
            now,
        ));
        Ok(())
    }

    /// Invites still acceptable at `now`.
    pub fn pending_invites(&self, now: DateTime<Utc>) -> Vec<Invite> {
        self.invites
            .list()
            .into_iter()
            .filter(|inv| inv.is_pending(now))
            .collect()
    }

    pub fn trashed_invites(&self) -> Vec<TrashedInvite> {
        match self.trash.read() {
            Ok(trash) => trash.clone(),
            Err(_) => vec![],
        }
    }

    /// Suspend an operator account. Super level only; self-suspension is
    /// refused so a tenant cannot lock out its last super.
    pub fn suspend_operator(
        &self,
        actor: &OperatorAccount,
        email: &EmailAddress,
    ) -> EngineResult<OperatorAccount> {
        actor.require_level(AdminLevel::Super)?;
        if &actor.email == email {
            return Err(EngineError::validation("cannot suspend your own account"));
        }

        let mut account = self.operators.get(email).ok_or_else(EngineError::not_found)?;
        account.suspend()?;
        self.operators.set(email.clone(), account.clone());

        tracing::warn!(operator = %email, suspended_by = %actor.email, "operator suspended");
        Ok(account)
    }

    /// Reactivate a suspended operator. Super level only.
    pub fn reactivate_operator(
        &self,
        actor: &OperatorAccount,
        email: &EmailAddress,
    ) -> EngineResult<OperatorAccount> {
        actor.require_level(AdminLevel::Super)?;

        let mut account = self.operators.get(email).ok_or_else(EngineError::not_found)?;
        account.reactivate()?;
        self.operators.set(email.clone(), account.clone());
        Ok(account)
    }

    /// Replace an operator's explicit permission list. Requires the
    /// `manage_permissions` permission; unknown ids are dropped.
    pub fn set_operator_permissions(
        &self,
        actor: &OperatorAccount,
        email: &EmailAddress,
        permissions: &[String],
    ) -> EngineResult<OperatorAccount> {
        actor.require_permission("manage_permissions")?;

        let mut account = self.operators.get(email).ok_or_else(EngineError::not_found)?;
        account.permissions = sanitize_permissions(permissions);
        self.operators.set(email.clone(), account.clone());
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;
    use veridoc_access::RawOperatorRecord;
    use veridoc_invites::InviteStatus;

    fn operator(email: &str, level: &str) -> OperatorAccount {
        OperatorAccount::normalize(&RawOperatorRecord {
            email: email.to_string(),
            display_name: "Op".to_string(),
            role: None,
            level: Some(level.to_string()),
            permissions: vec![],
            status: None,
        })
        .unwrap()
    }

    fn service() -> InviteService {
        InviteService::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryRecordStore::new()),
        )
    }

    fn email(s: &str) -> EmailAddress {
        EmailAddress::parse(s).unwrap()
    }

    #[test]
    fn create_then_accept_materializes_operator() {
        let service = service();
        let admin = operator("admin@veridoc.test", "super");

        let invite = service
            .create_invite(
                &admin,
                email("new.op@veridoc.test"),
                AdminLevel::CustomerService,
                &["view_clients".to_string()],
                Utc::now(),
            )
            .unwrap();

        let account = service
            .accept_invite(&invite.token, "New Op".to_string(), Utc::now())
            .unwrap();
        assert_eq!(account.level, AdminLevel::CustomerService);
        assert!(account.has_permission("view_clients"));
    }

    #[test]
    fn duplicate_pending_invite_is_refused() {
        let service = service();
        let admin = operator("admin@veridoc.test", "super");
        let now = Utc::now();

        service
            .create_invite(&admin, email("a@x.test"), AdminLevel::Super, &[], now)
            .unwrap();
        let err = service
            .create_invite(&admin, email("a@x.test"), AdminLevel::Super, &[], now)
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn invite_for_existing_operator_is_refused() {
        let service = service();
        let admin = operator("admin@veridoc.test", "super");
        let existing = operator("taken@x.test", "customer_service");
        service.operators.set(existing.email.clone(), existing);

        let err = service
            .create_invite(&admin, email("taken@x.test"), AdminLevel::Super, &[], Utc::now())
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn non_super_cannot_issue() {
        let service = service();
        let cs = operator("cs@veridoc.test", "customer_service");
        let err = service
            .create_invite(&cs, email("a@x.test"), AdminLevel::Super, &[], Utc::now())
            .unwrap_err();
        assert!(matches!(err, EngineError::Authorization(_)));
    }

    #[test]
    fn accept_unknown_token_is_not_found() {
        let service = service();
        let err = service
            .accept_invite(&InviteToken::new("missing"), "X".to_string(), Utc::now())
            .unwrap_err();
        assert_eq!(err, EngineError::NotFound);
    }

    #[test]
    fn revoked_invite_leaves_record_and_blocks_acceptance() {
        let service = service();
        let admin = operator("admin@veridoc.test", "super");
        let now = Utc::now();

        let invite = service
            .create_invite(&admin, email("a@x.test"), AdminLevel::Super, &[], now)
            .unwrap();
        service.revoke_invite(&admin, &email("a@x.test"), now).unwrap();

        let stored = service.invites.get(&email("a@x.test")).unwrap();
        assert_eq!(stored.status, InviteStatus::Revoked);
        assert!(service.accept_invite(&invite.token, "X".to_string(), now).is_err());
    }

    #[test]
    fn delete_moves_invite_to_trash() {
        let service = service();
        let admin = operator("admin@veridoc.test", "super");
        let now = Utc::now();

        service
            .create_invite(&admin, email("a@x.test"), AdminLevel::Super, &[], now)
            .unwrap();
        service
            .delete_invite(&admin, &email("a@x.test"), "issued in error", now)
            .unwrap();

        assert!(service.invites.get(&email("a@x.test")).is_none());
        let trash = service.trashed_invites();
        assert_eq!(trash.len(), 1);
        assert_eq!(trash[0].reason, "issued in error");
        assert_eq!(trash[0].deleted_by, email("admin@veridoc.test"));
    }

    #[test]
    fn suspension_requires_super_and_blocks_self() {
        let service = service();
        let admin = operator("admin@veridoc.test", "super");
        let target = operator("cs@veridoc.test", "customer_service");
        service.operators.set(target.email.clone(), target.clone());

        assert!(service.suspend_operator(&target, &admin.email).is_err());
        assert!(service.suspend_operator(&admin, &admin.email).is_err());

        let suspended = service.suspend_operator(&admin, &target.email).unwrap();
        assert!(suspended.require_permission("view_clients").is_err());

        let restored = service.reactivate_operator(&admin, &target.email).unwrap();
        assert!(restored.require_permission("view_clients").is_ok());
    }

    #[test]
    fn permission_update_drops_unknown_ids() {
        let service = service();
        let admin = operator("admin@veridoc.test", "super");
        let target = operator("cs@veridoc.test", "customer_service");
        service.operators.set(target.email.clone(), target.clone());

        let updated = service
            .set_operator_permissions(
                &admin,
                &target.email,
                &["view_clients".to_string(), "launch_rockets".to_string()],
            )
            .unwrap();
        assert!(updated.has_permission("view_clients"));
        assert!(!updated.has_permission("launch_rockets"));
    }
}
