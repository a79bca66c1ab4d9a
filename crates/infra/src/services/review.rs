//! Document review service: permission gate, row resolution, transition,
//! audit.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use veridoc_access::OperatorAccount;
use veridoc_core::{EmailAddress, EngineError, EngineResult};
use veridoc_review::{AuditEntry, DocumentBundle, DocumentRef, ReviewAction, ReviewActor};

use crate::activity::ActivityLog;
use crate::store::RecordStore;

/// Permission id required for each review action.
///
/// Mark-pending reopens a decided document, so it rides on the approval
/// permission rather than a dedicated id.
pub fn required_permission(action: ReviewAction) -> &'static str {
    match action {
        ReviewAction::Approve => "approve_documents",
        ReviewAction::Reject => "reject_documents",
        ReviewAction::RequestInfo => "request_document_info",
        ReviewAction::MarkPending => "approve_documents",
    }
}

pub struct ReviewService {
    documents: Arc<dyn RecordStore<DocumentBundle>>,
    activity: Arc<dyn ActivityLog>,
}

impl ReviewService {
    pub fn new(
        documents: Arc<dyn RecordStore<DocumentBundle>>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self { documents, activity }
    }

    pub fn bundle_for(&self, client: &EmailAddress) -> EngineResult<DocumentBundle> {
        self.documents.get(client).ok_or_else(EngineError::not_found)
    }

    /// Register an uploaded document row for a client, creating the bundle
    /// on first upload.
    pub fn register_upload(
        &self,
        client: &EmailAddress,
        row: veridoc_review::DocumentRow,
    ) -> EngineResult<()> {
        let mut bundle = self
            .documents
            .get(client)
            .unwrap_or_else(|| DocumentBundle::new(client.clone()));
        bundle.rows.push(row);
        self.documents.set(client.clone(), bundle);
        Ok(())
    }

    /// Apply a review action to the row `reference` resolves to.
    ///
    /// The audit entry is appended before the bundle write: an unauditable
    /// transition must not land. Returns `None` when the action was a
    /// same-status no-op.
    pub fn review_document(
        &self,
        actor: &OperatorAccount,
        client: &EmailAddress,
        reference: &DocumentRef,
        action: ReviewAction,
        justification: Option<&str>,
        now: DateTime<Utc>,
    ) -> EngineResult<Option<AuditEntry>> {
        actor.require_permission(required_permission(action))?;

        let mut bundle = self.bundle_for(client)?;
        let index = bundle.resolve(reference)?;

        let review_actor = ReviewActor {
            name: actor.display_name.clone(),
            role: actor.level.to_string(),
        };
        let entry = bundle.rows[index].apply_action(action, justification, &review_actor, now)?;

        if let Some(entry) = entry.as_ref() {
            self.activity.append(client, entry.clone())?;
            self.documents.set(client.clone(), bundle);
            tracing::info!(
                client = %client,
                action = %entry.action,
                "document review action applied"
            );
        }
        Ok(entry)
    }

    pub fn activity_for(&self, client: &EmailAddress) -> Vec<AuditEntry> {
        self.activity.entries_for(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::InMemoryActivityLog;
    use crate::store::InMemoryRecordStore;
    use veridoc_access::RawOperatorRecord;
    use veridoc_review::{DocumentRow, ReviewStatus};

    fn operator(level: &str) -> OperatorAccount {
        OperatorAccount::normalize(&RawOperatorRecord {
            email: "op@veridoc.test".to_string(),
            display_name: "Op One".to_string(),
            role: None,
            level: Some(level.to_string()),
            permissions: vec![],
            status: None,
        })
        .unwrap()
    }

    fn email(s: &str) -> EmailAddress {
        EmailAddress::parse(s).unwrap()
    }

    fn service_with_row() -> (ReviewService, EmailAddress, uuid::Uuid) {
        let service = ReviewService::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryActivityLog::new()),
        );
        let client = email("client@corp.test");
        let row = DocumentRow::new("id-card.png", "identity", Utc::now());
        let row_id = row.row_id;
        service.register_upload(&client, row).unwrap();
        (service, client, row_id)
    }

    #[test]
    fn approval_transitions_row_and_audits() {
        let (service, client, row_id) = service_with_row();
        let admin = operator("super");

        let entry = service
            .review_document(
                &admin,
                &client,
                &DocumentRef::by_row_id(row_id),
                ReviewAction::Approve,
                None,
                Utc::now(),
            )
            .unwrap()
            .unwrap();

        assert_eq!(entry.actor_role, "super");
        assert_eq!(service.bundle_for(&client).unwrap().rows[0].status, ReviewStatus::Approved);
        assert_eq!(service.activity_for(&client).len(), 1);
    }

    #[test]
    fn missing_permission_is_an_authorization_error() {
        let (service, client, row_id) = service_with_row();
        let tech = operator("technical_support");

        let err = service
            .review_document(
                &tech,
                &client,
                &DocumentRef::by_row_id(row_id),
                ReviewAction::Approve,
                None,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::Authorization(_)));
    }

    #[test]
    fn rejected_transition_leaves_no_audit_entry() {
        let (service, client, row_id) = service_with_row();
        let admin = operator("super");

        // Reject without justification: validation error, nothing written.
        let err = service
            .review_document(
                &admin,
                &client,
                &DocumentRef::by_row_id(row_id),
                ReviewAction::Reject,
                None,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(service.activity_for(&client).is_empty());
        assert_eq!(service.bundle_for(&client).unwrap().rows[0].status, ReviewStatus::Pending);
    }

    #[test]
    fn same_status_noop_writes_nothing() {
        let (service, client, row_id) = service_with_row();
        let admin = operator("super");

        let entry = service
            .review_document(
                &admin,
                &client,
                &DocumentRef::by_row_id(row_id),
                ReviewAction::MarkPending,
                None,
                Utc::now(),
            )
            .unwrap();
        assert!(entry.is_none());
        assert!(service.activity_for(&client).is_empty());
    }

    #[test]
    fn unknown_client_is_not_found() {
        let (service, _client, row_id) = service_with_row();
        let admin = operator("super");

        let err = service
            .review_document(
                &admin,
                &email("other@corp.test"),
                &DocumentRef::by_row_id(row_id),
                ReviewAction::Approve,
                None,
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err, EngineError::NotFound);
    }
}
