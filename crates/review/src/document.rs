//! Review status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use veridoc_core::{EngineError, EngineResult};

/// Review status of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    InfoRequested,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::InfoRequested => "info_requested",
        }
    }
}

/// Admin review action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
    RequestInfo,
    MarkPending,
}

impl ReviewAction {
    pub fn target_status(&self) -> ReviewStatus {
        match self {
            ReviewAction::Approve => ReviewStatus::Approved,
            ReviewAction::Reject => ReviewStatus::Rejected,
            ReviewAction::RequestInfo => ReviewStatus::InfoRequested,
            ReviewAction::MarkPending => ReviewStatus::Pending,
        }
    }

    /// Whether this action requires non-empty justification text.
    pub fn requires_justification(&self) -> bool {
        matches!(self, ReviewAction::Reject | ReviewAction::RequestInfo)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve_document",
            ReviewAction::Reject => "reject_document",
            ReviewAction::RequestInfo => "request_document_info",
            ReviewAction::MarkPending => "mark_document_pending",
        }
    }
}

/// The admin performing a review action, as recorded in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewActor {
    pub name: String,
    pub role: String,
}

/// One entry in the owning client's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor_name: String,
    pub actor_role: String,
    pub action: String,
    pub details: String,
    pub timestamp_utc: DateTime<Utc>,
}

/// One reviewable document row within a client's bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRow {
    pub row_id: Uuid,
    /// Identifier assigned by the external file storage, when known.
    pub external_file_id: Option<String>,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub category: String,
    pub status: ReviewStatus,
    /// Justification notes from the most recent negative transition.
    /// Persist across positive transitions unless explicitly overwritten.
    pub notes: Option<String>,
}

impl DocumentRow {
    pub fn new(
        file_name: impl Into<String>,
        category: impl Into<String>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            row_id: Uuid::new_v4(),
            external_file_id: None,
            file_name: file_name.into(),
            uploaded_at,
            category: category.into(),
            status: ReviewStatus::default(),
            notes: None,
        }
    }

    /// Apply a review action.
    ///
    /// Returns `Ok(None)` when the action targets the current status (no-op,
    /// nothing to audit) and `Ok(Some(entry))` on a successful transition.
    /// Validation failures leave the row untouched.
    ///
    /// Transition rules: `Pending` may move to any of the three review
    /// outcomes; any status may return to `Pending` via mark-pending. Direct
    /// moves between review outcomes are rejected.
    pub fn apply_action(
        &mut self,
        action: ReviewAction,
        justification: Option<&str>,
        actor: &ReviewActor,
        now: DateTime<Utc>,
    ) -> EngineResult<Option<AuditEntry>> {
        let target = action.target_status();

        if target == self.status {
            return Ok(None);
        }

        let justification = justification.map(str::trim).filter(|j| !j.is_empty());
        if action.requires_justification() && justification.is_none() {
            return Err(EngineError::validation(format!(
                "{} requires justification text",
                action.as_str()
            )));
        }

        let allowed = matches!(
            (self.status, target),
            (ReviewStatus::Pending, _) | (_, ReviewStatus::Pending)
        );
        if !allowed {
            return Err(EngineError::conflict(format!(
                "cannot move document from {} to {}",
                self.status.as_str(),
                target.as_str()
            )));
        }

        let previous = self.status;
        self.status = target;
        if let Some(text) = justification {
            self.notes = Some(text.to_string());
        }

        let details = match justification {
            Some(text) => format!(
                "{}: {} -> {} ({})",
                self.file_name,
                previous.as_str(),
                target.as_str(),
                text
            ),
            None => format!(
                "{}: {} -> {}",
                self.file_name,
                previous.as_str(),
                target.as_str()
            ),
        };

        Ok(Some(AuditEntry {
            actor_name: actor.name.clone(),
            actor_role: actor.role.clone(),
            action: action.as_str().to_string(),
            details,
            timestamp_utc: now,
        }))
    }
}
