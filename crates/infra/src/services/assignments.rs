//! Client assignment service: full-replace writes and operator scoping.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use veridoc_access::{AdminLevel, OperatorAccount};
use veridoc_assignments::{ClientAssignment, ClientScope, plan_replacement};
use veridoc_core::{EmailAddress, EngineResult};

use crate::store::RecordStore;

/// Assignment table service.
///
/// The store is keyed by client; each value is that client's complete row
/// set, replaced in a single write.
pub struct AssignmentService {
    assignments: Arc<dyn RecordStore<Vec<ClientAssignment>>>,
}

impl AssignmentService {
    pub fn new(assignments: Arc<dyn RecordStore<Vec<ClientAssignment>>>) -> Self {
        Self { assignments }
    }

    /// Replace a client's assigned-operator set. Super level only.
    ///
    /// Returns `false` when the normalized request equals the current set
    /// (order-independent); the write is skipped entirely in that case.
    pub fn set_assignments(
        &self,
        actor: &OperatorAccount,
        client: EmailAddress,
        requested: &[String],
        now: DateTime<Utc>,
    ) -> EngineResult<bool> {
        actor.require_level(AdminLevel::Super)?;

        let existing = self.assignments.get(&client).unwrap_or_default();
        let plan = plan_replacement(client.clone(), &existing, requested)?;

        if plan.is_noop {
            tracing::debug!(client = %client, "assignment replacement is a no-op, skipping write");
            return Ok(false);
        }

        let rows = plan.into_rows(actor.email.clone(), now);
        self.assignments.set(client.clone(), rows);
        tracing::info!(client = %client, "client assignments replaced");
        Ok(true)
    }

    pub fn assignments_for(&self, client: &EmailAddress) -> Vec<ClientAssignment> {
        self.assignments.get(client).unwrap_or_default()
    }

    /// The full assignment table, flattened.
    fn all_rows(&self) -> Vec<ClientAssignment> {
        self.assignments.list().into_iter().flatten().collect()
    }

    /// Visibility scope for an operator over the whole assignment table.
    pub fn scope_for(&self, operator: &OperatorAccount) -> ClientScope {
        ClientScope::for_operator(operator, &self.all_rows())
    }

    /// Filter a client list down to what `operator` may see.
    pub fn visible_clients(
        &self,
        operator: &OperatorAccount,
        clients: Vec<EmailAddress>,
    ) -> Vec<EmailAddress> {
        self.scope_for(operator).filter_clients(clients)
    }
}
