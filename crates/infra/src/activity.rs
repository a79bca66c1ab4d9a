//! Per-client activity log.

use std::collections::HashMap;
use std::sync::RwLock;

use veridoc_core::{EmailAddress, EngineError, EngineResult};
use veridoc_review::AuditEntry;

/// Append-only audit trail scoped to the owning client.
pub trait ActivityLog: Send + Sync {
    fn append(&self, client: &EmailAddress, entry: AuditEntry) -> EngineResult<()>;
    fn entries_for(&self, client: &EmailAddress) -> Vec<AuditEntry>;
}

impl<L> ActivityLog for std::sync::Arc<L>
where
    L: ActivityLog + ?Sized,
{
    fn append(&self, client: &EmailAddress, entry: AuditEntry) -> EngineResult<()> {
        (**self).append(client, entry)
    }

    fn entries_for(&self, client: &EmailAddress) -> Vec<AuditEntry> {
        (**self).entries_for(client)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryActivityLog {
    inner: RwLock<HashMap<EmailAddress, Vec<AuditEntry>>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActivityLog for InMemoryActivityLog {
    fn append(&self, client: &EmailAddress, entry: AuditEntry) -> EngineResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| EngineError::provider("activity log lock poisoned"))?;
        map.entry(client.clone()).or_default().push(entry);
        Ok(())
    }

    fn entries_for(&self, client: &EmailAddress) -> Vec<AuditEntry> {
        match self.inner.read() {
            Ok(map) => map.get(client).cloned().unwrap_or_default(),
            Err(_) => vec![],
        }
    }
}
