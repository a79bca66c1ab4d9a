//! Keyed record store abstraction.
//!
//! Records are scoped by `(entity type, email)`: each entity type gets its
//! own store instance, keyed by canonical email. The engine never touches a
//! process-global; stores are injected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use veridoc_core::EmailAddress;

/// Keyed record store for one entity type.
///
/// Whole-record semantics: `set` replaces the full value in one write, so a
/// concurrent reader never observes a partially-applied record. Reads are
/// eventually consistent; [`RecordStore::revision`] is the polling hook —
/// callers re-read when the revision moves.
pub trait RecordStore<V>: Send + Sync {
    fn get(&self, key: &EmailAddress) -> Option<V>;
    fn set(&self, key: EmailAddress, value: V);
    fn delete(&self, key: &EmailAddress);
    fn keys(&self) -> Vec<EmailAddress>;
    fn list(&self) -> Vec<V>;
    /// Monotonic change counter, bumped on every write. Poll this instead of
    /// diffing records; there is no push invalidation.
    fn revision(&self) -> u64;
}

impl<V, S> RecordStore<V> for Arc<S>
where
    S: RecordStore<V> + ?Sized,
{
    fn get(&self, key: &EmailAddress) -> Option<V> {
        (**self).get(key)
    }

    fn set(&self, key: EmailAddress, value: V) {
        (**self).set(key, value)
    }

    fn delete(&self, key: &EmailAddress) {
        (**self).delete(key)
    }

    fn keys(&self) -> Vec<EmailAddress> {
        (**self).keys()
    }

    fn list(&self) -> Vec<V> {
        (**self).list()
    }

    fn revision(&self) -> u64 {
        (**self).revision()
    }
}

/// In-memory record store for tests/dev and single-process deployments.
#[derive(Debug)]
pub struct InMemoryRecordStore<V> {
    inner: RwLock<HashMap<EmailAddress, V>>,
    revision: AtomicU64,
}

impl<V> InMemoryRecordStore<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            revision: AtomicU64::new(0),
        }
    }
}

impl<V> Default for InMemoryRecordStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RecordStore<V> for InMemoryRecordStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &EmailAddress) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(key).cloned()
    }

    fn set(&self, key: EmailAddress, value: V) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key, value);
            self.revision.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn delete(&self, key: &EmailAddress) {
        if let Ok(mut map) = self.inner.write() {
            if map.remove(key).is_some() {
                self.revision.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn keys(&self) -> Vec<EmailAddress> {
        match self.inner.read() {
            Ok(map) => map.keys().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn list(&self) -> Vec<V> {
        match self.inner.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}
