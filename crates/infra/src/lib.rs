//! Infrastructure layer: keyed record store, external providers, services.
//!
//! Everything here is read-modify-write over whole records: a service loads
//! a record, runs pure domain logic, and persists the evolved record with a
//! single `set`. The engine offers no locking and no optimistic concurrency
//! token; callers must not interleave concurrent writes to the same key.

pub mod activity;
pub mod providers;
pub mod services;
pub mod store;
pub mod token;


pub use activity::{ActivityLog, InMemoryActivityLog};
pub use providers::{IdentityCheckOutcome, IdentityVerifier, OtpProvider, ProviderError};
pub use store::{InMemoryRecordStore, RecordStore};
pub use token::generate_invite_token;
