//! `veridoc-review` — document review status workflow.
//!
//! Finite-state transitions over a document's review status, with
//! justification requirements on the negative transitions and an audit entry
//! produced for every successful one. Also owns row resolution within a
//! client's document bundle.

pub mod document;
pub mod resolve;

pub use document::{AuditEntry, DocumentRow, ReviewAction, ReviewActor, ReviewStatus};
pub use resolve::{DocumentBundle, DocumentRef};
