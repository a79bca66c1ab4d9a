//! `veridoc-assignments` — client-to-operator assignment scoping.
//!
//! Assignments restrict which clients an `AreaAccountant` operator can see.
//! Every other level is unrestricted. Replacement of a client's assignment
//! set is planned as a whole (trim / lowercase / dedupe, order-independent
//! comparison) so the service layer can apply it as one atomic write or skip
//! it entirely.

pub mod assignment;
pub mod scope;

pub use assignment::{ClientAssignment, ReplacementPlan, normalize_operator_emails, plan_replacement};
pub use scope::ClientScope;
