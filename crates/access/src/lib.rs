//! `veridoc-access` — permission catalog and operator identity normalization.
//!
//! This crate is the single canonical resolver for "what may this operator
//! do": the fixed permission catalog, the admin-level synonym table, and the
//! effective-permission computation. Call sites must never re-derive
//! permissions themselves.

pub mod account;
pub mod catalog;
pub mod level;

pub use account::{OperatorAccount, OperatorStatus, RawOperatorRecord};
pub use catalog::{Permission, catalog, default_permissions, is_known_permission};
pub use level::AdminLevel;
