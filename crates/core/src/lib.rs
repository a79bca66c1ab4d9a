//! `veridoc-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod email;
pub mod error;

pub use aggregate::{Aggregate, AggregateRoot};
pub use email::EmailAddress;
pub use error::{EngineError, EngineResult};
