//! `veridoc-events` — domain event plumbing.
//!
//! Workflow crates emit typed events from their aggregates; this crate holds
//! the shared event contract, a deterministic execution helper, and the
//! in-memory bus the engine uses to fan out verification downgrades to their
//! reducer.

pub mod bus;
pub mod event;
pub mod handler;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use handler::execute;
pub use in_memory_bus::InMemoryEventBus;
