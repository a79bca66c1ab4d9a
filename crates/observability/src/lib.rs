//! Process-wide tracing setup for the engine.
//!
//! Every crate in the workspace logs through `tracing`; this crate owns the
//! single subscriber installation so embedding applications get structured
//! JSON logs with one call.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Filtering comes from `RUST_LOG`, defaulting to `info` for the whole
/// process. Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    init_with_filter("info");
}

/// Install the subscriber with an explicit default filter directive,
/// still overridable via `RUST_LOG`.
pub fn init_with_filter(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
