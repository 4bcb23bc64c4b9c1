//! Subscriber initialization for the embedding application.

use tracing_subscriber::EnvFilter;

/// Install a global subscriber filtered by `RELIQUARY_LOG` (falling back
/// to the given default directive). Safe to call more than once; later
/// calls are no-ops.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_env("RELIQUARY_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
