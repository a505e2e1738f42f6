//! Log output for the binary

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Verbosity;

/// Filter from `RUST_LOG`, falling back to the verbosity default
#[must_use]
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter()))
}

/// Install the global subscriber. Logs go to stderr so `run --dry-run`
/// output stays clean JSON.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter(verbosity))
        .try_init();
}
