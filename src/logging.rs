// src/logging.rs
// =============================================================================
// Diagnostics go to stderr through `tracing`, so they never mix with the
// rendered report on stdout.
//
// RUST_LOG overrides the level, e.g. RUST_LOG=linkcheck::plugin=debug
// =============================================================================

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. Call once, at startup.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();

    tracing::debug!("logging initialized at level {}", default_level);
}
