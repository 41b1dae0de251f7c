//! ui::logging
//!
//! Diagnostic logging setup.
//!
//! # Design
//!
//! All diagnostics go through `tracing` and are written to stderr, so stdout
//! stays clean for `--stdout` output. The filter comes from `REVDIFF_LOG`
//! when set, otherwise from the verbosity flags.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use super::output::Verbosity;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "REVDIFF_LOG";

static INIT_ONCE: Once = Once::new();

/// Default filter directive for a verbosity level.
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "revdiff=error",
        Verbosity::Normal => "revdiff=warn",
        Verbosity::Debug => "revdiff=debug",
    }
}

/// Initialize the global subscriber.
///
/// Only the first call has any effect. If a subscriber is already installed
/// (for example by a test harness) it is left in place.
pub fn init(verbosity: Verbosity) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
