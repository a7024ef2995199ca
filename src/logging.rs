//! Logging configuration and initialization
//!
//! The runner only emits `tracing` events; installing a subscriber is left to
//! the embedding application. These helpers set up the usual formatter.

use crate::config::RunnerConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Map a `-v` count to a filter directive
pub fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install a global fmt subscriber filtered by `filter`
///
/// `RUST_LOG` takes precedence when set. Returns `false` if a global
/// subscriber was already installed.
pub fn init_logging(filter: &str, verbose: u8) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(verbose >= 3) // Show line numbers for -vvv
        .try_init()
        .is_ok();

    if installed {
        debug!("Logging initialized with filter `{}`", filter);
    }
    installed
}

/// Initialize tracing with just a verbosity level
pub fn init_tracing(verbose: u8) -> bool {
    init_logging(verbosity_filter(verbose), verbose)
}

/// Initialize tracing from a runner configuration's `log_level`
pub fn init_from_config(config: &RunnerConfig) -> bool {
    init_logging(config.log_level(), 0)
}
