//! Diagnostic logging to stderr.
//!
//! Stdout is reserved for status lines and JSON output, so tracing events
//! always go to stderr. `RUST_LOG` takes precedence over the verbosity
//! flag.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a verbosity level (`-v` count).
#[must_use]
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,addon_validator=debug",
        _ => "warn,addon_validator=trace",
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
