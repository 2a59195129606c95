//! Tracing subscriber setup
//!
//! Events go to stderr so program output on stdout stays clean.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when no directives are configured, by `-v` count
fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info,lox_runtime=debug",
        _ => "trace",
    }
}

/// Install the global subscriber
///
/// `directives` (from LOX_LOG) wins over the verbosity level. Calling this
/// twice is harmless; the second subscriber is ignored.
pub fn init(verbosity: u8, directives: Option<&str>) {
    let filter = directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directives(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .try_init();
}
