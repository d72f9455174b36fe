//! Diagnostic logging for the binary.
//!
//! Configure via the `RUST_LOG` environment variable, e.g.
//! `RUST_LOG=samedit::parser=debug` to see every parsed command re-rendered,
//! or `RUST_LOG=samedit::interpreter=trace` to follow evaluation. Without
//! `RUST_LOG`, each `-v` on the command line raises the level one step from `warn`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber, writing to stderr.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .init();
}
