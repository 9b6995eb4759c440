//! Tracing subscriber setup for the `tiltbench` binary.

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber on stderr, filtered by `RUST_LOG` (default `info`).
///
/// A second call is a no-op, so tests and embedders can call it freely.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
