//! Diagnostic logging setup.
//!
//! Logs go to stderr so stdout carries only the run summary.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Maps the `-v` count to the default level.
#[must_use]
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the global subscriber. `RUST_LOG` directives win over `-v`.
///
/// Calling it again (tests, embedding) leaves the first subscriber in place.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_for(verbosity).into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
