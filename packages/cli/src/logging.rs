// ABOUTME: Tracing subscriber setup for the command-line interface
// ABOUTME: Quiet by default; RUST_LOG raises verbosity

use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing compact records to stderr.
///
/// Defaults to `warn` so command output stays clean. Safe to call more than
/// once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
