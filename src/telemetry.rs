use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber. Logs go to stderr, filtered by
/// `RUST_LOG` (default `info`). Calling it twice is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
