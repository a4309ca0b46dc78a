use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so they never mix with rendered output.
/// `RUST_LOG` overrides the default `warn` level.
pub fn init() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}
