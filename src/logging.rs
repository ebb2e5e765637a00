use tracing_subscriber::EnvFilter;

/// Installs a stderr `fmt` subscriber filtered by `filter`.
///
/// An unparsable filter falls back to `warn`. Calling this twice is harmless;
/// the second call leaves the first subscriber in place.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
