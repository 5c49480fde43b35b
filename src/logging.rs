use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Filter directive used when `RUST_LOG` is unset: `-v` flags win over the
/// configured level.
fn directive(configured: Option<&str>, verbose: u8) -> &str {
    match (verbose, configured) {
        (0, Some(level)) => level,
        (0, None) => "info",
        (1, _) => "debug",
        _ => "trace",
    }
}

/// Installs the fmt subscriber. `RUST_LOG` wins, then `-v`, then the
/// configured level.
pub fn init(configured: Option<&str>, verbose: u8) {
    let fallback = directive(configured, verbose);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .init();

    debug!(verbose, "logging initialised");
}
