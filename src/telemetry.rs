//! Tracing subscriber setup.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `log_level` is an [`EnvFilter`] directive string such as `info` or
/// `shortlink_lifecycle=debug,tower_http=info`; an unparsable value falls
/// back to `info`. `log_format` selects human-readable (`text`) or
/// line-delimited JSON (`json`) output.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init(log_level: &str, log_format: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if log_format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}
