//! Tracing subscriber initialisation

use anyhow::Result;
use schemagate_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Filter directive: the command-line level wins over the configured one
pub fn filter_directive(level_override: Option<&str>, config: &LoggingConfig) -> String {
    level_override
        .map(str::to_string)
        .unwrap_or_else(|| config.level.to_string())
}

/// Initialize tracing from configuration
///
/// Falls back to `RUST_LOG` when the directive cannot be parsed, then to `info`.
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_logging(config: &LoggingConfig, level_override: Option<&str>) -> Result<()> {
    let env_filter = EnvFilter::try_new(filter_directive(level_override, config))
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    // Use try_init to avoid panic if global subscriber already set
    let initialized = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    if initialized.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}
