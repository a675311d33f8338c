//! Structured logging for the service.
//!
//! Filtering comes from `RUST_LOG` and defaults to `info`. Events emitted by
//! the `arbiterid` generator go through the same subscriber.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use super::config::LogFormat;

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already set.
pub fn init_telemetry(format: LogFormat) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_target(false)
                    .with_timer(fmt::time::ChronoUtc::rfc_3339())
                    .with_file(true)
                    .pretty(),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_thread_ids(true)
                    .with_timer(fmt::time::ChronoUtc::rfc_3339())
                    .with_current_span(false),
            )
            .try_init()?,
    }

    Ok(())
}
