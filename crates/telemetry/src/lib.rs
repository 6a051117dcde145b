//! Logging and tracing bootstrap for Biblos.

use anyhow::anyhow;
use biblos_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Initialize the tracing pipeline from settings. `RUST_LOG` wins over the
/// configured filter; falls back to `info` when neither is set.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(settings.log_filter.as_deref().unwrap_or("info"))
    });

    let result = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init(),
    };

    result.map_err(|e| anyhow!("failed to initialize tracing: {e}"))
}
