use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AdapterError, Result};

/// Sets up the logging subscriber for the application.
///
/// `RUST_LOG` takes precedence; otherwise `level` applies to every target.
pub fn init_logger(level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| AdapterError::Config(format!("invalid log level '{}': {}", level, e)))?;

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_ansi(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AdapterError::Internal(format!("Failed to initialize logger: {}", e)))
}
