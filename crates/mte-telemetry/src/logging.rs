//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor a configured level is given.
pub const DEFAULT_FILTER: &str = "info,mte=debug";

/// Build the filter for a configured level, or `DEFAULT_FILTER` if none.
///
/// A configured level applies as-is to every target, the service's own
/// crates included.
pub fn build_filter(level: Option<&str>) -> TelemetryResult<EnvFilter> {
    let directives = level.unwrap_or(DEFAULT_FILTER);
    EnvFilter::try_new(directives)
        .map_err(|e| TelemetryError::LoggingInit(format!("invalid log level {directives:?}: {e}")))
}

/// Initialize structured logging.
///
/// `RUST_LOG` takes precedence, then `level`, then `DEFAULT_FILTER`. Output
/// is JSON when `RUST_ENV=production`, pretty otherwise.
pub fn init_logging(level: Option<&str>) -> TelemetryResult<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(level)?,
    };

    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    let result = if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_names(true),
            )
            .try_init()
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
