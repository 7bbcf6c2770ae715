//! Prometheus metrics and structured logging for the price ledger service.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus counters for sessions, messages and query scans
//! - Optional `/metrics` HTTP exporter

pub mod error;
pub mod exporter;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use exporter::run_exporter;
pub use logging::{build_filter, init_logging, DEFAULT_FILTER};
pub use metrics::Metrics;
