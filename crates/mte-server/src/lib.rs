//! Per-session price ledger TCP service.
//!
//! Each accepted connection becomes a `Session` that exclusively owns one
//! `Ledger`. Clients stream 9-byte insert/query requests; queries are
//! answered with the truncating mean price over a timestamp range.
//!
//! - `Listener`: accept loop, one task per connection
//! - `Session`: framing, dispatch, and the ledger it owns
//! - `Application`: config, telemetry and shutdown wiring

pub mod app;
pub mod config;
pub mod error;
pub mod limiter;
pub mod listener;
pub mod session;

pub use app::Application;
pub use config::{AppConfig, ConfigSource, ServerConfig, TelemetryConfig};
pub use error::{AppError, AppResult};
pub use listener::Listener;
pub use session::{Session, SessionId, SessionLimits, SessionOutcome};
