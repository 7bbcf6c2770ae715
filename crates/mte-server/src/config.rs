//! Application configuration.

use crate::error::{AppError, AppResult};
use crate::session::SessionLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file used when neither `--config` nor `MTE_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// TCP listener and per-session limits.
///
/// Every limit defaults to 0 (disabled). Disabled limits leave protocol
/// behavior untouched for well-formed traffic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum concurrent sessions (0 = unlimited).
    #[serde(default)]
    pub max_connections: usize,
    /// Maximum records one session may insert (0 = unlimited).
    #[serde(default)]
    pub max_records_per_session: usize,
    /// Close a session after this many seconds without a complete request
    /// (0 = never).
    #[serde(default)]
    pub idle_timeout_secs: u64,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            max_connections: 0,
            max_records_per_session: 0,
            idle_timeout_secs: 0,
        }
    }
}

impl ServerConfig {
    /// `bind:port` string accepted by `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Connection limit, if enabled.
    pub fn connection_limit(&self) -> Option<usize> {
        (self.max_connections > 0).then_some(self.max_connections)
    }

    /// Per-session limits derived from this config.
    pub fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            max_records: (self.max_records_per_session > 0)
                .then_some(self.max_records_per_session),
            idle_timeout: (self.idle_timeout_secs > 0)
                .then(|| Duration::from_secs(self.idle_timeout_secs)),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Serve Prometheus metrics over HTTP.
    #[serde(default)]
    pub metrics_enabled: bool,
    /// Prometheus metrics port.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    /// Log filter for every target, used when `RUST_LOG` is unset
    /// (None = `info,mte=debug`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
            log_level: None,
        }
    }
}

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(String),
    /// Default path did not exist; built-in defaults were used.
    Defaults,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `DEFAULT_CONFIG_PATH` is
    /// used if present and built-in defaults otherwise.
    pub fn load(explicit_path: Option<&str>) -> AppResult<(Self, ConfigSource)> {
        if let Some(path) = explicit_path {
            return Ok((Self::from_file(path)?, ConfigSource::File(path.to_string())));
        }

        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Ok((
                Self::from_file(DEFAULT_CONFIG_PATH)?,
                ConfigSource::File(DEFAULT_CONFIG_PATH.to_string()),
            ))
        } else {
            Ok((Self::default(), ConfigSource::Defaults))
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;

        Self::from_toml(&content)
    }

    /// Parse and validate TOML content.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that cannot run.
    pub fn validate(&self) -> AppResult<()> {
        if self.server.bind.trim().is_empty() {
            return Err(AppError::Config("server.bind must not be empty".to_string()));
        }
        if self.telemetry.metrics_enabled
            && self.server.port != 0
            && self.telemetry.metrics_port == self.server.port
        {
            return Err(AppError::Config(format!(
                "telemetry.metrics_port and server.port are both {}",
                self.server.port
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.listen_addr(), "0.0.0.0:8080");
        assert_eq!(config.server.connection_limit(), None);
        assert_eq!(config.server.session_limits(), SessionLimits::default());
        assert!(!config.telemetry.metrics_enabled);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.telemetry.log_level, None);
    }

    #[test]
    fn test_log_level_from_toml() {
        let config = AppConfig::from_toml(
            r#"
            [telemetry]
            log_level = "warn"
            "#,
        )
        .unwrap();
        assert_eq!(config.telemetry.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 9000
            max_records_per_session = 500
            idle_timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        let limits = config.server.session_limits();
        assert_eq!(limits.max_records, Some(500));
        assert_eq!(limits.idle_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_port_collision_rejected() {
        let result = AppConfig::from_toml(
            r#"
            [server]
            port = 9090

            [telemetry]
            metrics_enabled = true
            metrics_port = 9090
            "#,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = AppConfig::from_toml("[server]\nport = \"eighty\"");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = AppConfig::load(Some("does/not/exist.toml"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("metrics_port"));
    }
}
