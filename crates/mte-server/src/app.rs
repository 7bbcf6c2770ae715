//! Application wiring: telemetry, listener and shutdown.

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::listener::Listener;
use mte_telemetry::Metrics;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Main application.
pub struct Application {
    config: AppConfig,
    shutdown: CancellationToken,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops the application when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until Ctrl-C or the shutdown token fires.
    pub async fn run(self) -> AppResult<()> {
        Metrics::init();

        if self.config.telemetry.metrics_enabled {
            let port = self.config.telemetry.metrics_port;
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                if let Err(e) = mte_telemetry::run_exporter(port, shutdown).await {
                    error!(error = %e, port, "Metrics exporter failed");
                }
            });
        }

        let listener = Listener::bind(&self.config.server).await?;

        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    match result {
                        Ok(()) => info!("Shutdown signal received"),
                        Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
                    }
                    shutdown.cancel();
                }
                _ = shutdown.cancelled() => {}
            }
        });

        listener.run(self.shutdown.clone()).await?;
        info!("Shut down");
        Ok(())
    }
}
