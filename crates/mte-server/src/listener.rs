//! TCP accept loop.
//!
//! One tokio task per accepted connection. Tasks share nothing mutable
//! except the live-session counter; each owns its own `Session` and ledger.

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::limiter::ConnectionLimiter;
use crate::session::{Session, SessionId, SessionLimits, SessionOutcome};
use mte_telemetry::Metrics;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Pause after a failed accept so fd exhaustion does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Bound listener, ready to accept sessions.
pub struct Listener {
    listener: TcpListener,
    limiter: Arc<ConnectionLimiter>,
    session_limits: SessionLimits,
    next_session_id: u64,
}

impl Listener {
    /// Bind to the configured address.
    pub async fn bind(config: &ServerConfig) -> AppResult<Self> {
        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| AppError::Bind { addr, source })?;

        Ok(Self {
            listener,
            limiter: Arc::new(ConnectionLimiter::new(config.connection_limit())),
            session_limits: config.session_limits(),
            next_session_id: 1,
        })
    }

    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` fires, then wait for every
    /// session to close.
    pub async fn run(mut self, shutdown: CancellationToken) -> AppResult<()> {
        info!(
            addr = %self.local_addr()?,
            max_connections = ?self.limiter.max(),
            max_records = ?self.session_limits.max_records,
            idle_timeout = ?self.session_limits.idle_timeout,
            "Listening"
        );

        let tracker = TaskTracker::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Listener shutting down");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_session(stream, peer, &tracker, &shutdown),
                    Err(e) => {
                        error!(error = %e, "Accept failed");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }

        tracker.close();
        info!(sessions = tracker.len(), "Waiting for sessions to close");
        tracker.wait().await;
        Ok(())
    }

    fn spawn_session(
        &mut self,
        stream: TcpStream,
        peer: SocketAddr,
        tracker: &TaskTracker,
        shutdown: &CancellationToken,
    ) {
        let Some(slot) = self.limiter.try_acquire() else {
            warn!(
                %peer,
                current = self.limiter.current_count(),
                max = ?self.limiter.max(),
                "Connection limit reached, refusing connection"
            );
            Metrics::connection_rejected();
            return;
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!(%peer, error = %e, "Failed to set TCP_NODELAY");
        }

        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;

        let session = Session::new(id, peer, self.session_limits);
        let shutdown = shutdown.child_token();

        Metrics::session_opened();
        debug!(session_id = %id, %peer, "Session opened");

        tracker.spawn(async move {
            let _slot = slot;
            let outcome = session.run(stream, shutdown).await;
            log_outcome(id, peer, &outcome);
            Metrics::session_closed(outcome.label());
        });
    }
}

fn log_outcome(id: SessionId, peer: SocketAddr, outcome: &SessionOutcome) {
    if outcome.is_client_fault() {
        warn!(session_id = %id, %peer, %outcome, "Session closed");
    } else {
        debug!(session_id = %id, %peer, %outcome, "Session closed");
    }
}
