//! In-process server for integration tests.

use mte_server::{Listener, ServerConfig};
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A listener running on an OS-assigned loopback port.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<mte_server::AppResult<()>>,
}

impl TestServer {
    /// Start with default limits.
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    /// Start with the given config; bind address and port are overridden.
    pub async fn start_with(mut config: ServerConfig) -> Self {
        config.bind = "127.0.0.1".to_string();
        config.port = 0;

        let listener = Listener::bind(&config).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(listener.run(shutdown.clone()));

        Self {
            addr,
            shutdown,
            handle,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting, close every session, and wait for the listener.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        self.handle.await.unwrap().unwrap();
    }
}
