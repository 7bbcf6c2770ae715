//! Per-connection session.
//!
//! A session owns its ledger outright; nothing else can observe or mutate
//! it. Requests are handled strictly one at a time: read a full request,
//! apply it, write the response if any, then read again.
//!
//! ```text
//! Open ──(Insert)──► Open
//!  │  ──(Query)───► write mean ──► Open
//!  └─(EOF | partial | unknown tag | I/O error | limit | shutdown)──► Closed
//! ```

use futures_util::{SinkExt, StreamExt};
use mte_core::{CoreError, Ledger, Price, PriceRecord};
use mte_telemetry::Metrics;
use mte_wire::{Message, MessageCodec, WireError};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Process-unique session identifier, for logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optional per-session resource caps. Both disabled by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionLimits {
    /// Records a session may insert before it is closed.
    pub max_records: Option<usize>,
    /// Longest wait for a complete request before the session is closed.
    pub idle_timeout: Option<Duration>,
}

/// Why a session ended.
///
/// Every outcome closes the connection. Only `PeerClosed` and `Shutdown`
/// are unremarkable; the rest mean the offending request got no response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Peer closed cleanly between requests.
    PeerClosed,
    /// Peer closed mid-request.
    Truncated { buffered: usize },
    /// Request started with a tag other than `I` or `Q`.
    UnknownTag(u8),
    /// Read or write failed.
    Io(io::ErrorKind),
    /// Insert rejected by the record cap.
    LedgerFull { limit: usize },
    /// No complete request within the idle timeout.
    IdleTimeout,
    /// Server is shutting down.
    Shutdown,
}

impl SessionOutcome {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PeerClosed => "peer_closed",
            Self::Truncated { .. } => "truncated",
            Self::UnknownTag(_) => "unknown_tag",
            Self::Io(_) => "io",
            Self::LedgerFull { .. } => "ledger_full",
            Self::IdleTimeout => "idle_timeout",
            Self::Shutdown => "shutdown",
        }
    }

    /// Check if the session ended because of a bad or misbehaving client.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. }
                | Self::UnknownTag(_)
                | Self::LedgerFull { .. }
                | Self::IdleTimeout
        )
    }
}

impl From<WireError> for SessionOutcome {
    fn from(err: WireError) -> Self {
        match err {
            WireError::UnknownTag(tag) => Self::UnknownTag(tag),
            WireError::Truncated { buffered } => Self::Truncated { buffered },
            WireError::Io(e) => Self::Io(e.kind()),
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerClosed => write!(f, "peer closed"),
            Self::Truncated { buffered } => {
                write!(f, "stream ended with {buffered} bytes of a partial request")
            }
            Self::UnknownTag(tag) => write!(f, "unknown tag 0x{tag:02x}"),
            Self::Io(kind) => write!(f, "io error: {kind}"),
            Self::LedgerFull { limit } => write!(f, "ledger full at {limit} records"),
            Self::IdleTimeout => write!(f, "idle timeout"),
            Self::Shutdown => write!(f, "server shutdown"),
        }
    }
}

/// One client session and the ledger it owns.
pub struct Session {
    id: SessionId,
    peer: SocketAddr,
    ledger: Ledger,
    limits: SessionLimits,
}

impl Session {
    pub fn new(id: SessionId, peer: SocketAddr, limits: SessionLimits) -> Self {
        Self {
            id,
            peer,
            ledger: Ledger::with_capacity_limit(limits.max_records),
            limits,
        }
    }

    /// Apply one request to the ledger.
    ///
    /// Returns the mean to send back for a query, `None` for an insert.
    pub fn apply(&mut self, msg: Message) -> mte_core::Result<Option<Price>> {
        Metrics::message(msg.kind());

        match msg {
            Message::Insert { timestamp, price } => {
                let record = PriceRecord::new(timestamp, price);
                self.ledger.insert(record)?;
                trace!(session_id = %self.id, peer = %self.peer, %record, "Record inserted");
                Ok(None)
            }
            Message::Query { min_time, max_time } => {
                let summary = self.ledger.summarize(min_time, max_time);
                Metrics::query_scanned(summary.scanned);
                let mean = summary.mean();
                trace!(
                    session_id = %self.id,
                    peer = %self.peer,
                    min_time,
                    max_time,
                    mean,
                    "Query answered"
                );
                Ok(Some(mean))
            }
        }
    }

    /// Serve requests until the connection ends, then drop the ledger.
    pub async fn run<S>(mut self, stream: S, shutdown: CancellationToken) -> SessionOutcome
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut framed = Framed::new(stream, MessageCodec::new());

        loop {
            let msg = tokio::select! {
                _ = shutdown.cancelled() => return SessionOutcome::Shutdown,
                next = next_request(&mut framed, self.limits.idle_timeout) => match next {
                    Ok(msg) => msg,
                    Err(outcome) => return outcome,
                },
            };

            match self.apply(msg) {
                Ok(None) => {}
                Ok(Some(mean)) => {
                    if let Err(e) = framed.send(mean).await {
                        return e.into();
                    }
                }
                Err(CoreError::LedgerFull { limit }) => {
                    return SessionOutcome::LedgerFull { limit };
                }
            }
        }
    }
}

/// Wait for the next complete request, bounded by the idle timeout if set.
async fn next_request<S>(
    framed: &mut Framed<S, MessageCodec>,
    idle_timeout: Option<Duration>,
) -> Result<Message, SessionOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let read = async {
        match framed.next().await {
            Some(Ok(msg)) => Ok(msg),
            Some(Err(e)) => Err(SessionOutcome::from(e)),
            None => Err(SessionOutcome::PeerClosed),
        }
    };

    match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, read)
            .await
            .unwrap_or(Err(SessionOutcome::IdleTimeout)),
        None => read.await,
    }
}
