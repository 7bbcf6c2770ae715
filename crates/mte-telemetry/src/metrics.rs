//! Prometheus metrics for the price ledger service.
//!
//! Metrics are process-wide and never feed back into protocol behavior.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, a programming error that should crash at
//! first use rather than silently drop observability.

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Total sessions accepted.
pub static SESSIONS_OPENED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("mte_sessions_opened_total", "Total sessions accepted").unwrap()
});

/// Sessions currently open.
pub static SESSIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("mte_sessions_active", "Sessions currently open").unwrap()
});

/// Total sessions closed.
/// Labels: outcome (peer_closed/truncated/unknown_tag/io/ledger_full/idle_timeout/shutdown)
pub static SESSIONS_CLOSED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "mte_sessions_closed_total",
        "Total sessions closed, by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Total requests processed.
/// Labels: kind (insert/query)
pub static MESSAGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "mte_messages_total",
        "Total requests processed, by kind",
        &["kind"]
    )
    .unwrap()
});

/// Ledger size scanned per query.
pub static QUERY_RECORDS_SCANNED: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "mte_query_records_scanned",
        "Number of ledger records scanned per query",
        vec![0.0, 1.0, 10.0, 100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0]
    )
    .unwrap()
});

/// Connections refused because the connection limit was reached.
pub static CONNECTIONS_REJECTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "mte_connections_rejected_total",
        "Connections refused at the connection limit"
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Force registration so every metric is exported from startup, even
    /// before its first observation.
    pub fn init() {
        Lazy::force(&SESSIONS_OPENED_TOTAL);
        Lazy::force(&SESSIONS_ACTIVE);
        Lazy::force(&SESSIONS_CLOSED_TOTAL);
        Lazy::force(&MESSAGES_TOTAL);
        Lazy::force(&QUERY_RECORDS_SCANNED);
        Lazy::force(&CONNECTIONS_REJECTED_TOTAL);
    }

    /// Record a session opening.
    pub fn session_opened() {
        SESSIONS_OPENED_TOTAL.inc();
        SESSIONS_ACTIVE.inc();
    }

    /// Record a session closing.
    pub fn session_closed(outcome: &str) {
        SESSIONS_ACTIVE.dec();
        SESSIONS_CLOSED_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record a processed request.
    pub fn message(kind: &str) {
        MESSAGES_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record the ledger size a query scanned.
    pub fn query_scanned(records: usize) {
        QUERY_RECORDS_SCANNED.observe(records as f64);
    }

    /// Record a refused connection.
    pub fn connection_rejected() {
        CONNECTIONS_REJECTED_TOTAL.inc();
    }
}
