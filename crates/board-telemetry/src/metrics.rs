//! Prometheus metrics for the ordering engine.
//!
//! All metrics follow the naming convention: `board_<side>_<metric>_total`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SERVER METRICS
    // =========================================================================

    /// Moves committed by the reorder executor
    pub static ref MOVES_COMMITTED: Counter = Counter::new(
        "board_server_moves_committed_total",
        "Total number of moves committed"
    ).expect("metric creation failed");

    /// Moves rejected before or during their transaction, by error kind
    pub static ref MOVES_REJECTED: CounterVec = CounterVec::new(
        Opts::new("board_server_moves_rejected_total", "Moves rejected by error kind"),
        &["kind"]  // not_found, validation, stale_scope, transaction_failure
    ).expect("metric creation failed");

    /// Transactions rolled back because the persistence layer aborted
    pub static ref TRANSACTIONS_ROLLED_BACK: Counter = Counter::new(
        "board_server_transactions_rolled_back_total",
        "Total number of transactions rolled back on a persistence failure"
    ).expect("metric creation failed");

    /// Bulk update batches, by outcome
    pub static ref BULK_BATCHES: CounterVec = CounterVec::new(
        Opts::new("board_server_bulk_batches_total", "Bulk update batches by outcome"),
        &["outcome"]  // applied, failed
    ).expect("metric creation failed");

    // =========================================================================
    // CLIENT METRICS
    // =========================================================================

    /// Client commits, by outcome
    pub static ref CLIENT_COMMITS: CounterVec = CounterVec::new(
        Opts::new("board_client_commits_total", "Client commits by outcome"),
        &["outcome"]  // confirmed, reverted, superseded
    ).expect("metric creation failed");

    /// Client commits that hit the commit timeout
    pub static ref COMMIT_TIMEOUTS: Counter = Counter::new(
        "board_client_commit_timeouts_total",
        "Total number of commits that timed out"
    ).expect("metric creation failed");
}

/// Handle to the registry holding the board metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Server
        Box::new(MOVES_COMMITTED.clone()),
        Box::new(MOVES_REJECTED.clone()),
        Box::new(TRANSACTIONS_ROLLED_BACK.clone()),
        Box::new(BULK_BATCHES.clone()),
        // Client
        Box::new(CLIENT_COMMITS.clone()),
        Box::new(COMMIT_TIMEOUTS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
