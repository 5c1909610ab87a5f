//! Metrics collection.
//!
//! # Metrics
//! - `suispresso_rpc_errors_total` (counter): failed JSON-RPC calls by method
//! - `suispresso_transactions_total` (counter): transactions by workflow, status
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; the binary decides on export
//! - Labels are low-cardinality (method names, workflow names)

use metrics::counter;

pub fn record_rpc_error(method: &str) {
    counter!("suispresso_rpc_errors_total", "method" => method.to_string()).increment(1);
}

pub fn record_transaction(workflow: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "suispresso_transactions_total",
        "workflow" => workflow.to_string(),
        "status" => status
    )
    .increment(1);
}
