//! Prometheus counters and histograms for the deal service.
//!
//! The exporter listens on its own address (`--metrics-bind`), separate
//! from the API. Route labels use the matched template so cardinality stays
//! bounded.
//!
//! ```rust,no_run
//! use pd_server::metrics;
//!
//! metrics::init_metrics("127.0.0.1:9090".parse().unwrap()).unwrap();
//! metrics::equity_computations_total("exact");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the global recorder and serve `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Prometheus exporter on {addr}: {e}"))
}

// http metrics

pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// equity metrics

/// One per estimator run, including those behind a deal proposal.
pub fn equity_computations_total(method: &str) {
    metrics::counter!("equity_computations_total",
        "method" => method.to_string()
    )
    .increment(1);
}

pub fn simulation_trials(trials: usize) {
    metrics::histogram!("simulation_trials").record(trials as f64);
}

/// Whole-unit payouts minus the unrounded total, per proposal.
pub fn deal_rounding_drift(drift: f64) {
    metrics::histogram!("deal_rounding_drift").record(drift);
}

// bot metrics

pub fn bot_decisions_total(action: &str) {
    metrics::counter!("bot_decisions_total",
        "action" => action.to_string()
    )
    .increment(1);
}

// moderation metrics

pub fn bans_issued_total() {
    metrics::counter!("bans_issued_total").increment(1);
}

pub fn bans_lifted_total() {
    metrics::counter!("bans_lifted_total").increment(1);
}

/// Replayed idempotency keys are not counted.
pub fn ledger_entries_total(wallet: &str, direction: &str) {
    metrics::counter!("ledger_entries_total",
        "wallet" => wallet.to_string(),
        "direction" => direction.to_string()
    )
    .increment(1);
}

/// Missing or wrong admin token.
pub fn admin_auth_failures_total() {
    metrics::counter!("admin_auth_failures_total").increment(1);
}
