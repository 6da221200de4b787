//! Structured logging configuration.
//!
//! The library crates log through the `log` facade; `tracing-subscriber`
//! bridges those records into the same output as the server's own events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Install the global subscriber. Later calls are no-ops.
///
/// ```no_run
/// use pd_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        tracing::debug!(filter = DEFAULT_FILTER, "logging ready");
    }
}

/// Warn-level event for anything touching admin credentials.
///
/// ```
/// use pd_server::logging::log_security_event;
///
/// log_security_event(
///     "admin_auth_failed",
///     None,
///     Some("6f1c..."),
///     "Invalid admin token"
/// );
/// ```
pub fn log_security_event(
    event_type: &str,
    subject: Option<&str>,
    request_id: Option<&str>,
    message: &str,
) {
    tracing::warn!(
        event_type = event_type,
        subject = subject,
        request_id = request_id,
        "SECURITY: {}",
        message
    );
}

/// Timing of an expensive computation; anything slower than
/// [`SLOW_OPERATION_MS`] is logged as a warning.
pub fn log_performance(operation: &str, duration_ms: u64, detail: Option<&str>) {
    if duration_ms > SLOW_OPERATION_MS {
        tracing::warn!(operation, duration_ms, detail, "slow computation");
    } else {
        tracing::debug!(operation, duration_ms, detail, "computation finished");
    }
}

pub const SLOW_OPERATION_MS: u64 = 1000;

/// One line per finished request.
pub fn log_api_request(
    method: &str,
    path: &str,
    status_code: u16,
    duration_ms: u64,
    request_id: Option<&str>,
) {
    tracing::info!(
        http_method = method,
        http_path = path,
        http_status = status_code,
        duration_ms = duration_ms,
        request_id = request_id,
        "request finished"
    );
}
