//! HTTP API for the deal service.
//!
//! # Modules
//!
//! - [`equity`]: equity estimators over raw stacks and payouts
//! - [`deals`]: deal proposals for tournament snapshots
//! - [`bots`]: bot decision heuristic
//! - [`moderation`]: ban list and wallet adjustment log (admin only)
//! - [`middleware`]: admin token check and HTTP metrics
//! - [`request_id`]: request id propagation
//!
//! # Routes
//!
//! ```text
//! GET    /health                       - Health check (public)
//! POST   /api/v1/equity/icm            - Approximate ICM
//! POST   /api/v1/equity/chip-chop      - Chip-chop split
//! POST   /api/v1/equity/{method}       - Any equity method
//! POST   /api/v1/deals                 - Deal proposal for a snapshot
//! POST   /api/v1/bots/decide           - Bot decision
//! POST   /api/v1/bans                  - Ban a user (admin)
//! GET    /api/v1/bans                  - List bans (admin)
//! GET    /api/v1/bans/{user_id}        - Ban status (admin)
//! DELETE /api/v1/bans/{user_id}        - Lift a ban (admin)
//! POST   /api/v1/ledger                - Record an adjustment (admin)
//! GET    /api/v1/ledger/{user_id}      - Adjustment history (admin)
//! ```
//!
//! CORS is wide open; the admin routes rely on the bearer token alone.

pub mod bots;
pub mod deals;
pub mod equity;
pub mod middleware;
pub mod moderation;
pub mod request_id;

use crate::config::EquitySettings;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use middleware::AdminToken;
use poker_deal::moderation::ModerationManager;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Handler state. Every field is a handle, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub moderation: ModerationManager,
    pub admin_token: Arc<AdminToken>,
    pub equity: EquitySettings,
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Full router: `/health`, the v1 routes, and the request-id, metrics and
/// CORS layers.
///
/// ```rust,no_run
/// # use pd_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(middleware::metrics_middleware))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/equity/icm", post(equity::icm))
        .route("/equity/chip-chop", post(equity::chip_chop))
        .route("/equity/{method}", post(equity::by_method))
        .route("/deals", post(deals::propose_deal))
        .route("/bots/decide", post(bots::decide));

    // bearer token required
    let admin_routes = Router::new()
        .route(
            "/bans",
            post(moderation::create_ban).get(moderation::list_bans),
        )
        .route(
            "/bans/{user_id}",
            get(moderation::ban_status).delete(moderation::lift_ban),
        )
        .route("/ledger", post(moderation::record_adjustment))
        .route("/ledger/{user_id}", get(moderation::ledger_history))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::admin_auth_middleware,
        ));

    Router::new().merge(public_routes).merge(admin_routes)
}

/// 200 while the moderation store answers, 503 otherwise.
///
/// ```bash
/// curl http://localhost:6970/health
/// # {"status":"healthy","version":"0.3.0","storage":true,"timestamp":"2026-10-19T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage_healthy = match state.moderation.repository().health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Moderation store health check failed");
            false
        }
    };

    let status_code = if storage_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if storage_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
