//! Ban list and wallet adjustment handlers (admin only).
//!
//! # Examples
//!
//! ```bash
//! curl -X POST http://localhost:6970/api/v1/bans \
//!   -H "Authorization: Bearer $ADMIN_TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"user_id": "u-123", "reason": "chip dumping", "duration_hours": 72}'
//!
//! curl -X POST http://localhost:6970/api/v1/ledger \
//!   -H "Authorization: Bearer $ADMIN_TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"user_id": "u-123", "wallet": "diamonds", "amount": 50, "direction": "credit",
//!        "idempotency_key": "refund-991", "performed_by": "ops"}'
//! ```

use super::{ApiError, AppState, api_error, request_id::RequestId};
use crate::metrics;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Duration;
use poker_deal::moderation::{
    AdjustmentRequest, Ban, LedgerEntry, ModerationError, WalletKind,
};
use serde::{Deserialize, Serialize};

/// Longest ban that can be given a duration (ten years)
const MAX_BAN_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Deserialize)]
pub struct CreateBanRequest {
    pub user_id: String,
    pub reason: String,
    /// Administrator name recorded with the ban
    #[serde(default = "default_actor")]
    pub banned_by: String,
    /// None for a permanent ban
    pub duration_hours: Option<i64>,
}

fn default_actor() -> String {
    "admin".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ListBansQuery {
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BanStatusResponse {
    pub user_id: String,
    pub banned: bool,
    pub ban: Option<Ban>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerHistoryResponse {
    pub user_id: String,
    pub entries: Vec<LedgerEntry>,
    pub net_credits: i64,
    pub net_diamonds: i64,
}

/// Ban a user.
///
/// # Errors
///
/// - `400 Bad Request`: missing reason or bad duration
/// - `409 Conflict`: user already banned
pub async fn create_ban(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(payload): Json<CreateBanRequest>,
) -> Result<(StatusCode, Json<Ban>), ApiError> {
    if payload.user_id.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "user_id is required"));
    }
    let duration = match payload.duration_hours {
        None => None,
        Some(hours) => Some(
            (1..=MAX_BAN_HOURS)
                .contains(&hours)
                .then(|| Duration::try_hours(hours))
                .flatten()
                .ok_or_else(|| {
                    api_error(
                        StatusCode::BAD_REQUEST,
                        format!(
                            "duration_hours must be between 1 and {MAX_BAN_HOURS}; omit it for a permanent ban"
                        ),
                    )
                })?,
        ),
    };

    let ban = state
        .moderation
        .ban_user(
            payload.user_id.trim(),
            &payload.reason,
            &payload.banned_by,
            duration,
        )
        .await
        .map_err(moderation_error)?;

    metrics::bans_issued_total();
    tracing::info!(
        request_id = request_id.as_str(),
        user_id = %ban.user_id,
        banned_by = %ban.banned_by,
        "User banned"
    );
    Ok((StatusCode::CREATED, Json(ban)))
}

/// List bans, newest first. `?active=true` keeps only bans in force.
pub async fn list_bans(
    State(state): State<AppState>,
    Query(query): Query<ListBansQuery>,
) -> Result<Json<Vec<Ban>>, ApiError> {
    let bans = state
        .moderation
        .list_bans(query.active)
        .await
        .map_err(moderation_error)?;
    Ok(Json(bans))
}

/// Ban status of one user.
pub async fn ban_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BanStatusResponse>, ApiError> {
    let ban = state
        .moderation
        .active_ban(&user_id)
        .await
        .map_err(moderation_error)?;
    Ok(Json(BanStatusResponse {
        user_id,
        banned: ban.is_some(),
        ban,
    }))
}

/// Lift the active ban of a user.
///
/// # Errors
///
/// - `404 Not Found`: no ban in force
pub async fn lift_ban(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .moderation
        .unban_user(&user_id)
        .await
        .map_err(moderation_error)?;

    metrics::bans_lifted_total();
    tracing::info!(request_id = request_id.as_str(), user_id = %user_id, "Ban lifted");
    Ok(StatusCode::NO_CONTENT)
}

/// Record a credit or diamond adjustment.
///
/// Replaying the same `idempotency_key` returns the original entry.
///
/// # Errors
///
/// - `400 Bad Request`: amount not positive or above the per-entry limit
/// - `409 Conflict`: key already used for a different adjustment
pub async fn record_adjustment(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(payload): Json<AdjustmentRequest>,
) -> Result<Json<LedgerEntry>, ApiError> {
    if payload.user_id.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "user_id is required"));
    }

    let entry = state
        .moderation
        .record_adjustment(payload)
        .await
        .map_err(moderation_error)?;

    metrics::ledger_entries_total(entry.wallet.as_str(), entry.direction.as_str());
    tracing::info!(
        request_id = request_id.as_str(),
        user_id = %entry.user_id,
        wallet = %entry.wallet,
        direction = %entry.direction,
        amount = entry.amount,
        "Ledger entry recorded"
    );
    Ok(Json(entry))
}

/// Adjustment history of a user with net totals per wallet.
///
/// `422 Unprocessable Entity` when a net total leaves the i64 range.
pub async fn ledger_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<LedgerHistoryResponse>, ApiError> {
    let entries = state
        .moderation
        .history(&user_id, query.limit)
        .await
        .map_err(moderation_error)?;
    let net_credits = state
        .moderation
        .net_adjustment(&user_id, WalletKind::Credits)
        .await
        .map_err(moderation_error)?;
    let net_diamonds = state
        .moderation
        .net_adjustment(&user_id, WalletKind::Diamonds)
        .await
        .map_err(moderation_error)?;

    Ok(Json(LedgerHistoryResponse {
        user_id,
        entries,
        net_credits,
        net_diamonds,
    }))
}

fn moderation_error(err: ModerationError) -> ApiError {
    let status = match &err {
        ModerationError::ReasonRequired
        | ModerationError::InvalidDuration
        | ModerationError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
        ModerationError::AlreadyBanned(_)
        | ModerationError::DuplicateKey(_)
        | ModerationError::KeyConflict(_) => StatusCode::CONFLICT,
        ModerationError::NotBanned(_) => StatusCode::NOT_FOUND,
        ModerationError::NetOverflow(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ModerationError::Database(_) | ModerationError::CorruptRecord(_) => {
            tracing::error!(error = %err, "Moderation store error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    api_error(status, err.client_message())
}
