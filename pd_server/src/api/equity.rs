//! Equity API handlers.
//!
//! # Examples
//!
//! ```bash
//! curl -X POST http://localhost:6970/api/v1/equity/icm \
//!   -H "Content-Type: application/json" \
//!   -d '{"stacks": [5000, 3000, 2000], "payouts": [500, 300, 200]}'
//!
//! curl -X POST http://localhost:6970/api/v1/equity/simulated \
//!   -H "Content-Type: application/json" \
//!   -d '{"stacks": [5000, 3000, 2000], "payouts": [500, 300, 200], "trials": 20000, "seed": 7}'
//! ```

use super::{ApiError, AppState, api_error};
use crate::{config::EquitySettings, logging, metrics};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use poker_deal::equity::{
    EquityError, EquityMethod, EquityModel, estimate_chip_chop, estimate_icm_equities,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Most stacks accepted in one request
pub const MAX_STACKS: usize = 1_000;

#[derive(Debug, Deserialize)]
pub struct IcmRequest {
    pub stacks: Vec<f64>,
    pub payouts: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ChipChopRequest {
    pub stacks: Vec<f64>,
    pub prize_pool: f64,
}

#[derive(Debug, Deserialize)]
pub struct EquityRequest {
    pub stacks: Vec<f64>,
    #[serde(default)]
    pub payouts: Vec<f64>,
    /// Simulated method only
    pub trials: Option<usize>,
    /// Simulated method only
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EquityResponse {
    pub method: EquityMethod,
    pub equities: Vec<f64>,
    pub total: f64,
}

impl EquityResponse {
    fn new(method: EquityMethod, equities: Vec<f64>) -> Self {
        metrics::equity_computations_total(&method.to_string());
        Self {
            method,
            total: equities.iter().sum(),
            equities,
        }
    }
}

/// Approximate ICM equities.
///
/// # Errors
///
/// - `400 Bad Request`: negative amounts or too many stacks
pub async fn icm(Json(payload): Json<IcmRequest>) -> Result<Json<EquityResponse>, ApiError> {
    validate_amounts("stacks", &payload.stacks)?;
    validate_amounts("payouts", &payload.payouts)?;

    let equities = estimate_icm_equities(&payload.stacks, &payload.payouts);
    Ok(Json(EquityResponse::new(EquityMethod::Approximate, equities)))
}

/// Chip-chop split of a prize pool.
pub async fn chip_chop(
    Json(payload): Json<ChipChopRequest>,
) -> Result<Json<EquityResponse>, ApiError> {
    validate_amounts("stacks", &payload.stacks)?;
    validate_amounts("prize_pool", &[payload.prize_pool])?;

    let equities = estimate_chip_chop(&payload.stacks, payload.prize_pool);
    Ok(Json(EquityResponse::new(EquityMethod::ChipChop, equities)))
}

/// Equities with the method named in the path.
///
/// `approximate`, `chip-chop`, `exact` and `simulated` are accepted, plus
/// the aliases `EquityMethod` parses. For chip-chop the pool is the sum of
/// the payouts.
///
/// # Errors
///
/// - `400 Bad Request`: unknown method, invalid amounts or trial count
/// - `422 Unprocessable Entity`: too many players for exact ICM
pub async fn by_method(
    State(state): State<AppState>,
    Path(method): Path<String>,
    Json(payload): Json<EquityRequest>,
) -> Result<Json<EquityResponse>, ApiError> {
    let method: EquityMethod = method.parse().map_err(equity_error)?;
    validate_amounts("stacks", &payload.stacks)?;
    validate_amounts("payouts", &payload.payouts)?;
    let trials = resolve_trials(&state.equity, method, payload.trials)?;

    let estimator = method.estimator(trials, payload.seed);
    let stacks = payload.stacks;
    let payouts = payload.payouts;
    let equities = run_model(method, move || estimator.equities(&stacks, &payouts))
        .await?
        .map_err(equity_error)?;

    Ok(Json(EquityResponse::new(method, equities)))
}

/// Run a model; the exponential and sampling ones go to the blocking pool.
pub(crate) async fn run_model<T, F>(method: EquityMethod, compute: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let start = Instant::now();
    let result = if matches!(method, EquityMethod::Exact | EquityMethod::Simulated) {
        tokio::task::spawn_blocking(compute).await.map_err(|e| {
            tracing::error!(error = %e, method = %method, "Equity task failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })?
    } else {
        compute()
    };
    logging::log_performance(
        &format!("{method}_equity"),
        start.elapsed().as_millis() as u64,
        None,
    );
    Ok(result)
}

/// Trial count for a request, checked against the configured ceiling
pub(crate) fn resolve_trials(
    settings: &EquitySettings,
    method: EquityMethod,
    requested: Option<usize>,
) -> Result<usize, ApiError> {
    let trials = requested.unwrap_or(settings.default_trials);
    if method != EquityMethod::Simulated {
        return Ok(trials);
    }
    if trials == 0 || trials > settings.max_trials {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("trials must be between 1 and {}", settings.max_trials),
        ));
    }
    metrics::simulation_trials(trials);
    Ok(trials)
}

pub(crate) fn validate_amounts(field: &str, values: &[f64]) -> Result<(), ApiError> {
    if values.len() > MAX_STACKS {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("{field} may hold at most {MAX_STACKS} values"),
        ));
    }
    if let Some((index, value)) = values
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("{field}[{index}] must be a non-negative number, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn equity_error(err: EquityError) -> ApiError {
    let status = match err {
        EquityError::TooManyPlayers { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        EquityError::InvalidStack { .. }
        | EquityError::NoTrials
        | EquityError::UnknownMethod(_) => StatusCode::BAD_REQUEST,
    };
    api_error(status, err.to_string())
}
