//! Deal proposal handler.
//!
//! ```bash
//! curl -X POST http://localhost:6970/api/v1/deals \
//!   -H "Content-Type: application/json" \
//!   -d '{"method": "exact", "snapshot": {"tournament_id": 42,
//!        "participants": [{"user_id": 1, "chip_count": "5000"}, {"user_id": 2, "chip_count": 3000}],
//!        "payouts": [700, 300]}}'
//! ```

use super::{
    ApiError, AppState, api_error,
    equity::{equity_error, resolve_trials, run_model},
};
use crate::metrics;
use axum::{Json, extract::State, http::StatusCode};
use poker_deal::{
    equity::EquityMethod,
    tournament::{DealCalculator, DealProposal, TournamentError, TournamentSnapshot},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DealRequest {
    /// Defaults to the configured method
    pub method: Option<EquityMethod>,
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    /// Raw tournament snapshot, validated by the handler
    pub snapshot: serde_json::Value,
}

/// Propose a deal for the live players of a tournament snapshot.
///
/// # Errors
///
/// - `400 Bad Request`: malformed snapshot or trial count
/// - `422 Unprocessable Entity`: invalid rows, payouts or no live players
pub async fn propose_deal(
    State(state): State<AppState>,
    Json(payload): Json<DealRequest>,
) -> Result<Json<DealProposal>, ApiError> {
    let method = payload.method.unwrap_or(state.equity.default_method);
    let trials = resolve_trials(&state.equity, method, payload.trials)?;
    let snapshot = TournamentSnapshot::from_value(payload.snapshot).map_err(tournament_error)?;

    let mut calculator = DealCalculator::new(method).with_trials(trials);
    if let Some(seed) = payload.seed {
        calculator = calculator.with_seed(seed);
    }

    let proposal = run_model(method, move || calculator.propose(&snapshot))
        .await?
        .map_err(tournament_error)?;

    metrics::equity_computations_total(&method.to_string());
    metrics::deal_rounding_drift(proposal.rounding_drift());
    tracing::info!(
        tournament_id = proposal.tournament_id,
        method = %proposal.method,
        players = proposal.lines.len(),
        prize_pool = proposal.prize_pool,
        "Deal proposed"
    );

    Ok(Json(proposal))
}

fn tournament_error(err: TournamentError) -> ApiError {
    match err {
        TournamentError::Equity(inner) => equity_error(inner),
        TournamentError::Serialization(_) => {
            api_error(StatusCode::BAD_REQUEST, err.client_message())
        }
        TournamentError::InvalidRow { .. }
        | TournamentError::NegativeStack { .. }
        | TournamentError::InvalidPayout { .. }
        | TournamentError::NoLivePlayers(_) => {
            api_error(StatusCode::UNPROCESSABLE_ENTITY, err.client_message())
        }
    }
}
