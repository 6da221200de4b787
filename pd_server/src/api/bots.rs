//! Bot decision handler.

use super::{ApiError, api_error};
use crate::metrics;
use axum::{Json, http::StatusCode};
use poker_deal::{
    bot::{BotDecision, BotDecisionConfig, BotDecisionContext, BotDecisionMaker, BotDifficulty,
        DifficultyParams},
    cards::Card,
};
use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
pub struct BotDecisionRequest {
    /// Two cards, e.g. `["As", "Kd"]`
    pub hole_cards: Vec<Card>,
    #[serde(default)]
    pub board_cards: Vec<Card>,
    pub pot_size: u32,
    #[serde(default)]
    pub current_bet: u32,
    pub bot_chips: u32,
    #[serde(default)]
    pub big_blind: u32,
    /// Defaults to `current_bet == 0`
    pub can_check: Option<bool>,
    pub position: Option<usize>,
    pub players_remaining: usize,
    #[serde(default)]
    pub difficulty: BotDifficulty,
    /// Overrides the preset aggression factor (0.0-4.0)
    pub aggression: Option<f32>,
    /// Fixes the random draws for a reproducible decision
    pub seed: Option<u64>,
}

/// Decide a bot action.
///
/// # Errors
///
/// - `400 Bad Request`: wrong number of cards or duplicate cards
pub async fn decide(
    Json(payload): Json<BotDecisionRequest>,
) -> Result<Json<BotDecision>, ApiError> {
    if payload.hole_cards.len() != 2 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "exactly two hole cards are required",
        ));
    }
    if payload.board_cards.len() > 5 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "the board holds at most five cards",
        ));
    }
    let mut seen = HashSet::new();
    if let Some(duplicate) = payload
        .hole_cards
        .iter()
        .chain(&payload.board_cards)
        .find(|card| !seen.insert(**card))
    {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("card {duplicate} appears twice"),
        ));
    }

    let mut params = DifficultyParams::from_difficulty(payload.difficulty);
    if let Some(aggression) = payload.aggression {
        params = params.with_aggression(aggression);
    }

    let ctx = BotDecisionContext {
        hole_cards: &payload.hole_cards,
        board_cards: &payload.board_cards,
        pot_size: payload.pot_size,
        current_bet: payload.current_bet,
        bot_chips: payload.bot_chips,
        big_blind: payload.big_blind,
        can_check: payload.can_check.unwrap_or(payload.current_bet == 0),
        position: payload.position,
        players_remaining: payload.players_remaining,
    };

    let rng = match payload.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut decision_maker = BotDecisionMaker::with_rng(BotDecisionConfig::default(), rng);
    let decision = decision_maker.decide(&params, &ctx);

    metrics::bot_decisions_total(&decision.action.to_string());
    tracing::debug!(
        difficulty = %payload.difficulty,
        action = %decision.action,
        amount = decision.amount,
        strength = decision.hand_strength,
        "Bot decision"
    );

    Ok(Json(decision))
}
