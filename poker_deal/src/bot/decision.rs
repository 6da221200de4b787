//! Heuristic bot actions for a single betting decision.
//!
//! A rule table over estimated hand strength: fold or check below the fold
//! threshold (with occasional bluffs), call or fold in the middle band
//! depending on aggression and pot odds, bet or raise above the raise
//! threshold. Every decision carries a human-readable rationale.

use super::models::DifficultyParams;
use crate::cards::{Card, Rank, evaluate};
use rand::{Rng, rngs::ThreadRng};
use serde::{Deserialize, Serialize};
use std::fmt;

// Category floors for made hands; `estimate_hand_strength` adds up to 0.1
// on top for the highest card involved.
const STRENGTH_HIGH_CARD: f32 = 0.1;
const STRENGTH_ONE_PAIR: f32 = 0.25;
const STRENGTH_TWO_PAIR: f32 = 0.40;
const STRENGTH_THREE_OF_A_KIND: f32 = 0.55;
const STRENGTH_STRAIGHT: f32 = 0.70;
const STRENGTH_FLUSH: f32 = 0.75;
const STRENGTH_FULL_HOUSE: f32 = 0.85;
const STRENGTH_FOUR_OF_A_KIND: f32 = 0.95;
const STRENGTH_STRAIGHT_FLUSH: f32 = 0.99;

/// Tunables for the rule table.
///
/// Thresholds live on the same 0..1 scale as the strength estimate; raising
/// one tightens that profile.
///
/// ```
/// use poker_deal::bot::decision::BotDecisionConfig;
///
/// let config = BotDecisionConfig::default();
/// assert_eq!(config.easy_fold_threshold, 0.08);
/// assert_eq!(config.tag_raise_threshold, 0.33);
/// ```
#[derive(Debug, Clone)]
pub struct BotDecisionConfig {
    pub easy_fold_threshold: f32,
    pub easy_raise_threshold: f32,
    pub standard_fold_threshold: f32,
    pub standard_raise_threshold: f32,
    pub tag_fold_threshold: f32,
    pub tag_raise_threshold: f32,

    /// Bluff bet, in pots.
    pub bluff_size_multiplier: f32,

    /// Price (call / (pot + call)) above which a marginal call gets
    /// `pot_odds_bonus_value` added to its probability.
    pub pot_odds_bonus_threshold: f32,
    pub pot_odds_bonus_value: f32,

    /// Marginal hands call with `base + aggression / divisor (+ bonus)`.
    pub base_call_probability: f32,
    pub call_aggression_divisor: f32,

    /// Strong hands raise with `base + aggression / divisor`.
    pub base_raise_probability: f32,
    pub raise_aggression_divisor: f32,

    /// Raise size in pots, picked by aggression band (<1, 1..=2, >2).
    pub passive_raise_multiplier: f32,
    pub moderate_raise_multiplier: f32,
    pub aggressive_raise_multiplier: f32,

    /// Raise size jitter as a fraction either side of the target.
    pub raise_variance: f32,

    /// Preflop shape bonuses. A one-gapper earns half the connector bonus.
    pub suited_bonus: f32,
    pub connector_bonus: f32,

    /// Seat adjustments, from the button backwards.
    pub late_position_bonus: f32,
    pub middle_position_bonus: f32,
    pub early_middle_position_penalty: f32,
    pub utg_position_penalty: f32,
}

impl Default for BotDecisionConfig {
    fn default() -> Self {
        Self {
            easy_fold_threshold: 0.08,
            easy_raise_threshold: 0.20,
            standard_fold_threshold: 0.12,
            standard_raise_threshold: 0.28,
            tag_fold_threshold: 0.18,
            tag_raise_threshold: 0.33,
            bluff_size_multiplier: 1.5,
            pot_odds_bonus_threshold: 0.25,
            pot_odds_bonus_value: 0.2,
            base_call_probability: 0.3,
            call_aggression_divisor: 5.0,
            base_raise_probability: 0.4,
            raise_aggression_divisor: 4.0,
            passive_raise_multiplier: 2.0,
            moderate_raise_multiplier: 2.5,
            aggressive_raise_multiplier: 3.0,
            raise_variance: 0.2,
            suited_bonus: 0.04,
            connector_bonus: 0.03,
            late_position_bonus: 0.08,
            middle_position_bonus: 0.04,
            early_middle_position_penalty: -0.03,
            utg_position_penalty: -0.05,
        }
    }
}

/// Discrete action chosen by a bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotAction {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

impl fmt::Display for BotAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Fold => "fold",
            Self::Check => "check",
            Self::Call => "call",
            Self::Bet => "bet",
            Self::Raise => "raise",
            Self::AllIn => "all_in",
        };
        write!(f, "{repr}")
    }
}

/// A bot's decision with its sizing and reasoning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotDecision {
    pub action: BotAction,
    /// Chips committed by the action (0 for fold and check)
    pub amount: u32,
    /// Position-adjusted hand strength the decision was based on
    pub hand_strength: f32,
    pub rationale: String,
}

/// What the bot can see when it acts. Chip amounts share one unit.
#[derive(Debug, Clone)]
pub struct BotDecisionContext<'a> {
    pub hole_cards: &'a [Card],
    pub board_cards: &'a [Card],
    pub pot_size: u32,
    /// Amount facing the bot; ignored when `can_check` is set.
    pub current_bet: u32,
    pub bot_chips: u32,
    /// Smallest opening bet.
    pub big_blind: u32,
    pub can_check: bool,
    /// Seats after the button, button = 0. `None` scores as mid-table.
    pub position: Option<usize>,
    pub players_remaining: usize,
}

/// Rule-table decision maker; generic over the rng so tests can seed it.
pub struct BotDecisionMaker<R: Rng = ThreadRng> {
    rng: R,
    config: BotDecisionConfig,
}

impl BotDecisionMaker<ThreadRng> {
    pub fn new() -> Self {
        Self::with_config(BotDecisionConfig::default())
    }

    pub fn with_config(config: BotDecisionConfig) -> Self {
        Self::with_rng(config, rand::rng())
    }
}

impl Default for BotDecisionMaker<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> BotDecisionMaker<R> {
    /// Create a decision maker drawing randomness from `rng`
    pub fn with_rng(config: BotDecisionConfig, rng: R) -> Self {
        Self { rng, config }
    }

    pub fn config(&self) -> &BotDecisionConfig {
        &self.config
    }

    /// Decide the bot's action for the given play style and game state
    pub fn decide(&mut self, params: &DifficultyParams, ctx: &BotDecisionContext) -> BotDecision {
        let raw_strength = self.estimate_hand_strength(ctx.hole_cards, ctx.board_cards);
        let position_modifier =
            self.calculate_position_modifier(ctx.position, ctx.players_remaining);
        let hand_strength = (raw_strength + position_modifier).clamp(0.0, 1.0);
        let hand = describe_hand(ctx.hole_cards, ctx.board_cards);

        let to_call = if ctx.can_check { 0 } else { ctx.current_bet };
        let (fold_threshold, raise_threshold) = self.thresholds(params);

        // Already all-in: nothing left to wager
        if ctx.bot_chips == 0 {
            return decision(
                BotAction::Check,
                0,
                hand_strength,
                format!("{hand} (strength {hand_strength:.2}) with no chips behind; checking"),
            );
        }

        // Facing a bet that covers the whole stack: shove or fold
        if to_call > 0 && ctx.bot_chips <= to_call {
            return if hand_strength >= fold_threshold {
                decision(
                    BotAction::AllIn,
                    ctx.bot_chips,
                    hand_strength,
                    format!(
                        "{hand} (strength {hand_strength:.2}) facing {to_call} with {} behind; calling all-in",
                        ctx.bot_chips
                    ),
                )
            } else {
                decision(
                    BotAction::Fold,
                    0,
                    hand_strength,
                    format!(
                        "{hand} (strength {hand_strength:.2}) too weak to risk the whole stack against {to_call}"
                    ),
                )
            };
        }

        if hand_strength < fold_threshold {
            if ctx.can_check {
                return decision(
                    BotAction::Check,
                    0,
                    hand_strength,
                    format!(
                        "{hand} (strength {hand_strength:.2}) below fold threshold {fold_threshold:.2}; checking for free"
                    ),
                );
            }
            if params.bluffs
                && self
                    .rng
                    .random_bool(f64::from(params.bluff_frequency.clamp(0.0, 1.0)))
            {
                let bluff_size = (ctx.pot_size as f32 * self.config.bluff_size_multiplier) as u32;
                return self.aggressive_action(
                    ctx,
                    bluff_size,
                    hand_strength,
                    format!("{hand} (strength {hand_strength:.2}) is weak; bluffing at the pot"),
                );
            }
            return decision(
                BotAction::Fold,
                0,
                hand_strength,
                format!(
                    "{hand} (strength {hand_strength:.2}) below fold threshold {fold_threshold:.2}; folding to {to_call}"
                ),
            );
        }

        // Marginal band
        if hand_strength < raise_threshold {
            if ctx.can_check {
                return decision(
                    BotAction::Check,
                    0,
                    hand_strength,
                    format!("{hand} (strength {hand_strength:.2}) is marginal; checking"),
                );
            }

            let pot_odds = self.calculate_pot_odds(ctx.pot_size, to_call);
            let pot_odds_bonus = if pot_odds > self.config.pot_odds_bonus_threshold {
                self.config.pot_odds_bonus_value
            } else {
                0.0
            };

            let call_probability = self.config.base_call_probability
                + (params.aggression_factor / self.config.call_aggression_divisor)
                + pot_odds_bonus;
            if self
                .rng
                .random_bool(f64::from(call_probability.clamp(0.0, 1.0)))
            {
                return decision(
                    BotAction::Call,
                    to_call,
                    hand_strength,
                    format!(
                        "{hand} (strength {hand_strength:.2}) is marginal; pot odds {pot_odds:.2} justify calling {to_call}"
                    ),
                );
            }
            return decision(
                BotAction::Fold,
                0,
                hand_strength,
                format!(
                    "{hand} (strength {hand_strength:.2}) is marginal; pot odds {pot_odds:.2} not worth calling {to_call}"
                ),
            );
        }

        let raise_probability = self.config.base_raise_probability
            + (params.aggression_factor / self.config.raise_aggression_divisor);
        if self
            .rng
            .random_bool(f64::from(raise_probability.clamp(0.0, 1.0)))
        {
            let raise_amount = self.calculate_raise_amount(params, ctx.pot_size, to_call, ctx.bot_chips);
            self.aggressive_action(
                ctx,
                raise_amount,
                hand_strength,
                format!(
                    "{hand} (strength {hand_strength:.2}) above raise threshold {raise_threshold:.2}; building the pot"
                ),
            )
        } else if ctx.can_check {
            decision(
                BotAction::Check,
                0,
                hand_strength,
                format!("{hand} (strength {hand_strength:.2}) is strong; slow-playing with a check"),
            )
        } else {
            decision(
                BotAction::Call,
                to_call,
                hand_strength,
                format!("{hand} (strength {hand_strength:.2}) is strong; flat-calling {to_call} to trap"),
            )
        }
    }

    /// Fold and raise thresholds for a play style, selected by VPIP
    fn thresholds(&self, params: &DifficultyParams) -> (f32, f32) {
        match params.vpip {
            v if v > 0.40 => (
                self.config.easy_fold_threshold,
                self.config.easy_raise_threshold,
            ),
            v if v > 0.25 => (
                self.config.standard_fold_threshold,
                self.config.standard_raise_threshold,
            ),
            _ => (
                self.config.tag_fold_threshold,
                self.config.tag_raise_threshold,
            ),
        }
    }

    /// Bet when nobody has bet, raise otherwise, all-in when the size covers
    /// the stack.
    fn aggressive_action(
        &self,
        ctx: &BotDecisionContext,
        size: u32,
        hand_strength: f32,
        rationale: String,
    ) -> BotDecision {
        let to_call = if ctx.can_check { 0 } else { ctx.current_bet };
        let size = size
            .max(to_call.saturating_mul(2))
            .max(ctx.big_blind)
            .max(1);

        if size >= ctx.bot_chips {
            decision(
                BotAction::AllIn,
                ctx.bot_chips,
                hand_strength,
                format!("{rationale}; size covers the stack, moving all-in"),
            )
        } else if to_call == 0 {
            decision(BotAction::Bet, size, hand_strength, rationale)
        } else {
            decision(BotAction::Raise, size, hand_strength, rationale)
        }
    }

    fn calculate_raise_amount(
        &mut self,
        params: &DifficultyParams,
        pot_size: u32,
        current_bet: u32,
        bot_chips: u32,
    ) -> u32 {
        let base_multiplier = match params.aggression_factor {
            x if x < 1.0 => self.config.passive_raise_multiplier,
            x if x < 2.0 => self.config.moderate_raise_multiplier,
            _ => self.config.aggressive_raise_multiplier,
        };

        let variance = self
            .rng
            .random_range(-self.config.raise_variance..=self.config.raise_variance);
        let multiplier = base_multiplier * (1.0 + variance);

        let target = pot_size.saturating_add(current_bet) as f32 * multiplier;
        (target as u32).min(bot_chips)
    }

    /// Share of the final pot already in the middle: 100 in the pot facing
    /// a 50 call gives 0.67. A free look scores 1.0.
    fn calculate_pot_odds(&self, pot_size: u32, call_amount: u32) -> f32 {
        match call_amount {
            0 => 1.0,
            call => pot_size as f32 / pot_size.saturating_add(call) as f32,
        }
    }

    /// Seats count back from the button (0). The first fifth of the table
    /// gets the late bonus and the last fifth the UTG penalty. Heads-up
    /// play and unknown seats are neutral.
    fn calculate_position_modifier(
        &self,
        position: Option<usize>,
        players_remaining: usize,
    ) -> f32 {
        if players_remaining <= 2 {
            return 0.0;
        }

        let seat = position.unwrap_or(players_remaining / 2);
        match seat as f32 / players_remaining as f32 {
            x if x < 0.2 => self.config.late_position_bonus,
            x if x < 0.4 => self.config.middle_position_bonus,
            x if x < 0.6 => 0.0,
            x if x < 0.8 => self.config.early_middle_position_penalty,
            _ => self.config.utg_position_penalty,
        }
    }

    /// Rough 0..1 strength of the best hand the cards make.
    pub fn estimate_hand_strength(&self, hole_cards: &[Card], board_cards: &[Card]) -> f32 {
        if board_cards.is_empty() {
            if let [first, second] = hole_cards {
                return self.preflop_strength(*first, *second);
            }
        }

        let mut all_cards = Vec::with_capacity(hole_cards.len() + board_cards.len());
        all_cards.extend_from_slice(hole_cards);
        all_cards.extend_from_slice(board_cards);

        if all_cards.len() < 2 {
            return 0.0;
        }

        let Some(hand) = evaluate(&all_cards) else {
            return 0.0;
        };

        let base_strength = match hand.rank {
            Rank::HighCard => STRENGTH_HIGH_CARD,
            Rank::OnePair => STRENGTH_ONE_PAIR,
            Rank::TwoPair => STRENGTH_TWO_PAIR,
            Rank::ThreeOfAKind => STRENGTH_THREE_OF_A_KIND,
            Rank::Straight => STRENGTH_STRAIGHT,
            Rank::Flush => STRENGTH_FLUSH,
            Rank::FullHouse => STRENGTH_FULL_HOUSE,
            Rank::FourOfAKind => STRENGTH_FOUR_OF_A_KIND,
            Rank::StraightFlush => STRENGTH_STRAIGHT_FLUSH,
        };

        let top = hand.values.iter().copied().max().unwrap_or(0);
        (base_strength + f32::from(top) / 140.0).min(1.0)
    }

    /// Two hole cards and no board: pairs scale from one-pair strength,
    /// unpaired hands by card height with suited and connected bonuses.
    fn preflop_strength(&self, first: Card, second: Card) -> f32 {
        let (high, low) = if first.0 >= second.0 {
            (first.0, second.0)
        } else {
            (second.0, first.0)
        };

        if high == low {
            return STRENGTH_ONE_PAIR + (high as f32 / 14.0) * 0.25;
        }

        let mut strength = f32::from(high + low) / 28.0 * 0.3;
        if first.1 == second.1 {
            strength += self.config.suited_bonus;
        }
        match high - low {
            1 => strength += self.config.connector_bonus,
            2 => strength += self.config.connector_bonus / 2.0,
            _ => {}
        }
        strength.min(1.0)
    }
}

fn decision(action: BotAction, amount: u32, hand_strength: f32, rationale: String) -> BotDecision {
    BotDecision {
        action,
        amount,
        hand_strength,
        rationale,
    }
}

/// Short description of what the bot holds, for rationales.
fn describe_hand(hole_cards: &[Card], board_cards: &[Card]) -> String {
    let hole: Vec<String> = hole_cards.iter().map(Card::to_string).collect();
    if board_cards.is_empty() {
        return format!("pre-flop {}", hole.join(""));
    }

    let mut all_cards = hole_cards.to_vec();
    all_cards.extend_from_slice(board_cards);
    match evaluate(&all_cards) {
        Some(hand) => format!("{} with {}", hole.join(""), hand.rank),
        None => "no cards".to_string(),
    }
}
