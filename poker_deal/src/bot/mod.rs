//! Bot decision heuristic with difficulty presets.
//!
//! Given hole cards, board, pot, the bet to call and table position, a bot
//! picks an action, a size and a short rationale.
//!
//! ## Difficulty Presets
//!
//! ### Easy (Loose-Passive)
//! - VPIP: 45% (plays many hands)
//! - Aggression: 0.5 (passive)
//! - Never bluffs
//!
//! ### Standard (Balanced)
//! - VPIP: 30% (moderate range)
//! - Aggression: 1.5 (moderately aggressive)
//! - Bluffs 15% of time
//!
//! ### TAG (Tight-Aggressive)
//! - VPIP: 20% (very tight)
//! - Aggression: 2.5 (very aggressive)
//! - Bluffs 25% of time
//!
//! ## Example
//!
//! ```
//! use poker_deal::bot::{BotAction, BotDecisionContext, BotDecisionMaker, DifficultyParams};
//! use poker_deal::cards::Card;
//!
//! let hole: Vec<Card> = ["7c", "2d"].iter().map(|c| c.parse().unwrap()).collect();
//! let ctx = BotDecisionContext {
//!     hole_cards: &hole,
//!     board_cards: &[],
//!     pot_size: 30,
//!     current_bet: 0,
//!     bot_chips: 1000,
//!     big_blind: 20,
//!     can_check: true,
//!     position: Some(5),
//!     players_remaining: 6,
//! };
//!
//! let mut bot = BotDecisionMaker::new();
//! let decision = bot.decide(&DifficultyParams::tag(), &ctx);
//! assert_eq!(decision.action, BotAction::Check);
//! ```

pub mod decision;
pub mod models;

pub use decision::{
    BotAction, BotDecision, BotDecisionConfig, BotDecisionContext, BotDecisionMaker,
};
pub use models::{BotDifficulty, DifficultyParams};
