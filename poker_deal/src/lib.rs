//! # Poker Deal
//!
//! Tournament deal-making and admin tooling for an online poker platform.
//!
//! Given the chip stacks of the players left in a tournament and the prizes
//! still to be awarded, the equity models estimate what each stack is worth
//! so the players can agree on a deal. Around that sit the boundary types
//! that validate backend rows, a bot decision heuristic and the moderation
//! store for bans and manual wallet adjustments.
//!
//! ## Core Modules
//!
//! - [`equity`]: approximate ICM, chip-chop, exact Malmuth-Harville and
//!   Monte-Carlo equity models
//! - [`tournament`]: validated snapshots and the deal calculator
//! - [`cards`]: card model and hand evaluation
//! - [`bot`]: bot decision heuristic with difficulty presets
//! - [`moderation`]: ban list and wallet adjustment log
//! - [`db`]: PostgreSQL connection pool
//!
//! ## Example
//!
//! ```
//! use poker_deal::equity::{EquityMethod, EquityModel};
//!
//! let model = EquityMethod::Exact.estimator(0, None);
//! let equities = model.equities(&[6000.0, 4000.0], &[700.0, 300.0]).unwrap();
//! assert!((equities.iter().sum::<f64>() - 1000.0).abs() < 1e-9);
//! ```

/// Bot decision heuristic.
pub mod bot;

/// Card model and hand evaluation.
pub mod cards;

/// Database connection pooling.
pub mod db;

/// Equity models.
pub mod equity;

/// Ban list and wallet adjustment log.
pub mod moderation;

/// Tournament snapshots and deal proposals.
pub mod tournament;

pub use equity::{EquityError, EquityMethod, EquityModel, EquityResult, Estimator};
pub use tournament::{DealCalculator, DealProposal, TournamentError, TournamentSnapshot};
