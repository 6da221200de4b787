//! Tournament snapshots and deal proposals.
//!
//! This module provides:
//! - Boundary types that validate loosely typed backend rows once
//! - Prize structure helpers
//! - The deal calculator that turns a snapshot into a per-player proposal
//!
//! ## Example
//!
//! ```
//! use poker_deal::equity::EquityMethod;
//! use poker_deal::tournament::{DealCalculator, TournamentSnapshot};
//!
//! let snapshot = TournamentSnapshot::from_json(r#"{
//!     "tournament_id": 42,
//!     "participants": [
//!         {"user_id": 1, "username": "ann", "chip_count": 5000},
//!         {"user_id": 2, "username": "bo", "chip_count": 3000},
//!         {"user_id": 3, "username": "cy", "chip_count": 2000}
//!     ],
//!     "payouts": [500, 300, 200]
//! }"#)?;
//!
//! let proposal = DealCalculator::new(EquityMethod::Approximate).propose(&snapshot)?;
//! assert_eq!(proposal.lines[0].payout, 306);
//! # Ok::<(), poker_deal::tournament::TournamentError>(())
//! ```

pub mod deal;
pub mod errors;
pub mod models;

pub use deal::{DealCalculator, DealLine, DealProposal};
pub use errors::{TournamentError, TournamentResult};
pub use models::{
    LooseId, LooseNumber, Participant, PrizeStructure, RawParticipantRow, RawPrizeRow,
    TournamentId, TournamentSnapshot,
};
