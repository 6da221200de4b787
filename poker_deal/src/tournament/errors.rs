//! Tournament snapshot and deal errors.

use crate::equity::EquityError;
use thiserror::Error;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Row could not be turned into a participant
    #[error("Invalid participant row {user_id}: {reason}")]
    InvalidRow { user_id: String, reason: String },

    /// Live participant with a negative chip count
    #[error("Negative stack for {user_id}: {value}")]
    NegativeStack { user_id: String, value: f64 },

    /// Prize amount missing, negative or not a number
    #[error("Invalid payout at position {position}: {reason}")]
    InvalidPayout { position: usize, reason: String },

    #[error("No live players in tournament {0}")]
    NoLivePlayers(i64),

    #[error("Equity error: {0}")]
    Equity(#[from] EquityError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TournamentError {
    /// Get a client-safe error message
    ///
    /// Parser internals from serde are reduced to a generic message.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Serialization(_) => "Malformed tournament snapshot".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type TournamentResult<T> = Result<T, TournamentError>;
