//! Tournament boundary types.
//!
//! Backend rows arrive loosely typed: chip counts may be numbers, numeric
//! strings or missing, ids may be integers or strings. They are parsed and
//! validated once here, so the equity code only ever sees clean `f64` stacks.

use super::errors::{TournamentError, TournamentResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tournament ID type
pub type TournamentId = i64;

/// A number that may arrive as JSON number or numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// Numeric value, `None` when the text does not parse
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Number(n) => Some(*n),
            LooseNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<f64> for LooseNumber {
    fn from(value: f64) -> Self {
        LooseNumber::Number(value)
    }
}

/// An identifier that may arrive as integer or string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Int(i64),
    Text(String),
}

impl fmt::Display for LooseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LooseId::Int(id) => write!(f, "{id}"),
            LooseId::Text(id) => write!(f, "{id}"),
        }
    }
}

/// Prize structure for the remaining places
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrizeStructure {
    /// Payouts by position (1st, 2nd, 3rd, etc.)
    payouts: Vec<f64>,
}

impl PrizeStructure {
    /// Create a prize structure from ordered payouts
    pub fn new(payouts: Vec<f64>) -> TournamentResult<Self> {
        let prizes = Self { payouts };
        prizes.validate()?;
        Ok(prizes)
    }

    /// Split `total_pool` by percentages given as fractions (0.5 = 50%)
    pub fn from_percentages(total_pool: f64, percentages: &[f64]) -> TournamentResult<Self> {
        Self::new(percentages.iter().map(|pct| total_pool * pct).collect())
    }

    /// Check every payout is finite and non-negative.
    ///
    /// A schedule that increases with position is accepted but logged.
    pub fn validate(&self) -> TournamentResult<()> {
        for (index, &amount) in self.payouts.iter().enumerate() {
            if !amount.is_finite() {
                return Err(TournamentError::InvalidPayout {
                    position: index + 1,
                    reason: "not a finite number".to_string(),
                });
            }
            if amount < 0.0 {
                return Err(TournamentError::InvalidPayout {
                    position: index + 1,
                    reason: format!("negative amount {amount}"),
                });
            }
        }

        if self.payouts.windows(2).any(|pair| pair[1] > pair[0]) {
            log::warn!("Prize structure pays a lower place more than a higher one: {:?}", self.payouts);
        }
        Ok(())
    }

    pub fn payouts(&self) -> &[f64] {
        &self.payouts
    }

    /// Sum of every payout
    pub fn total(&self) -> f64 {
        self.payouts.iter().sum()
    }

    /// Number of paid places
    pub fn paid_places(&self) -> usize {
        self.payouts.len()
    }

    /// Get payout for a specific position (1-indexed)
    pub fn payout_for_position(&self, position: usize) -> Option<f64> {
        if position == 0 {
            None
        } else {
            self.payouts.get(position - 1).copied()
        }
    }

    /// The places still to be awarded when `live_players` remain
    pub fn remaining(&self, live_players: usize) -> PrizeStructure {
        Self {
            payouts: self.payouts.iter().take(live_players).copied().collect(),
        }
    }
}

/// Participant row as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawParticipantRow {
    pub user_id: LooseId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub chip_count: Option<LooseNumber>,
    #[serde(default)]
    pub finish_position: Option<u32>,
    #[serde(default)]
    pub eliminated: Option<bool>,
}

/// Prize row as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrizeRow {
    /// 1-indexed finishing position
    pub position: usize,
    pub amount: Option<LooseNumber>,
}

/// Validated tournament participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: String,
    pub username: String,
    /// Chip count (0 for eliminated players)
    pub stack: f64,
    /// Finishing position (None if still in tournament)
    pub finish_position: Option<u32>,
}

impl Participant {
    /// Still competing for the remaining prizes
    pub fn is_live(&self) -> bool {
        self.finish_position.is_none()
    }
}

impl TryFrom<RawParticipantRow> for Participant {
    type Error = TournamentError;

    fn try_from(row: RawParticipantRow) -> Result<Self, Self::Error> {
        let user_id = row.user_id.to_string();
        let username = row.username.unwrap_or_else(|| user_id.clone());

        let eliminated = row.eliminated.unwrap_or(false) || row.finish_position.is_some();
        if eliminated {
            return Ok(Participant {
                user_id,
                username,
                stack: 0.0,
                // Eliminated without a recorded place still counts as out
                finish_position: Some(row.finish_position.unwrap_or(0)),
            });
        }

        let Some(raw_chips) = row.chip_count else {
            return Err(TournamentError::InvalidRow {
                user_id,
                reason: "missing chip count".to_string(),
            });
        };
        let stack = match raw_chips.to_f64() {
            Some(value) if value.is_finite() => value,
            _ => {
                return Err(TournamentError::InvalidRow {
                    user_id,
                    reason: format!("chip count {raw_chips:?} is not a number"),
                });
            }
        };
        if stack < 0.0 {
            return Err(TournamentError::NegativeStack {
                user_id,
                value: stack,
            });
        }

        Ok(Participant {
            user_id,
            username,
            stack,
            finish_position: None,
        })
    }
}

/// Snapshot document accepted by [`TournamentSnapshot::from_json`]
#[derive(Debug, Clone, Deserialize)]
struct RawSnapshot {
    tournament_id: TournamentId,
    #[serde(default)]
    name: Option<String>,
    participants: Vec<RawParticipantRow>,
    #[serde(alias = "prizes")]
    payouts: Vec<RawPayout>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawPayout {
    Row(RawPrizeRow),
    Amount(LooseNumber),
}

/// Validated state of a tournament at the moment a deal is considered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub tournament_id: TournamentId,
    pub name: Option<String>,
    /// Live players in seat order
    pub live: Vec<Participant>,
    /// Number of players already eliminated
    pub eliminated: usize,
    /// Full prize structure, 1st place first
    pub prizes: PrizeStructure,
}

impl TournamentSnapshot {
    /// Parse and validate a snapshot document.
    ///
    /// Payouts may be a list of amounts in place order or a list of
    /// `{position, amount}` rows.
    ///
    /// ```
    /// use poker_deal::tournament::TournamentSnapshot;
    ///
    /// let snapshot = TournamentSnapshot::from_json(r#"{
    ///     "tournament_id": 7,
    ///     "participants": [
    ///         {"user_id": 1, "username": "ann", "chip_count": "5000"},
    ///         {"user_id": 2, "username": "bo", "chip_count": 3000},
    ///         {"user_id": 3, "username": "cy", "chip_count": null, "eliminated": true}
    ///     ],
    ///     "payouts": [500, 300, 200]
    /// }"#).unwrap();
    ///
    /// assert_eq!(snapshot.stacks(), vec![5000.0, 3000.0]);
    /// assert_eq!(snapshot.remaining_prizes().payouts(), &[500.0, 300.0]);
    /// ```
    pub fn from_json(json: &str) -> TournamentResult<Self> {
        Self::from_raw(serde_json::from_str(json)?)
    }

    /// Same as [`TournamentSnapshot::from_json`] for an already parsed document
    pub fn from_value(value: serde_json::Value) -> TournamentResult<Self> {
        Self::from_raw(serde_json::from_value(value)?)
    }

    fn from_raw(raw: RawSnapshot) -> TournamentResult<Self> {
        let mut prize_rows = Vec::with_capacity(raw.payouts.len());
        for (index, payout) in raw.payouts.into_iter().enumerate() {
            prize_rows.push(match payout {
                RawPayout::Row(row) => row,
                RawPayout::Amount(amount) => RawPrizeRow {
                    position: index + 1,
                    amount: Some(amount),
                },
            });
        }

        let mut snapshot = Self::from_rows(raw.tournament_id, raw.participants, prize_rows)?;
        snapshot.name = raw.name;
        Ok(snapshot)
    }

    /// Build a snapshot from participant and prize rows.
    ///
    /// Prize rows are ordered by position; gaps in the positions are errors.
    pub fn from_rows(
        tournament_id: TournamentId,
        rows: Vec<RawParticipantRow>,
        mut prize_rows: Vec<RawPrizeRow>,
    ) -> TournamentResult<Self> {
        let mut live = Vec::new();
        let mut eliminated = 0;
        for row in rows {
            let participant = Participant::try_from(row)?;
            if participant.is_live() {
                live.push(participant);
            } else {
                eliminated += 1;
            }
        }

        if live.is_empty() {
            return Err(TournamentError::NoLivePlayers(tournament_id));
        }

        prize_rows.sort_by_key(|row| row.position);
        let mut payouts = Vec::with_capacity(prize_rows.len());
        for (index, row) in prize_rows.iter().enumerate() {
            if row.position != index + 1 {
                return Err(TournamentError::InvalidPayout {
                    position: index + 1,
                    reason: format!("expected position {} but found {}", index + 1, row.position),
                });
            }
            let amount = row
                .amount
                .as_ref()
                .and_then(LooseNumber::to_f64)
                .ok_or_else(|| TournamentError::InvalidPayout {
                    position: row.position,
                    reason: "missing or non-numeric amount".to_string(),
                })?;
            payouts.push(amount);
        }
        let prizes = PrizeStructure::new(payouts)?;

        log::debug!(
            "Tournament {} snapshot: {} live, {} eliminated, {} paid places",
            tournament_id,
            live.len(),
            eliminated,
            prizes.paid_places()
        );

        Ok(Self {
            tournament_id,
            name: None,
            live,
            eliminated,
            prizes,
        })
    }

    /// Live stacks in seat order
    pub fn stacks(&self) -> Vec<f64> {
        self.live.iter().map(|p| p.stack).collect()
    }

    /// Total chips in play
    pub fn total_chips(&self) -> f64 {
        self.live.iter().map(|p| p.stack).sum()
    }

    /// Places still to be paid among the live players
    pub fn remaining_prizes(&self) -> PrizeStructure {
        self.prizes.remaining(self.live.len())
    }
}
