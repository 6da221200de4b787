//! Bot difficulty presets and play-style parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named play styles. Each maps to a [`DifficultyParams`] preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotDifficulty {
    /// Loose and passive, never bluffs.
    Easy,
    #[default]
    Standard,
    /// Tight-aggressive.
    Tag,
}

impl BotDifficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Standard => "standard",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for BotDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Play-style knobs. Rates are fractions of hands; `vpip` also picks the
/// fold/raise thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    pub vpip: f32,
    pub pfr: f32,
    /// Bets and raises per call.
    pub aggression_factor: f32,
    pub bluffs: bool,
    pub bluff_frequency: f32,
}

impl DifficultyParams {
    pub fn easy() -> Self {
        Self {
            vpip: 0.45,
            pfr: 0.10,
            aggression_factor: 0.5,
            bluffs: false,
            bluff_frequency: 0.0,
        }
    }

    pub fn standard() -> Self {
        Self {
            vpip: 0.30,
            pfr: 0.20,
            aggression_factor: 1.5,
            bluffs: true,
            bluff_frequency: 0.15,
        }
    }

    pub fn tag() -> Self {
        Self {
            vpip: 0.20,
            pfr: 0.18,
            aggression_factor: 2.5,
            bluffs: true,
            bluff_frequency: 0.25,
        }
    }

    pub fn from_difficulty(difficulty: BotDifficulty) -> Self {
        match difficulty {
            BotDifficulty::Easy => Self::easy(),
            BotDifficulty::Standard => Self::standard(),
            BotDifficulty::Tag => Self::tag(),
        }
    }

    /// Override the aggression factor, clamped to `0.0..=4.0`.
    pub fn with_aggression(mut self, aggression_factor: f32) -> Self {
        self.aggression_factor = aggression_factor.clamp(0.0, 4.0);
        self
    }
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self::standard()
    }
}
