//! Equity models for tournament deal-making.
//!
//! Every model converts chip stacks and a payout schedule (index 0 = first
//! place) into an equity vector of the same length and order as the stacks.
//!
//! - [`approximate`]: closed-form ICM approximation used by the deal panel
//! - [`chop`]: straight chip-proportional split
//! - [`harville`]: exact Malmuth-Harville ICM
//! - [`simulation`]: Monte-Carlo tournament simulation
//!
//! The models share the [`EquityModel`] trait and are dispatched through the
//! [`Estimator`] enum with `enum_dispatch`.
//!
//! ## Example
//!
//! ```
//! use poker_deal::equity::{estimate_chip_chop, estimate_icm_equities};
//!
//! let stacks = [5000.0, 3000.0, 2000.0];
//! let icm = estimate_icm_equities(&stacks, &[500.0, 300.0, 200.0]);
//! assert_eq!(icm.len(), 3);
//!
//! let chop = estimate_chip_chop(&stacks, 1000.0);
//! assert_eq!(chop, vec![500.0, 300.0, 200.0]);
//! ```

pub mod approximate;
pub mod chop;
pub mod harville;
pub mod simulation;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub use approximate::{ApproximateIcm, LOWER_FINISH_DISCOUNT, estimate_icm_equities};
pub use chop::{ChipChop, estimate_chip_chop};
pub use harville::{MAX_EXACT_PLAYERS, MalmuthHarville, exact_icm_equities};
pub use simulation::{DEFAULT_SIMULATION_TRIALS, MonteCarlo, simulate_icm_equities};

/// Equity model errors
#[derive(Debug, Error, PartialEq)]
pub enum EquityError {
    #[error("Too many players for exact ICM: {players} (max {max})")]
    TooManyPlayers { players: usize, max: usize },

    #[error("Invalid stack at seat {index}: {value}")]
    InvalidStack { index: usize, value: f64 },

    #[error("Simulation needs at least one trial")]
    NoTrials,

    #[error("Unknown equity method: {0}")]
    UnknownMethod(String),
}

pub type EquityResult<T> = Result<T, EquityError>;

/// Common interface of every equity model.
#[enum_dispatch]
pub trait EquityModel {
    /// Compute one equity per stack, in stack order.
    fn equities(&self, stacks: &[f64], payouts: &[f64]) -> EquityResult<Vec<f64>>;

    /// Method tag for reporting.
    fn method(&self) -> EquityMethod;
}

/// A concrete equity model.
#[enum_dispatch(EquityModel)]
#[derive(Debug, Clone)]
pub enum Estimator {
    ApproximateIcm,
    ChipChop,
    MalmuthHarville,
    MonteCarlo,
}

/// Equity method selector as it appears in requests and configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquityMethod {
    #[default]
    Approximate,
    ChipChop,
    Exact,
    Simulated,
}

impl EquityMethod {
    /// Build the estimator for this method.
    ///
    /// `trials` and `seed` only matter for [`EquityMethod::Simulated`].
    pub fn estimator(self, trials: usize, seed: Option<u64>) -> Estimator {
        match self {
            EquityMethod::Approximate => ApproximateIcm.into(),
            EquityMethod::ChipChop => ChipChop.into(),
            EquityMethod::Exact => MalmuthHarville.into(),
            EquityMethod::Simulated => MonteCarlo { trials, seed }.into(),
        }
    }
}

impl fmt::Display for EquityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquityMethod::Approximate => write!(f, "approximate"),
            EquityMethod::ChipChop => write!(f, "chip_chop"),
            EquityMethod::Exact => write!(f, "exact"),
            EquityMethod::Simulated => write!(f, "simulated"),
        }
    }
}

impl FromStr for EquityMethod {
    type Err = EquityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "approximate" | "icm" => Ok(EquityMethod::Approximate),
            "chip_chop" | "chop" => Ok(EquityMethod::ChipChop),
            "exact" | "harville" | "malmuth_harville" => Ok(EquityMethod::Exact),
            "simulated" | "monte_carlo" => Ok(EquityMethod::Simulated),
            _ => Err(EquityError::UnknownMethod(s.to_string())),
        }
    }
}

/// Reject negative or non-finite stacks.
pub(crate) fn validate_stacks(stacks: &[f64]) -> EquityResult<()> {
    match stacks
        .iter()
        .enumerate()
        .find(|(_, stack)| !stack.is_finite() || **stack < 0.0)
    {
        Some((index, &value)) => Err(EquityError::InvalidStack { index, value }),
        None => Ok(()),
    }
}
