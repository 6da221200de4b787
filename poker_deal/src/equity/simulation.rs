//! Monte-Carlo tournament simulation.
//!
//! Live players are paired off at random for coin-flip all-ins until one
//! remains. The shorter stack is always the one at risk, so a loser holding
//! the effective stack busts and takes the lowest unawarded place. Averaging
//! the payouts over many runs converges on the ICM values without the
//! factorial blow-up of the exact model.
//!
//! Results vary run to run unless a seed is supplied.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use super::{EquityError, EquityMethod, EquityModel, EquityResult, validate_stacks};

/// Trial count used when a caller does not pick one.
pub const DEFAULT_SIMULATION_TRIALS: usize = 10_000;

/// Estimate equities by simulating `trials` tournaments with `rng`.
///
/// Zero stacks are treated as already busted and receive nothing.
///
/// # Errors
///
/// - [`EquityError::NoTrials`] when `trials` is zero
/// - [`EquityError::InvalidStack`] for a negative or non-finite stack
pub fn simulate_icm_equities<R: Rng + ?Sized>(
    stacks: &[f64],
    payouts: &[f64],
    trials: usize,
    rng: &mut R,
) -> EquityResult<Vec<f64>> {
    if trials == 0 {
        return Err(EquityError::NoTrials);
    }
    validate_stacks(stacks)?;

    let mut winnings = vec![0.0; stacks.len()];
    let live: Vec<usize> = (0..stacks.len()).filter(|&i| stacks[i] > 0.0).collect();
    if live.is_empty() || payouts.is_empty() {
        return Ok(winnings);
    }

    for _ in 0..trials {
        run_tournament(stacks, &live, payouts, rng, &mut winnings);
    }

    let trials = trials as f64;
    Ok(winnings.into_iter().map(|total| total / trials).collect())
}

/// Play one tournament to completion, adding each finisher's payout to
/// `winnings`.
fn run_tournament<R: Rng + ?Sized>(
    stacks: &[f64],
    live: &[usize],
    payouts: &[f64],
    rng: &mut R,
    winnings: &mut [f64],
) {
    let mut remaining = stacks.to_vec();
    let mut players = live.to_vec();
    // Place (0-indexed) the next busted player receives
    let mut next_place = players.len() - 1;

    let mut award = |player: usize, place: usize| {
        if let Some(payout) = payouts.get(place) {
            winnings[player] += payout;
        }
    };

    while players.len() > 1 {
        // Pop the last two after a shuffle for an O(1) random pairing
        players.shuffle(rng);
        let (Some(hero), Some(villain)) = (players.pop(), players.pop()) else {
            break;
        };

        let effective = remaining[hero].min(remaining[villain]);
        let (winner, loser) = if rng.random_bool(0.5) {
            (hero, villain)
        } else {
            (villain, hero)
        };
        remaining[winner] += effective;
        remaining[loser] -= effective;

        players.push(winner);
        if remaining[loser] == 0.0 {
            award(loser, next_place);
            next_place = next_place.saturating_sub(1);
        } else {
            players.push(loser);
        }
    }

    if let Some(&champion) = players.first() {
        award(champion, 0);
    }
}

/// [`simulate_icm_equities`] as an [`EquityModel`].
#[derive(Debug, Clone, Copy)]
pub struct MonteCarlo {
    /// Tournaments to simulate
    pub trials: usize,
    /// Fixed seed for reproducible results
    pub seed: Option<u64>,
}

impl Default for MonteCarlo {
    fn default() -> Self {
        Self {
            trials: DEFAULT_SIMULATION_TRIALS,
            seed: None,
        }
    }
}

impl EquityModel for MonteCarlo {
    fn equities(&self, stacks: &[f64], payouts: &[f64]) -> EquityResult<Vec<f64>> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        simulate_icm_equities(stacks, payouts, self.trials, &mut rng)
    }

    fn method(&self) -> EquityMethod {
        EquityMethod::Simulated
    }
}
