//! Exact Malmuth-Harville ICM.
//!
//! Each place goes to a live player with probability equal to that player's
//! share of the chips still unplaced. The probabilities of every ordered
//! prefix of finishers are accumulated over bitmasks of already-placed
//! players, so the cost is `O(2^n * n)` and the player count is capped.

use super::{EquityError, EquityMethod, EquityModel, EquityResult, validate_stacks};

/// Largest field the exact model accepts.
pub const MAX_EXACT_PLAYERS: usize = 20;

/// Compute exact ICM equities.
///
/// Zero stacks never finish in a paid place. The equities of the live players
/// sum to the first `min(live players, payouts)` payouts.
///
/// # Errors
///
/// - [`EquityError::InvalidStack`] for a negative or non-finite stack
/// - [`EquityError::TooManyPlayers`] above [`MAX_EXACT_PLAYERS`]
pub fn exact_icm_equities(stacks: &[f64], payouts: &[f64]) -> EquityResult<Vec<f64>> {
    validate_stacks(stacks)?;

    if stacks.len() > MAX_EXACT_PLAYERS {
        return Err(EquityError::TooManyPlayers {
            players: stacks.len(),
            max: MAX_EXACT_PLAYERS,
        });
    }

    let mut equities = vec![0.0; stacks.len()];

    let live: Vec<usize> = (0..stacks.len()).filter(|&i| stacks[i] > 0.0).collect();
    let places = live.len().min(payouts.len());
    if places == 0 {
        return Ok(equities);
    }

    // reach[mask] = probability that exactly the players in `mask` took the
    // first popcount(mask) places
    let mut reach = vec![0.0_f64; 1 << live.len()];
    reach[0] = 1.0;

    for mask in 0..reach.len() {
        let probability = reach[mask];
        let place = mask.count_ones() as usize;
        if probability == 0.0 || place >= places {
            continue;
        }

        let remaining: f64 = live
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << *bit) == 0)
            .map(|(_, &player)| stacks[player])
            .sum();

        for (bit, &player) in live.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                continue;
            }
            let takes_place = probability * stacks[player] / remaining;
            equities[player] += takes_place * payouts[place];
            reach[mask | (1 << bit)] += takes_place;
        }
    }

    Ok(equities)
}

/// [`exact_icm_equities`] as an [`EquityModel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MalmuthHarville;

impl EquityModel for MalmuthHarville {
    fn equities(&self, stacks: &[f64], payouts: &[f64]) -> EquityResult<Vec<f64>> {
        exact_icm_equities(stacks, payouts)
    }

    fn method(&self) -> EquityMethod {
        EquityMethod::Exact
    }
}
