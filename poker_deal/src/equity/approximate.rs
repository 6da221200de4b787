//! Closed-form ICM approximation.
//!
//! First place is weighted by chip share directly. Every lower paid place is
//! weighted by `(1 - share) * share / (players - 1)`, discounted by
//! [`LOWER_FINISH_DISCOUNT`]. The result does not conserve the prize pool and
//! is not the recursive Malmuth-Harville value (see [`super::harville`]).

use super::{EquityMethod, EquityModel, EquityResult};

/// Empirical discount applied to every finish below first place.
pub const LOWER_FINISH_DISCOUNT: f64 = 0.9;

/// Estimate each player's equity with the closed-form approximation.
///
/// Returns all zeros when there are no players or no chips in play. Inputs
/// are not validated: negative stacks produce meaningless (possibly
/// negative) equities.
///
/// # Examples
///
/// ```
/// use poker_deal::equity::estimate_icm_equities;
///
/// let equities = estimate_icm_equities(&[5000.0, 3000.0, 2000.0], &[500.0, 300.0, 200.0]);
/// assert!((equities[0] - 306.25).abs() < 1e-9);
/// ```
pub fn estimate_icm_equities(stacks: &[f64], payouts: &[f64]) -> Vec<f64> {
    let num_players = stacks.len();
    let total: f64 = stacks.iter().sum();

    if num_players == 0 || total == 0.0 {
        return vec![0.0; num_players];
    }

    let first_prize = payouts.first().copied().unwrap_or(0.0);
    let paid_positions = num_players.min(payouts.len());

    stacks
        .iter()
        .map(|&stack| {
            let stack_percent = stack / total;
            let mut equity = stack_percent * first_prize;

            // Only reached with 2+ players, so the divisor is never zero
            for &payout in payouts.iter().take(paid_positions).skip(1) {
                let finish_probability =
                    (1.0 - stack_percent) * stack_percent / (num_players - 1) as f64;
                equity += finish_probability * payout * LOWER_FINISH_DISCOUNT;
            }

            equity
        })
        .collect()
}

/// [`estimate_icm_equities`] as an [`EquityModel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateIcm;

impl EquityModel for ApproximateIcm {
    fn equities(&self, stacks: &[f64], payouts: &[f64]) -> EquityResult<Vec<f64>> {
        Ok(estimate_icm_equities(stacks, payouts))
    }

    fn method(&self) -> EquityMethod {
        EquityMethod::Approximate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "expected {expected:?}, got {actual:?}");
        }
    }

    #[test]
    fn test_three_way_regression() {
        // first place: 250 / 150 / 100
        // lower places: share*(1-share)/2 * payout * 0.9
        let equities = estimate_icm_equities(&[5000.0, 3000.0, 2000.0], &[500.0, 300.0, 200.0]);
        assert_close(&equities, &[306.25, 197.25, 136.0]);
    }

    #[test]
    fn test_empty_stacks() {
        assert!(estimate_icm_equities(&[], &[100.0]).is_empty());
    }

    #[test]
    fn test_zero_total_returns_zeros() {
        assert_eq!(
            estimate_icm_equities(&[0.0, 0.0, 0.0], &[50.0, 30.0, 20.0]),
            vec![0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_zero_stack_has_zero_equity() {
        let equities = estimate_icm_equities(&[0.0, 4000.0, 6000.0], &[600.0, 400.0]);
        assert_eq!(equities[0], 0.0);
        assert!(equities[1] > 0.0);
    }

    #[test]
    fn test_empty_payouts() {
        assert_eq!(estimate_icm_equities(&[10.0, 20.0], &[]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_single_player_takes_first_prize() {
        assert_close(&estimate_icm_equities(&[1234.0], &[900.0, 100.0]), &[900.0]);
    }

    #[test]
    fn test_more_payouts_than_players_are_ignored() {
        let short = estimate_icm_equities(&[100.0, 300.0], &[70.0, 30.0]);
        let long = estimate_icm_equities(&[100.0, 300.0], &[70.0, 30.0, 999.0, 999.0]);
        assert_close(&short, &long);
    }

    #[test]
    fn test_heads_up_values() {
        // share 0.25 -> 0.25*70 + 0.75*0.25*30*0.9
        let equities = estimate_icm_equities(&[100.0, 300.0], &[70.0, 30.0]);
        assert_close(&equities, &[17.5 + 5.0625, 52.5 + 5.0625]);
    }

    #[test]
    fn test_model_wraps_function() {
        let stacks = [10.0, 20.0, 30.0];
        let payouts = [60.0, 30.0, 10.0];
        assert_eq!(
            ApproximateIcm.equities(&stacks, &payouts).unwrap(),
            estimate_icm_equities(&stacks, &payouts)
        );
    }
}
