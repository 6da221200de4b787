//! Chip-chop: split a prize pool in proportion to chip counts.

use super::{EquityMethod, EquityModel, EquityResult};

/// Split `prize_pool` proportionally to `stacks`, rounding each share to the
/// nearest whole unit.
///
/// Returns all zeros when there are no players or no chips in play. The
/// rounded shares may miss `prize_pool` by at most one unit per player.
pub fn estimate_chip_chop(stacks: &[f64], prize_pool: f64) -> Vec<f64> {
    let total: f64 = stacks.iter().sum();

    if stacks.is_empty() || total == 0.0 {
        return vec![0.0; stacks.len()];
    }

    stacks
        .iter()
        .map(|&stack| (stack / total * prize_pool).round())
        .collect()
}

/// [`estimate_chip_chop`] as an [`EquityModel`]; the pool is the sum of the
/// payouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChipChop;

impl EquityModel for ChipChop {
    fn equities(&self, stacks: &[f64], payouts: &[f64]) -> EquityResult<Vec<f64>> {
        Ok(estimate_chip_chop(stacks, payouts.iter().sum()))
    }

    fn method(&self) -> EquityMethod {
        EquityMethod::ChipChop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportional_split() {
        assert_eq!(
            estimate_chip_chop(&[5000.0, 3000.0, 2000.0], 1000.0),
            vec![500.0, 300.0, 200.0]
        );
    }

    #[test]
    fn test_rounds_each_share() {
        // thirds of 100 -> 33.33 each
        let shares = estimate_chip_chop(&[1.0, 1.0, 1.0], 100.0);
        assert_eq!(shares, vec![33.0, 33.0, 33.0]);

        let shares = estimate_chip_chop(&[1.0, 2.0], 100.0);
        assert_eq!(shares, vec![33.0, 67.0]);
    }

    #[test]
    fn test_zero_total_and_empty() {
        assert_eq!(estimate_chip_chop(&[0.0, 0.0], 500.0), vec![0.0, 0.0]);
        assert!(estimate_chip_chop(&[], 500.0).is_empty());
    }

    #[test]
    fn test_model_uses_payout_sum_as_pool() {
        let shares = ChipChop.equities(&[1.0, 3.0], &[60.0, 40.0]).unwrap();
        assert_eq!(shares, vec![25.0, 75.0]);
    }
}
