/// Property-based tests for the equity models using proptest
///
/// These tests check the behavior every model promises across randomly
/// generated stacks and payout schedules.
use poker_deal::equity::{
    EquityMethod, EquityModel, estimate_chip_chop, estimate_icm_equities, exact_icm_equities,
    simulate_icm_equities,
};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

// Stacks with at least one chip in play
fn stacks_strategy(max_players: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..1_000_000.0, 1..=max_players)
        .prop_filter("Some chips must be in play", |stacks| {
            stacks.iter().sum::<f64>() > 0.0
        })
}

fn payouts_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..10_000.0, 0..=6)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1.0 + a.abs().max(b.abs()))
}

/// Sum of the payouts the live players can win
fn awardable(stacks: &[f64], payouts: &[f64]) -> f64 {
    let live = stacks.iter().filter(|&&s| s > 0.0).count();
    payouts.iter().take(live).sum()
}

proptest! {
    #[test]
    fn test_zero_total_gives_zero_equity(
        players in 0usize..8,
        payouts in payouts_strategy(),
        pool in 0.0f64..10_000.0,
    ) {
        let stacks = vec![0.0; players];
        prop_assert_eq!(estimate_icm_equities(&stacks, &payouts), vec![0.0; players]);
        prop_assert_eq!(estimate_chip_chop(&stacks, pool), vec![0.0; players]);
        prop_assert_eq!(exact_icm_equities(&stacks, &payouts).unwrap(), vec![0.0; players]);
    }

    #[test]
    fn test_zero_stack_gets_nothing(
        stacks in stacks_strategy(7),
        payouts in payouts_strategy(),
        slot in any::<prop::sample::Index>(),
    ) {
        let mut stacks = stacks;
        let i = slot.index(stacks.len());
        stacks[i] = 0.0;
        prop_assume!(stacks.iter().sum::<f64>() > 0.0);

        prop_assert_eq!(estimate_icm_equities(&stacks, &payouts)[i], 0.0);
        prop_assert_eq!(estimate_chip_chop(&stacks, payouts.iter().sum())[i], 0.0);
        prop_assert_eq!(exact_icm_equities(&stacks, &payouts).unwrap()[i], 0.0);
    }

    #[test]
    fn test_chip_chop_is_proportional(
        stacks in stacks_strategy(9),
        pool in 0.0f64..100_000.0,
    ) {
        let total: f64 = stacks.iter().sum();
        let shares = estimate_chip_chop(&stacks, pool);

        for (stack, share) in stacks.iter().zip(&shares) {
            prop_assert!((share - stack / total * pool).abs() <= 0.5 + 1e-9);
        }

        // Each share is off by at most half a unit
        let sum: f64 = shares.iter().sum();
        prop_assert!((sum - pool).abs() <= stacks.len() as f64);
    }

    #[test]
    fn test_approximate_is_monotone_in_stack(
        stacks in stacks_strategy(8),
        payouts in payouts_strategy(),
    ) {
        let equities = estimate_icm_equities(&stacks, &payouts);
        for i in 0..stacks.len() {
            for j in 0..stacks.len() {
                if stacks[i] >= stacks[j] {
                    prop_assert!(
                        equities[i] >= equities[j] - 1e-9,
                        "stack {} has equity {} below stack {} with {}",
                        stacks[i], equities[i], stacks[j], equities[j]
                    );
                }
            }
        }
    }

    #[test]
    fn test_single_payout_reduces_to_chip_chop(
        stacks in stacks_strategy(8),
        prize in 0.0f64..10_000.0,
    ) {
        let icm = estimate_icm_equities(&stacks, &[prize]);
        let chop = estimate_chip_chop(&stacks, prize);
        for (a, b) in icm.iter().zip(&chop) {
            prop_assert!((a - b).abs() <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn test_approximate_never_exceeds_pool(
        stacks in stacks_strategy(8),
        payouts in payouts_strategy(),
    ) {
        let sum: f64 = estimate_icm_equities(&stacks, &payouts).iter().sum();
        let pool: f64 = payouts.iter().sum();
        prop_assert!(sum <= pool + 1e-6);
    }

    #[test]
    fn test_exact_conserves_awardable_prizes(
        stacks in stacks_strategy(8),
        payouts in payouts_strategy(),
    ) {
        let equities = exact_icm_equities(&stacks, &payouts).unwrap();
        let sum: f64 = equities.iter().sum();
        prop_assert!(close(sum, awardable(&stacks, &payouts)));
        prop_assert!(equities.iter().all(|&e| e >= 0.0));
    }

    #[test]
    fn test_simulation_conserves_awardable_prizes(
        stacks in stacks_strategy(5),
        payouts in payouts_strategy(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let equities = simulate_icm_equities(&stacks, &payouts, 25, &mut rng).unwrap();
        let sum: f64 = equities.iter().sum();
        prop_assert!(close(sum, awardable(&stacks, &payouts)));
    }

    #[test]
    fn test_models_agree_with_free_functions(
        stacks in stacks_strategy(6),
        payouts in payouts_strategy(),
    ) {
        let approximate = EquityMethod::Approximate.estimator(1, None);
        prop_assert_eq!(
            approximate.equities(&stacks, &payouts).unwrap(),
            estimate_icm_equities(&stacks, &payouts)
        );

        let exact = EquityMethod::Exact.estimator(1, None);
        prop_assert_eq!(
            exact.equities(&stacks, &payouts).unwrap(),
            exact_icm_equities(&stacks, &payouts).unwrap()
        );
    }
}

#[test]
fn test_worked_example() {
    let equities = estimate_icm_equities(&[5000.0, 3000.0, 2000.0], &[500.0, 300.0, 200.0]);
    let expected = [306.25, 197.25, 136.0];
    for (a, e) in equities.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9);
    }
}

#[test]
fn test_simulation_tracks_exact_heads_up() {
    let stacks = [3000.0, 1000.0];
    let payouts = [700.0, 300.0];
    let exact = exact_icm_equities(&stacks, &payouts).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let simulated = simulate_icm_equities(&stacks, &payouts, 40_000, &mut rng).unwrap();

    // Heads-up chip EV is exact: 3:1 stacks win 75% of the time
    assert!((exact[0] - 600.0).abs() < 1e-9);
    assert!((simulated[0] - exact[0]).abs() < 10.0);
}
