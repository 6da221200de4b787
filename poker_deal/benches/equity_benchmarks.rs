use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use poker_deal::{
    DealCalculator, EquityMethod, TournamentSnapshot,
    bot::{BotDecisionConfig, BotDecisionContext, BotDecisionMaker, DifficultyParams},
    cards::{Card, Suit, evaluate},
    equity::{estimate_chip_chop, estimate_icm_equities, exact_icm_equities, simulate_icm_equities},
};
use rand::{SeedableRng, rngs::StdRng};
use std::hint::black_box;

/// Descending stacks and a top-heavy schedule paying half the field
fn field(players: usize) -> (Vec<f64>, Vec<f64>) {
    let stacks = (0..players).map(|i| 10_000.0 - i as f64 * 500.0).collect();
    let paid = players.div_ceil(2);
    let payouts = (0..paid).map(|place| 1000.0 / (place + 1) as f64).collect();
    (stacks, payouts)
}

/// Benchmark the closed-form approximation across field sizes
fn bench_approximate(c: &mut Criterion) {
    let mut group = c.benchmark_group("approximate_icm");
    for players in [3, 9, 18] {
        let (stacks, payouts) = field(players);
        group.bench_with_input(BenchmarkId::from_parameter(players), &players, |b, _| {
            b.iter(|| estimate_icm_equities(black_box(&stacks), black_box(&payouts)));
        });
    }
    group.finish();
}

fn bench_chip_chop(c: &mut Criterion) {
    let (stacks, _) = field(9);
    c.bench_function("chip_chop_9", |b| {
        b.iter(|| estimate_chip_chop(black_box(&stacks), black_box(10_000.0)));
    });
}

/// Exact ICM grows as 2^n, so this shows where the player cap bites
fn bench_exact(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact_icm");
    for players in [3, 6, 9, 12] {
        let (stacks, payouts) = field(players);
        group.bench_with_input(BenchmarkId::from_parameter(players), &players, |b, _| {
            b.iter(|| exact_icm_equities(black_box(&stacks), black_box(&payouts)));
        });
    }
    group.finish();
}

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulated_icm_1000_trials");
    group.sample_size(20);
    for players in [3, 9] {
        let (stacks, payouts) = field(players);
        group.bench_with_input(BenchmarkId::from_parameter(players), &players, |b, _| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| simulate_icm_equities(black_box(&stacks), black_box(&payouts), 1000, &mut rng));
        });
    }
    group.finish();
}

/// Full proposal from a parsed snapshot
fn bench_deal_proposal(c: &mut Criterion) {
    let snapshot = TournamentSnapshot::from_json(
        r#"{"tournament_id": 1, "participants": [
            {"user_id": 1, "chip_count": 5000}, {"user_id": 2, "chip_count": "3000"},
            {"user_id": 3, "chip_count": 2000}, {"user_id": 4, "chip_count": 1500}],
            "payouts": [500, 300, 200, 100]}"#,
    )
    .expect("benchmark snapshot parses");

    for method in [EquityMethod::Approximate, EquityMethod::Exact] {
        let calculator = DealCalculator::new(method);
        c.bench_function(&format!("deal_proposal_{method}"), |b| {
            b.iter(|| calculator.propose(black_box(&snapshot)));
        });
    }
}

/// Benchmark hand evaluation with 7 cards (hole cards + board)
fn bench_hand_eval_7_cards(c: &mut Criterion) {
    let cards = vec![
        Card(14, Suit::Spade),
        Card(13, Suit::Spade),
        Card(12, Suit::Heart),
        Card(11, Suit::Diamond),
        Card(10, Suit::Club),
        Card(5, Suit::Spade),
        Card(2, Suit::Heart),
    ];

    c.bench_function("hand_eval_7_cards", |b| {
        b.iter(|| evaluate(black_box(&cards)));
    });
}

fn bench_bot_decision(c: &mut Criterion) {
    let hole = [Card(14, Suit::Spade), Card(13, Suit::Spade)];
    let board = [Card(12, Suit::Spade), Card(7, Suit::Heart), Card(2, Suit::Club)];
    let params = DifficultyParams::tag();
    let mut bot = BotDecisionMaker::with_rng(BotDecisionConfig::default(), StdRng::seed_from_u64(3));

    c.bench_function("bot_decision_flop", |b| {
        b.iter(|| {
            let ctx = BotDecisionContext {
                hole_cards: &hole,
                board_cards: &board,
                pot_size: 300,
                current_bet: 100,
                bot_chips: 5000,
                big_blind: 50,
                can_check: false,
                position: Some(2),
                players_remaining: 3,
            };
            bot.decide(&params, black_box(&ctx))
        });
    });
}

criterion_group!(
    benches,
    bench_approximate,
    bench_chip_chop,
    bench_exact,
    bench_simulation,
    bench_deal_proposal,
    bench_hand_eval_7_cards,
    bench_bot_decision
);
criterion_main!(benches);
