//! Deal proposals built from raw tournament snapshots.
//!
//! These tests feed JSON as the backend returns it (loosely typed ids and chip
//! counts, eliminated rows mixed in) through validation and every equity
//! method.

use poker_deal::{
    DealCalculator, EquityMethod, TournamentError, TournamentSnapshot,
    equity::EquityError,
    tournament::{LooseNumber, PrizeStructure, RawParticipantRow, RawPrizeRow},
};

const FINAL_TABLE: &str = r#"{
    "tournament_id": 1001,
    "name": "Sunday Major",
    "participants": [
        {"user_id": 11, "username": "ann", "chip_count": "5000"},
        {"user_id": "12", "username": "bo", "chip_count": 3000},
        {"user_id": 13, "username": "cy", "chip_count": 2000.0},
        {"user_id": 14, "username": "di", "chip_count": 0, "eliminated": true, "finish_position": 4},
        {"user_id": 15, "username": "ed", "finish_position": 5}
    ],
    "payouts": [
        {"position": 2, "amount": "300"},
        {"position": 1, "amount": 500},
        {"position": 3, "amount": 200},
        {"position": 4, "amount": 100},
        {"position": 5, "amount": 50}
    ]
}"#;

fn final_table() -> TournamentSnapshot {
    TournamentSnapshot::from_json(FINAL_TABLE).unwrap()
}

#[test]
fn test_snapshot_keeps_live_players_in_seat_order() {
    let snapshot = final_table();

    assert_eq!(snapshot.name.as_deref(), Some("Sunday Major"));
    assert_eq!(snapshot.eliminated, 2);
    let ids: Vec<&str> = snapshot.live.iter().map(|p| p.user_id.as_str()).collect();
    assert_eq!(ids, vec!["11", "12", "13"]);
    assert_eq!(snapshot.total_chips(), 10_000.0);
    assert_eq!(snapshot.prizes.payouts(), &[500.0, 300.0, 200.0, 100.0, 50.0]);
    assert_eq!(snapshot.remaining_prizes().payouts(), &[500.0, 300.0, 200.0]);
}

#[test]
fn test_approximate_deal() {
    let proposal = DealCalculator::default().propose(&final_table()).unwrap();

    assert_eq!(proposal.tournament_id, 1001);
    assert_eq!(proposal.method, EquityMethod::Approximate);
    assert_eq!(proposal.prize_pool, 1000.0);
    let payouts: Vec<i64> = proposal.lines.iter().map(|l| l.payout).collect();
    assert_eq!(payouts, vec![306, 197, 136]);
    assert_eq!(proposal.rounded_total, 639);
    assert!((proposal.rounding_drift() + 0.5).abs() < 1e-9);
    assert!((proposal.unallocated() - 360.5).abs() < 1e-9);
}

#[test]
fn test_chip_chop_deal_follows_chip_shares() {
    let proposal = DealCalculator::new(EquityMethod::ChipChop)
        .propose(&final_table())
        .unwrap();

    let payouts: Vec<i64> = proposal.lines.iter().map(|l| l.payout).collect();
    assert_eq!(payouts, vec![500, 300, 200]);
    for line in &proposal.lines {
        assert!((line.chip_share * 1000.0 - line.equity).abs() < 0.5 + 1e-9);
    }
}

#[test]
fn test_exact_deal_distributes_whole_pool() {
    let proposal = DealCalculator::new(EquityMethod::Exact)
        .propose(&final_table())
        .unwrap();

    assert!((proposal.raw_total() - 1000.0).abs() < 1e-6);
    assert!(proposal.unallocated().abs() < 1e-6);
    // Chip leader gains less than chip share under ICM, short stack more
    assert!(proposal.lines[0].equity < 500.0);
    assert!(proposal.lines[2].equity > 200.0);
    // Rounding drift is bounded by half a unit per player
    assert!(proposal.rounding_drift().abs() <= 1.5);
}

#[test]
fn test_simulated_deal_near_exact() {
    let snapshot = final_table();
    let exact = DealCalculator::new(EquityMethod::Exact)
        .propose(&snapshot)
        .unwrap();
    let simulated = DealCalculator::new(EquityMethod::Simulated)
        .with_trials(20_000)
        .with_seed(99)
        .propose(&snapshot)
        .unwrap();

    assert_eq!(simulated.method, EquityMethod::Simulated);
    for (s, e) in simulated.lines.iter().zip(&exact.lines) {
        assert!(
            (s.equity - e.equity).abs() < 15.0,
            "{} simulated {} vs exact {}",
            s.user_id,
            s.equity,
            e.equity
        );
    }
}

#[test]
fn test_simulated_deal_rejects_zero_trials() {
    let err = DealCalculator::new(EquityMethod::Simulated)
        .with_trials(0)
        .propose(&final_table())
        .unwrap_err();
    assert!(matches!(err, TournamentError::Equity(EquityError::NoTrials)));
}

#[test]
fn test_exact_deal_rejects_huge_fields() {
    let rows: Vec<RawParticipantRow> = (0..25)
        .map(|i| {
            serde_json::from_value(serde_json::json!({"user_id": i, "chip_count": 1000}))
                .unwrap()
        })
        .collect();
    let prizes = vec![RawPrizeRow {
        position: 1,
        amount: Some(LooseNumber::from(1000.0)),
    }];
    let snapshot = TournamentSnapshot::from_rows(9, rows, prizes).unwrap();

    let err = DealCalculator::new(EquityMethod::Exact)
        .propose(&snapshot)
        .unwrap_err();
    assert!(matches!(
        err,
        TournamentError::Equity(EquityError::TooManyPlayers { players: 25, .. })
    ));

    // The approximation has no such limit
    assert!(DealCalculator::default().propose(&snapshot).is_ok());
}

#[test]
fn test_snapshot_validation_errors() {
    let negative = r#"{"tournament_id": 1, "participants": [{"user_id": 1, "chip_count": -5}], "payouts": [10]}"#;
    assert!(matches!(
        TournamentSnapshot::from_json(negative),
        Err(TournamentError::NegativeStack { .. })
    ));

    let garbage = r#"{"tournament_id": 1, "participants": [{"user_id": 1, "chip_count": "lots"}], "payouts": [10]}"#;
    assert!(matches!(
        TournamentSnapshot::from_json(garbage),
        Err(TournamentError::InvalidRow { .. })
    ));

    let gap = r#"{"tournament_id": 1, "participants": [{"user_id": 1, "chip_count": 5}],
        "payouts": [{"position": 1, "amount": 10}, {"position": 3, "amount": 5}]}"#;
    assert!(matches!(
        TournamentSnapshot::from_json(gap),
        Err(TournamentError::InvalidPayout { position: 2, .. })
    ));

    let nobody = r#"{"tournament_id": 3, "participants": [{"user_id": 1, "finish_position": 1}], "payouts": [10]}"#;
    assert!(matches!(
        TournamentSnapshot::from_json(nobody),
        Err(TournamentError::NoLivePlayers(3))
    ));

    assert!(matches!(
        TournamentSnapshot::from_json("{not json"),
        Err(TournamentError::Serialization(_))
    ));
}

#[test]
fn test_percentage_prize_structure() {
    let prizes = PrizeStructure::from_percentages(10_000.0, &[0.5, 0.3, 0.2]).unwrap();
    assert_eq!(prizes.paid_places(), 3);
    assert!((prizes.total() - 10_000.0).abs() < 1e-6);
    assert!((prizes.payout_for_position(1).unwrap() - 5000.0).abs() < 1e-6);
    assert_eq!(prizes.payout_for_position(0), None);
    assert_eq!(prizes.payout_for_position(4), None);

    assert!(PrizeStructure::from_percentages(100.0, &[0.7, -0.1]).is_err());
}
