//! Deal calculator: snapshot in, per-player proposal out.

use super::errors::TournamentResult;
use super::models::{TournamentId, TournamentSnapshot};
use crate::equity::{DEFAULT_SIMULATION_TRIALS, EquityMethod, EquityModel};
use serde::{Deserialize, Serialize};

/// One player's line in a deal proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealLine {
    pub user_id: String,
    pub username: String,
    pub stack: f64,
    /// Fraction of the chips in play
    pub chip_share: f64,
    /// Unrounded model output
    pub equity: f64,
    /// Equity rounded to whole currency units
    pub payout: i64,
}

/// A proposed deal for the live players of a tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealProposal {
    pub tournament_id: TournamentId,
    pub method: EquityMethod,
    /// Sum of the prizes still to be awarded
    pub prize_pool: f64,
    pub lines: Vec<DealLine>,
    /// Sum of the rounded payouts
    pub rounded_total: i64,
}

impl DealProposal {
    /// Sum of the raw equities
    pub fn raw_total(&self) -> f64 {
        self.lines.iter().map(|line| line.equity).sum()
    }

    /// Rounded sum minus raw sum
    pub fn rounding_drift(&self) -> f64 {
        self.rounded_total as f64 - self.raw_total()
    }

    /// Prize money the method leaves undistributed (approximate ICM does not
    /// conserve the pool)
    pub fn unallocated(&self) -> f64 {
        self.prize_pool - self.raw_total()
    }
}

/// Computes deal proposals with a chosen equity method
#[derive(Debug, Clone)]
pub struct DealCalculator {
    method: EquityMethod,
    trials: usize,
    seed: Option<u64>,
}

impl DealCalculator {
    pub fn new(method: EquityMethod) -> Self {
        Self {
            method,
            trials: DEFAULT_SIMULATION_TRIALS,
            seed: None,
        }
    }

    /// Number of simulated tournaments for [`EquityMethod::Simulated`]
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Fix the simulation seed for reproducible proposals
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn method(&self) -> EquityMethod {
        self.method
    }

    /// Build the proposal for the live players of `snapshot`.
    ///
    /// Rounding happens only here, after the model has produced raw
    /// equities.
    pub fn propose(&self, snapshot: &TournamentSnapshot) -> TournamentResult<DealProposal> {
        let stacks = snapshot.stacks();
        let prizes = snapshot.remaining_prizes();
        let total_chips = snapshot.total_chips();

        let estimator = self.method.estimator(self.trials, self.seed);
        let equities = estimator.equities(&stacks, prizes.payouts())?;

        let lines: Vec<DealLine> = snapshot
            .live
            .iter()
            .zip(equities)
            .map(|(participant, equity)| DealLine {
                user_id: participant.user_id.clone(),
                username: participant.username.clone(),
                stack: participant.stack,
                chip_share: if total_chips > 0.0 {
                    participant.stack / total_chips
                } else {
                    0.0
                },
                equity,
                payout: equity.round() as i64,
            })
            .collect();

        let rounded_total = lines.iter().map(|line| line.payout).sum();
        let proposal = DealProposal {
            tournament_id: snapshot.tournament_id,
            method: self.method,
            prize_pool: prizes.total(),
            lines,
            rounded_total,
        };

        log::debug!(
            "Deal for tournament {} ({}): pool {:.2}, rounded {}, drift {:.4}",
            proposal.tournament_id,
            proposal.method,
            proposal.prize_pool,
            proposal.rounded_total,
            proposal.rounding_drift()
        );

        Ok(proposal)
    }
}

impl Default for DealCalculator {
    fn default() -> Self {
        Self::new(EquityMethod::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::{LooseId, RawParticipantRow, RawPrizeRow};

    fn snapshot(stacks: &[f64], payouts: &[f64]) -> TournamentSnapshot {
        let rows = stacks
            .iter()
            .enumerate()
            .map(|(i, &stack)| RawParticipantRow {
                user_id: LooseId::Int(i as i64 + 1),
                username: Some(format!("p{}", i + 1)),
                chip_count: Some(stack.into()),
                finish_position: None,
                eliminated: None,
            })
            .collect();
        let prizes = payouts
            .iter()
            .enumerate()
            .map(|(i, &amount)| RawPrizeRow {
                position: i + 1,
                amount: Some(amount.into()),
            })
            .collect();
        TournamentSnapshot::from_rows(1, rows, prizes).unwrap()
    }

    #[test]
    fn test_approximate_proposal_matches_worked_example() {
        let snapshot = snapshot(&[5000.0, 3000.0, 2000.0], &[500.0, 300.0, 200.0]);
        let proposal = DealCalculator::default().propose(&snapshot).unwrap();

        let raw: Vec<f64> = proposal.lines.iter().map(|l| l.equity).collect();
        assert!((raw[0] - 306.25).abs() < 1e-9);
        assert!((raw[1] - 197.25).abs() < 1e-9);
        assert!((raw[2] - 136.0).abs() < 1e-9);

        let payouts: Vec<i64> = proposal.lines.iter().map(|l| l.payout).collect();
        assert_eq!(payouts, vec![306, 197, 136]);
        assert_eq!(proposal.rounded_total, 639);
        assert!((proposal.rounding_drift() - (-0.5)).abs() < 1e-9);
        assert_eq!(proposal.prize_pool, 1000.0);
        assert!(proposal.unallocated() > 0.0);
    }

    #[test]
    fn test_chip_share() {
        let snapshot = snapshot(&[750.0, 250.0], &[100.0]);
        let proposal = DealCalculator::new(EquityMethod::ChipChop)
            .propose(&snapshot)
            .unwrap();
        assert_eq!(proposal.lines[0].chip_share, 0.75);
        assert_eq!(proposal.lines[1].chip_share, 0.25);
        assert_eq!(proposal.lines[0].payout, 75);
        assert_eq!(proposal.rounding_drift(), 0.0);
    }

    #[test]
    fn test_exact_proposal_conserves_pool() {
        let snapshot = snapshot(&[4000.0, 3500.0, 1500.0, 1000.0], &[500.0, 300.0, 200.0]);
        let proposal = DealCalculator::new(EquityMethod::Exact)
            .propose(&snapshot)
            .unwrap();
        assert!((proposal.raw_total() - 1000.0).abs() < 1e-6);
        assert!(proposal.unallocated().abs() < 1e-6);
    }

    #[test]
    fn test_prizes_beyond_live_players_are_ignored() {
        // Two players left, third place already paid out
        let snapshot = snapshot(&[6000.0, 4000.0], &[500.0, 300.0, 200.0]);
        let proposal = DealCalculator::new(EquityMethod::Exact)
            .propose(&snapshot)
            .unwrap();
        assert_eq!(proposal.prize_pool, 800.0);
        assert!((proposal.raw_total() - 800.0).abs() < 1e-6);
    }

    #[test]
    fn test_seeded_simulation_is_reproducible() {
        let snapshot = snapshot(&[5000.0, 3000.0, 2000.0], &[500.0, 300.0, 200.0]);
        let calculator = DealCalculator::new(EquityMethod::Simulated)
            .with_trials(2_000)
            .with_seed(42);
        let first = calculator.propose(&snapshot).unwrap();
        let second = calculator.propose(&snapshot).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.method, EquityMethod::Simulated);
    }
}
