//! Cyclic payoff model: option `k` beats `k + 1` and loses to `k - 1`
//! (mod `num_options`).

use crate::config::{GlobalCostMode, SimConfig};
use crate::genotype::Allele;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Tie,
    /// Neither neighbour on the ring; only possible with more than 3 options.
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PayoffModel {
    pub num_options: usize,
    pub win_magnitude: f64,
    pub tie_cost: f64,
    pub global_cost: f64,
    pub global_cost_mode: GlobalCostMode,
}

impl PayoffModel {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            num_options: config.num_options,
            win_magnitude: config.win_magnitude,
            tie_cost: config.tie_cost,
            global_cost: config.global_cost,
            global_cost_mode: config.global_cost_mode,
        }
    }

    /// Classic rock/paper/scissors with the given win magnitude and no costs.
    pub fn rock_paper_scissors(win_magnitude: f64) -> Self {
        Self {
            num_options: 3,
            win_magnitude,
            tie_cost: 0.0,
            global_cost: 0.0,
            global_cost_mode: GlobalCostMode::Both,
        }
    }

    pub fn outcome(&self, own: Allele, other: Allele) -> Outcome {
        let n = self.num_options;
        let d = (other as usize + n - own as usize) % n;
        if d == 0 {
            Outcome::Tie
        } else if d == 1 {
            Outcome::Win
        } else if d == n - 1 {
            Outcome::Loss
        } else {
            Outcome::Neutral
        }
    }

    /// Matrix entry before any global cost.
    pub fn raw_reward(&self, own: Allele, other: Allele) -> f64 {
        match self.outcome(own, other) {
            Outcome::Win => 1.0 + self.win_magnitude,
            Outcome::Loss => 1.0 - self.win_magnitude,
            Outcome::Tie => 1.0 - self.tie_cost,
            Outcome::Neutral => 1.0,
        }
    }

    /// `(reward for the holder of a against b, reward for the holder of b against a)`.
    ///
    /// Not symmetric in general: the global cost is applied per
    /// [`GlobalCostMode`].
    pub fn rewards(&self, a: Allele, b: Allele) -> (f64, f64) {
        let (cost_first, cost_second) = match self.global_cost_mode {
            GlobalCostMode::Both => (self.global_cost, self.global_cost),
            GlobalCostMode::FirstOnly => (self.global_cost, 0.0),
            GlobalCostMode::SecondOnly => (0.0, self.global_cost),
        };
        (
            self.raw_reward(a, b) - cost_first,
            self.raw_reward(b, a) - cost_second,
        )
    }

    /// Full `num_options x num_options` matrix of raw rewards, row = own option.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        (0..self.num_options)
            .map(|i| {
                (0..self.num_options)
                    .map(|j| self.raw_reward(i as Allele, j as Allele))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROCK: Allele = 0;
    const PAPER: Allele = 1;
    const SCISSORS: Allele = 2;

    #[test]
    fn unit_win_magnitude_matrix() {
        let p = PayoffModel::rock_paper_scissors(1.0);
        assert_eq!(p.rewards(ROCK, PAPER), (2.0, 0.0));
        assert_eq!(p.rewards(PAPER, SCISSORS), (2.0, 0.0));
        assert_eq!(p.rewards(SCISSORS, ROCK), (2.0, 0.0));
        assert_eq!(p.rewards(PAPER, ROCK), (0.0, 2.0));
        assert_eq!(p.rewards(ROCK, ROCK), (1.0, 1.0));
    }

    #[test]
    fn every_option_beats_successor_and_loses_to_predecessor() {
        for n in 3..8usize {
            for w in [0.1, 0.5, 1.0, 3.0] {
                let p = PayoffModel {
                    num_options: n,
                    win_magnitude: w,
                    tie_cost: 0.25,
                    global_cost: 0.1,
                    global_cost_mode: GlobalCostMode::Both,
                };
                for k in 0..n {
                    let succ = ((k + 1) % n) as Allele;
                    let pred = ((k + n - 1) % n) as Allele;
                    let k = k as Allele;
                    assert!(
                        p.rewards(k, succ).0 > p.rewards(k, pred).0,
                        "n={n} w={w} k={k}"
                    );
                    assert_eq!(p.outcome(k, succ), Outcome::Win);
                    assert_eq!(p.outcome(k, pred), Outcome::Loss);
                }
            }
        }
    }

    #[test]
    fn tie_cost_applies_on_ties_only() {
        let p = PayoffModel {
            tie_cost: 0.4,
            ..PayoffModel::rock_paper_scissors(0.5)
        };
        assert_eq!(p.rewards(PAPER, PAPER), (0.6, 0.6));
        assert_eq!(p.rewards(ROCK, PAPER), (1.5, 0.5));
    }

    #[test]
    fn global_cost_modes() {
        let base = PayoffModel {
            global_cost: 0.25,
            ..PayoffModel::rock_paper_scissors(0.5)
        };
        let both = base.rewards(ROCK, PAPER);
        assert_eq!(both, (1.25, 0.25));

        let first = PayoffModel {
            global_cost_mode: GlobalCostMode::FirstOnly,
            ..base
        };
        assert_eq!(first.rewards(ROCK, PAPER), (1.25, 0.5));

        let second = PayoffModel {
            global_cost_mode: GlobalCostMode::SecondOnly,
            ..base
        };
        assert_eq!(second.rewards(ROCK, PAPER), (1.5, 0.25));
        // Asymmetric: swapping the actors moves the cost with the position.
        assert_eq!(second.rewards(PAPER, ROCK), (0.5, 1.25));
    }

    #[test]
    fn distant_options_are_neutral() {
        let p = PayoffModel {
            num_options: 5,
            ..PayoffModel::rock_paper_scissors(0.5)
        };
        assert_eq!(p.outcome(0, 2), Outcome::Neutral);
        assert_eq!(p.rewards(0, 2), (1.0, 1.0));
    }

    #[test]
    fn matrix_rows_match_rewards() {
        let p = PayoffModel::rock_paper_scissors(0.2);
        let m = p.matrix();
        assert_eq!(m.len(), 3);
        for (i, row) in m.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                assert_eq!(v, p.rewards(i as Allele, j as Allele).0);
            }
        }
    }
}
