//! Running per-seat tendencies learned from public actions.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tiltbench_engine::events::{ActionRecord, HandRecord};
use tiltbench_engine::rules::Action;
use tiltbench_engine::state::Street;

/// Counts for one opponent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStats {
    pub hands: u32,
    /// Hands with a voluntary preflop call, bet or raise
    pub vpip: u32,
    /// Decisions taken while facing a bet or raise
    pub faced_raise: u32,
    pub folded_to_raise: u32,
    pub aggressive: u32,
    pub passive_calls: u32,
}

impl SeatStats {
    /// Laplace-smoothed ratio; unseen seats sit at one half.
    fn smoothed(hits: u32, total: u32) -> f64 {
        (f64::from(hits) + 1.0) / (f64::from(total) + 2.0)
    }

    pub fn vpip_rate(&self) -> f64 {
        Self::smoothed(self.vpip, self.hands)
    }

    pub fn fold_to_raise(&self) -> f64 {
        Self::smoothed(self.folded_to_raise, self.faced_raise)
    }

    /// Share of bets and raises among non-fold, non-check actions.
    pub fn aggression(&self) -> f64 {
        Self::smoothed(self.aggressive, self.aggressive + self.passive_calls)
    }
}

/// Tendencies of every seat seen this session.
#[derive(Debug, Clone, Default)]
pub struct OpponentModel {
    stats: HashMap<usize, SeatStats>,
    // per-hand scratch
    voluntary: HashSet<usize>,
    street: Option<Street>,
    facing: bool,
}

impl OpponentModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self, seat: usize) -> SeatStats {
        self.stats.get(&seat).copied().unwrap_or_default()
    }

    pub fn fold_to_raise(&self, seat: usize) -> f64 {
        self.stats(seat).fold_to_raise()
    }

    /// Probability that `seat` continues against aggression.
    pub fn defend_probability(&self, seat: usize) -> f64 {
        1.0 - self.fold_to_raise(seat)
    }

    pub fn observe(&mut self, record: &ActionRecord) {
        if self.street != Some(record.street) {
            self.street = Some(record.street);
            // Blinds make preflop a facing-bet street from the start.
            self.facing = record.street == Street::PreFlop;
        }
        let entry = self.stats.entry(record.seat).or_default();
        if self.facing && !matches!(record.action, Action::Check) {
            entry.faced_raise += 1;
            if record.action == Action::Fold {
                entry.folded_to_raise += 1;
            }
        }
        match record.action {
            Action::Call(_) => entry.passive_calls += 1,
            Action::Bet(_) | Action::Raise(_) => {
                entry.aggressive += 1;
                self.facing = true;
            }
            Action::Fold | Action::Check => {}
        }
        if record.street == Street::PreFlop
            && matches!(record.action, Action::Call(_) | Action::Bet(_) | Action::Raise(_))
        {
            self.voluntary.insert(record.seat);
        }
    }

    pub fn hand_finished(&mut self, record: &HandRecord) {
        for (seat, hole) in record.hole_cards.iter().enumerate() {
            if hole.is_none() {
                continue;
            }
            let entry = self.stats.entry(seat).or_default();
            entry.hands += 1;
            if self.voluntary.contains(&seat) {
                entry.vpip += 1;
            }
        }
        self.voluntary.clear();
        self.street = None;
        self.facing = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn act(seat: usize, street: Street, action: Action) -> ActionRecord {
        ActionRecord {
            seat,
            street,
            action,
        }
    }

    #[test]
    fn unseen_seat_is_neutral() {
        let model = OpponentModel::new();
        assert!((model.fold_to_raise(3) - 0.5).abs() < 1e-9);
        assert!((model.stats(3).vpip_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn folds_against_raises_raise_the_estimate() {
        let mut model = OpponentModel::new();
        for _ in 0..8 {
            model.observe(&act(0, Street::Flop, Action::Bet(20)));
            model.observe(&act(1, Street::Flop, Action::Fold));
            model.street = None;
        }
        assert!(model.fold_to_raise(1) > 0.85);
        assert!(model.stats(0).aggression() > 0.85);
        // Seat 0 opened each time and never faced a bet.
        assert_eq!(model.stats(0).faced_raise, 0);
    }

    #[test]
    fn checks_do_not_count_as_facing() {
        let mut model = OpponentModel::new();
        model.observe(&act(0, Street::Turn, Action::Check));
        model.observe(&act(1, Street::Turn, Action::Check));
        assert_eq!(model.stats(1).faced_raise, 0);
    }

    #[test]
    fn reset_forgets_everything() {
        let mut model = OpponentModel::new();
        model.observe(&act(2, Street::PreFlop, Action::Fold));
        assert_eq!(model.stats(2).folded_to_raise, 1);
        model.reset();
        assert_eq!(model.stats(2), SeatStats::default());
    }
}
