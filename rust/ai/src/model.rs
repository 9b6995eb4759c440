//! Candidate actions and their counterfactual payoff on a sampled deal.
//!
//! Opponents follow a call/fold model. After a check or call, every live
//! opponent matches the current bet and the hand is checked down. After a
//! bet or raise, each opponent who can still act continues with its defend
//! probability and folds otherwise. Payoffs run through the engine's pot
//! layering and award rules, so side pots and split remainders match what
//! the table would pay.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tiltbench_engine::cancel::CancelToken;
use tiltbench_engine::cards::Card;
use tiltbench_engine::hand::HandRank;
use tiltbench_engine::observation::Observation;
use tiltbench_engine::player::PlayerStatus;
use tiltbench_engine::pot::{award_layers, build_layers, clockwise_from_button, Contribution};
use tiltbench_engine::rules::{Action, LegalActions};

use crate::errors::AiError;
use crate::rollout::{rank_with, run, Accumulator, Deal, Dealer, RolloutBudget};

/// Labels for the alternatives scored at a decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alternative {
    Fold,
    CheckCall,
    MinRaise,
    HalfPot,
    Pot,
    AllIn,
}

/// Concrete legal actions for each alternative, duplicates removed.
pub fn candidates(legal: &LegalActions, pot: u32, bet_to_match: u32, to_call: u32) -> Vec<(Alternative, Action)> {
    let mut out: Vec<(Alternative, Action)> = Vec::with_capacity(6);
    let mut push = |alt, action: Action| {
        if !out.iter().any(|(_, a)| *a == action) {
            out.push((alt, action));
        }
    };
    if !legal.check {
        push(Alternative::Fold, Action::Fold);
    }
    push(Alternative::CheckCall, legal.passive());
    if let Some(r) = legal.raise {
        // Pot-sized raise: call first, then raise by the resulting pot.
        let pot_after_call = pot + to_call;
        push(Alternative::MinRaise, r.action(r.min_to));
        if let Some(a) = legal.raise_to(bet_to_match + pot_after_call / 2) {
            push(Alternative::HalfPot, a);
        }
        if let Some(a) = legal.raise_to(bet_to_match + pot_after_call) {
            push(Alternative::Pot, a);
        }
        push(Alternative::AllIn, r.action(r.max_to));
    }
    out
}

#[derive(Debug, Clone, Copy)]
struct SeatState {
    seat: usize,
    stack: u32,
    street: u32,
    hand: u32,
    status: PlayerStatus,
}

/// Immutable decision point reduced to what the payoff model needs.
#[derive(Debug, Clone)]
pub struct Spot {
    pub hero: usize,
    pub hole: [Card; 2],
    pub board: Vec<Card>,
    pub button: usize,
    pub bet_to_match: u32,
    pub pot: u32,
    seats: Vec<SeatState>,
}

impl Spot {
    pub fn from_observation(obs: &Observation) -> Result<Self, AiError> {
        let hole = obs
            .hole_cards
            .ok_or(AiError::MissingHoleCards { seat: obs.seat })?;
        Ok(Self {
            hero: obs.seat,
            hole,
            board: obs.board.clone(),
            button: obs.button,
            bet_to_match: obs.bet_to_match,
            pot: obs.pot,
            seats: obs
                .seats
                .iter()
                .map(|s| SeatState {
                    seat: s.seat,
                    stack: s.stack,
                    street: s.street_contribution,
                    hand: s.hand_contribution,
                    status: s.status,
                })
                .collect(),
        })
    }

    /// Cards whose location is known to the hero.
    pub fn known_cards(&self) -> Vec<Card> {
        let mut known = self.hole.to_vec();
        known.extend_from_slice(&self.board);
        known
    }

    /// Opponents still holding cards, in seat order.
    pub fn live_opponents(&self) -> Vec<usize> {
        self.seats
            .iter()
            .filter(|s| s.seat != self.hero && s.status.is_live())
            .map(|s| s.seat)
            .collect()
    }

    fn seat(&self, seat: usize) -> Option<&SeatState> {
        self.seats.iter().find(|s| s.seat == seat)
    }

    /// Minimum-defence frequency against a raise to `to`.
    pub fn mdf(&self, to: u32) -> f64 {
        let raise = f64::from(to.saturating_sub(self.bet_to_match));
        let pot = f64::from(self.pot);
        if pot + raise <= 0.0 {
            1.0
        } else {
            pot / (pot + raise)
        }
    }

    /// Chips won at the end minus chips added from this point on.
    ///
    /// `uniforms[i]` is a uniform draw for the i-th live opponent; it continues
    /// against aggression when the draw is below its defend probability.
    /// `defend` overrides the minimum-defence frequency per seat.
    pub fn payoff(
        &self,
        action: Action,
        deal: &Deal,
        uniforms: &[f64],
        defend: &HashMap<usize, f64>,
    ) -> f64 {
        let Some(me) = self.seat(self.hero) else {
            return 0.0;
        };
        let (target, aggressive) = match action {
            Action::Fold => return 0.0,
            Action::Check | Action::Call(_) => (self.bet_to_match, false),
            Action::Bet(to) | Action::Raise(to) => (to, true),
        };
        let my_add = target.saturating_sub(me.street).min(me.stack);

        let opponents = self.live_opponents();
        let mut contributions = Vec::with_capacity(self.seats.len());
        let mut ranks: HashMap<usize, HandRank> = HashMap::with_capacity(opponents.len() + 1);
        for s in &self.seats {
            if s.seat == self.hero {
                contributions.push(Contribution {
                    seat: s.seat,
                    amount: s.hand + my_add,
                    folded: false,
                });
                continue;
            }
            let Some(idx) = opponents.iter().position(|&o| o == s.seat) else {
                contributions.push(Contribution {
                    seat: s.seat,
                    amount: s.hand,
                    folded: true,
                });
                continue;
            };
            let stays = if aggressive && s.status == PlayerStatus::Active {
                let p = defend.get(&s.seat).copied().unwrap_or_else(|| self.mdf(target));
                uniforms.get(idx).copied().unwrap_or(0.0) < p
            } else {
                true
            };
            let add = if stays && s.status == PlayerStatus::Active {
                target.saturating_sub(s.street).min(s.stack)
            } else {
                0
            };
            contributions.push(Contribution {
                seat: s.seat,
                amount: s.hand + add,
                folded: !stays,
            });
            if stays {
                if let Some(r) = deal.opponents.get(idx).and_then(|h| rank_with(*h, &deal.board)) {
                    ranks.insert(s.seat, r);
                }
            }
        }
        if let Some(r) = rank_with(self.hole, &deal.board) {
            ranks.insert(self.hero, r);
        }

        let layers = build_layers(&contributions);
        let order = clockwise_from_button(self.button, self.seats.len());
        let won: u32 = award_layers(&layers, &ranks, &order)
            .iter()
            .flat_map(|p| p.shares.iter())
            .filter(|(seat, _)| *seat == self.hero)
            .map(|(_, share)| *share)
            .sum();
        f64::from(won) - f64::from(my_add)
    }
}

/// Per-candidate payoff sums.
#[derive(Debug, Clone, Default)]
pub struct PayoffSums {
    pub sums: Vec<f64>,
    pub samples: u32,
}

impl Accumulator for PayoffSums {
    fn merge(mut self, other: Self) -> Self {
        if self.sums.len() < other.sums.len() {
            self.sums.resize(other.sums.len(), 0.0);
        }
        for (a, b) in self.sums.iter_mut().zip(other.sums) {
            *a += b;
        }
        self.samples += other.samples;
        self
    }
}

impl PayoffSums {
    pub fn means(&self) -> Vec<f64> {
        if self.samples == 0 {
            return vec![0.0; self.sums.len()];
        }
        let n = f64::from(self.samples);
        self.sums.iter().map(|s| s / n).collect()
    }
}

/// Mean payoff of each action over sampled deals.
///
/// Every action is scored on the same deals and the same opponent draws so
/// differences between them are not sampling noise.
pub fn score_actions(
    spot: &Spot,
    actions: &[Action],
    defend: &HashMap<usize, f64>,
    budget: &RolloutBudget,
    cancel: &CancelToken,
) -> Result<PayoffSums, AiError> {
    let dealer = Dealer::new(&spot.known_cards());
    let opponents = spot.live_opponents().len();
    let (sums, _) = run(budget, cancel, |rng, acc: &mut PayoffSums| {
        if acc.sums.len() < actions.len() {
            acc.sums.resize(actions.len(), 0.0);
        }
        let mut dealer = dealer.clone();
        let deal = dealer.deal(rng, &spot.board, opponents);
        let uniforms: Vec<f64> = (0..opponents).map(|_| rng.random::<f64>()).collect();
        for (sum, action) in acc.sums.iter_mut().zip(actions) {
            *sum += spot.payoff(*action, &deal, &uniforms, defend);
        }
        acc.samples += 1;
    })?;
    Ok(sums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiltbench_engine::rules::{RaiseKind, RaiseRange};

    #[test]
    fn candidates_are_unique_and_legal() {
        let legal = LegalActions {
            fold: true,
            check: false,
            call: Some(20),
            raise: Some(RaiseRange {
                kind: RaiseKind::Raise,
                min_to: 40,
                max_to: 60,
            }),
        };
        let c = candidates(&legal, 50, 20, 20);
        for (_, a) in &c {
            assert!(legal.contains(a), "{:?}", a);
        }
        let actions: Vec<Action> = c.iter().map(|(_, a)| *a).collect();
        assert_eq!(actions[0], Action::Fold);
        assert_eq!(actions[1], Action::Call(20));
        assert!(actions.contains(&Action::Raise(60)));
        let mut dedup = actions.clone();
        dedup.dedup();
        assert_eq!(dedup.len(), actions.len());
    }

    #[test]
    fn no_fold_candidate_when_check_is_free() {
        let legal = LegalActions {
            fold: true,
            check: true,
            call: None,
            raise: None,
        };
        assert_eq!(candidates(&legal, 30, 0, 0), vec![(Alternative::CheckCall, Action::Check)]);
    }
}
