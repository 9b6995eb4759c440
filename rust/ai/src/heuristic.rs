//! Rule-based strategy: hand strength bands mapped to action probabilities.
//!
//! The seat's [`Profile`] shapes play. Aggression moves probability from
//! passive to aggressive actions. Skill tightens bet sizing and moves
//! bluffing from random toward a balanced frequency concentrated on draws,
//! scaled by how often the live opponents have folded to raises.
//!
//! [`Profile`]: tiltbench_engine::observation::Profile

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tiltbench_engine::agent::Strategy;
use tiltbench_engine::events::{ActionRecord, HandRecord};
use tiltbench_engine::observation::Observation;
use tiltbench_engine::rules::Action;
use tracing::debug;

use crate::opponents::OpponentModel;
use crate::strength::{draws, strength};

/// `[fold, passive, aggressive]` weights.
pub type Mix = [f64; 3];

/// Bluff rate of a player who ignores their cards.
const RANDOM_BLUFF: f64 = 0.15;
/// Balanced bluff rate with a draw and without one.
const BALANCED_DRAW_BLUFF: f64 = 0.35;
const BALANCED_AIR_BLUFF: f64 = 0.04;

fn base_mix(strength: u8, facing_bet: bool) -> Mix {
    match (strength, facing_bet) {
        (9..=10, true) => [0.0, 0.35, 0.65],
        (7..=8, true) => [0.05, 0.75, 0.20],
        (5..=6, true) => [0.30, 0.65, 0.05],
        (3..=4, true) => [0.60, 0.40, 0.0],
        (_, true) => [0.90, 0.10, 0.0],
        (9..=10, false) => [0.0, 0.25, 0.75],
        (7..=8, false) => [0.0, 0.45, 0.55],
        (5..=6, false) => [0.0, 0.70, 0.30],
        (3..=4, false) => [0.0, 0.90, 0.10],
        (_, false) => [0.0, 1.0, 0.0],
    }
}

/// Strategy driven by a strength table, the seat's profile, and opponents' fold rates.
#[derive(Debug, Clone)]
pub struct HeuristicStrategy {
    rng: ChaCha8Rng,
    seed: u64,
    opponents: OpponentModel,
}

impl HeuristicStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            opponents: OpponentModel::new(),
        }
    }

    pub fn opponents(&self) -> &OpponentModel {
        &self.opponents
    }

    /// Probability weights for this spot after profile and bluff adjustments.
    pub fn mix(&self, obs: &Observation) -> Mix {
        let Some(hole) = obs.hole_cards else {
            return [1.0, 0.0, 0.0];
        };
        let profile = obs.profile.clamped();
        let skill = f64::from(profile.skill);
        let aggression = f64::from(profile.aggression);
        let facing = obs.to_call > 0;
        let s = strength(hole, &obs.board);
        let mut mix = base_mix(s, facing);

        // 0.5 aggression leaves the table untouched.
        let shift = (aggression - 0.5) * 0.6;
        if shift > 0.0 {
            let moved = mix[1] * shift;
            mix[1] -= moved;
            mix[2] += moved;
        } else {
            let moved = mix[2] * -shift;
            mix[2] -= moved;
            mix[1] += moved;
        }

        if s <= 4 {
            let has_draw = draws(hole, &obs.board).any();
            let balanced = if has_draw {
                BALANCED_DRAW_BLUFF
            } else {
                BALANCED_AIR_BLUFF
            };
            let fold_rate = {
                let (sum, n) = obs
                    .live_opponents()
                    .fold((0.0, 0u32), |(sum, n), o| (sum + self.opponents.fold_to_raise(o.seat), n + 1));
                if n == 0 {
                    0.5
                } else {
                    sum / f64::from(n)
                }
            };
            // Opponents folding half the time leave the balanced rate as is.
            let balanced = (balanced * fold_rate * 2.0).min(0.6);
            let bluff = RANDOM_BLUFF + (balanced - RANDOM_BLUFF) * skill;
            let bluff = bluff * (0.5 + aggression);
            if bluff > mix[2] {
                let extra = bluff - mix[2];
                let from_fold = extra.min(mix[0]);
                mix[0] -= from_fold;
                mix[1] -= (extra - from_fold).min(mix[1]);
                mix[2] = bluff;
            }
        }

        if obs.legal.raise.is_none() {
            mix[1] += mix[2];
            mix[2] = 0.0;
        }
        if obs.legal.check {
            mix[1] += mix[0];
            mix[0] = 0.0;
        }
        mix
    }

    fn size(&mut self, obs: &Observation, strength: u8) -> Action {
        let skill = f64::from(obs.profile.clamped().skill);
        let fraction = match strength {
            9..=10 => 0.9,
            7..=8 => 0.7,
            _ => 0.55,
        };
        let noise = (1.0 - skill) * self.rng.random_range(-0.6..=0.6);
        let fraction = (fraction * (1.0 + noise)).max(0.0);
        let pot_after_call = f64::from(obs.pot + obs.to_call);
        let to = obs.bet_to_match + (pot_after_call * fraction).round() as u32;
        obs.legal.raise_to(to).unwrap_or_else(|| obs.legal.passive())
    }
}

impl Strategy for HeuristicStrategy {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn decide(&mut self, obs: &Observation) -> Action {
        let mix = self.mix(obs);
        let total: f64 = mix.iter().sum();
        let roll = self.rng.random_range(0.0..1.0) * total.max(f64::EPSILON);
        let s = obs.hole_cards.map_or(0, |h| strength(h, &obs.board));
        let action = if roll < mix[0] {
            obs.legal.minimal()
        } else if roll < mix[0] + mix[1] {
            obs.legal.passive()
        } else {
            self.size(obs, s)
        };
        debug!(seat = obs.seat, strength = s, ?mix, %action, "heuristic decision");
        action
    }

    fn observe(&mut self, action: &ActionRecord) {
        self.opponents.observe(action);
    }

    fn hand_finished(&mut self, record: &HandRecord) {
        self.opponents.hand_finished(record);
    }

    fn reset_session(&mut self) {
        self.opponents.reset();
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}
