//! Rollout strategy: pick the candidate with the highest sampled EV.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tiltbench_engine::agent::Strategy;
use tiltbench_engine::cancel::CancelToken;
use tiltbench_engine::events::{ActionRecord, HandRecord};
use tiltbench_engine::observation::Observation;
use tiltbench_engine::rules::Action;
use tracing::{debug, warn};

use crate::model::{candidates, score_actions, Alternative, Spot};
use crate::opponents::OpponentModel;
use crate::rollout::RolloutBudget;

pub const DEFAULT_ROLLOUTS: u32 = 2_000;

/// Portion of the time budget spent sampling; the rest covers setup and return.
const BUDGET_SHARE: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct MonteCarloStrategy {
    rollouts: u32,
    seed: u64,
    decisions: u64,
    opponents: OpponentModel,
}

/// EV estimates for one decision.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub options: Vec<(Alternative, Action, f64)>,
    pub samples: u32,
}

impl Evaluation {
    pub fn best(&self) -> Option<Action> {
        self.options
            .iter()
            .max_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(_, action, _)| *action)
    }
}

impl MonteCarloStrategy {
    pub fn new(seed: u64, rollouts: u32) -> Self {
        Self {
            rollouts: rollouts.max(1),
            seed,
            decisions: 0,
            opponents: OpponentModel::new(),
        }
    }

    pub fn rollouts(&self) -> u32 {
        self.rollouts
    }

    /// Score every candidate at this decision point.
    pub fn evaluate(&mut self, obs: &Observation) -> Option<Evaluation> {
        let spot = Spot::from_observation(obs).ok()?;
        let options = candidates(&obs.legal, obs.pot, obs.bet_to_match, obs.to_call);
        let actions: Vec<Action> = options.iter().map(|(_, a)| *a).collect();
        let defend: HashMap<usize, f64> = spot
            .live_opponents()
            .into_iter()
            .map(|seat| (seat, self.opponents.defend_probability(seat)))
            .collect();
        let deadline = obs
            .time_budget_ms
            .map(|ms| Instant::now() + Duration::from_secs_f64(ms as f64 * BUDGET_SHARE / 1000.0));
        let budget = RolloutBudget {
            samples: self.rollouts,
            seed: self.seed.wrapping_add(self.decisions),
            deadline,
        };
        self.decisions += 1;
        let sums = match score_actions(&spot, &actions, &defend, &budget, &CancelToken::new()) {
            Ok(sums) => sums,
            Err(e) => {
                warn!(seat = obs.seat, error = %e, "rollout failed");
                return None;
            }
        };
        if sums.samples == 0 {
            return None;
        }
        let means = sums.means();
        Some(Evaluation {
            options: options
                .into_iter()
                .zip(means)
                .map(|((alt, action), ev)| (alt, action, ev))
                .collect(),
            samples: sums.samples,
        })
    }
}

impl Strategy for MonteCarloStrategy {
    fn name(&self) -> &str {
        "montecarlo"
    }

    fn decide(&mut self, obs: &Observation) -> Action {
        match self.evaluate(obs) {
            Some(eval) => {
                let action = eval.best().unwrap_or_else(|| obs.legal.minimal());
                debug!(seat = obs.seat, samples = eval.samples, %action, "rollout decision");
                action
            }
            // No completed samples before the deadline.
            None => obs.legal.minimal(),
        }
    }

    fn observe(&mut self, action: &ActionRecord) {
        self.opponents.observe(action);
    }

    fn hand_finished(&mut self, record: &HandRecord) {
        self.opponents.hand_finished(record);
    }

    fn reset_session(&mut self) {
        self.opponents.reset();
        self.decisions = 0;
    }
}
