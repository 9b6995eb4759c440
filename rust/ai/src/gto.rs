//! Approximate-GTO strategy: mixed policies over an abstracted state.
//!
//! The information key is street, strength bucket, facing-bet class and
//! raises so far this street (capped at three). Each key maps to weights over
//! five abstract actions. Tables persist as JSON. Without a file, a built-in
//! prior is used. [`StrategyTable::refine`] applies regret matching to EV
//! reports, and the strategy can refine its own table after every hand.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tiltbench_engine::agent::Strategy;
use tiltbench_engine::cancel::CancelToken;
use tiltbench_engine::events::{DecisionEvent, HandRecord};
use tiltbench_engine::observation::Observation;
use tiltbench_engine::rules::{Action, LegalActions};
use tiltbench_engine::state::Street;
use tracing::{debug, info};

use crate::errors::AiError;
use crate::ev::{evaluate_decision, EvReport, EvSettings};
use crate::model::Alternative;
use crate::strength::bucket;

pub const BUCKETS: u8 = 6;
pub const MAX_RAISE_CLASS: u8 = 3;
/// Minimum weight of any legal abstract action.
pub const FLOOR: f32 = 0.02;
const TABLE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbstractAction {
    Fold,
    Passive,
    BetHalfPot,
    BetPot,
    AllIn,
}

impl AbstractAction {
    pub const ALL: [AbstractAction; 5] = [
        AbstractAction::Fold,
        AbstractAction::Passive,
        AbstractAction::BetHalfPot,
        AbstractAction::BetPot,
        AbstractAction::AllIn,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Concrete action at this decision point, if the abstraction applies.
    pub fn concretize(self, legal: &LegalActions, pot: u32, bet_to_match: u32, to_call: u32) -> Option<Action> {
        let pot_after_call = pot + to_call;
        match self {
            AbstractAction::Fold if legal.check => None,
            AbstractAction::Fold => Some(Action::Fold),
            AbstractAction::Passive => Some(legal.passive()),
            AbstractAction::BetHalfPot => legal.raise_to(bet_to_match + pot_after_call / 2),
            AbstractAction::BetPot => legal.raise_to(bet_to_match + pot_after_call),
            AbstractAction::AllIn => legal.raise.map(|r| r.action(r.max_to)),
        }
    }

    fn from_alternative(alt: Alternative) -> Option<Self> {
        match alt {
            Alternative::Fold => Some(AbstractAction::Fold),
            Alternative::CheckCall => Some(AbstractAction::Passive),
            Alternative::MinRaise => None,
            Alternative::HalfPot => Some(AbstractAction::BetHalfPot),
            Alternative::Pot => Some(AbstractAction::BetPot),
            Alternative::AllIn => Some(AbstractAction::AllIn),
        }
    }
}

/// Size of the bet faced relative to the pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Nothing,
    Small,
    Large,
}

impl Facing {
    pub fn classify(to_call: u32, pot: u32) -> Self {
        if to_call == 0 {
            Facing::Nothing
        } else if to_call.saturating_mul(2) <= pot {
            Facing::Small
        } else {
            Facing::Large
        }
    }

    fn code(self) -> &'static str {
        match self {
            Facing::Nothing => "none",
            Facing::Small => "small",
            Facing::Large => "large",
        }
    }
}

/// Abstracted information state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoKey {
    pub street: Street,
    pub bucket: u8,
    pub facing: Facing,
    pub raises: u8,
}

impl InfoKey {
    pub fn from_observation(obs: &Observation) -> Option<Self> {
        let hole = obs.hole_cards?;
        Some(Self {
            street: obs.street,
            bucket: bucket(hole, &obs.board, BUCKETS),
            facing: Facing::classify(obs.to_call, obs.pot),
            raises: obs.raises_this_street.min(MAX_RAISE_CLASS),
        })
    }
}

impl fmt::Display for InfoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|b{}|{}|r{}",
            self.street,
            self.bucket,
            self.facing.code(),
            self.raises
        )
    }
}

fn prior_weights(key: &InfoKey) -> Vec<f32> {
    let b = f32::from(key.bucket) / f32::from(BUCKETS - 1);
    let re_raise = f32::from(key.raises) * 0.1;
    let mut w = match key.facing {
        Facing::Nothing => vec![
            0.0,
            1.0 - 0.6 * b,
            0.1 + 0.3 * b,
            0.05 + 0.25 * b,
            0.02 + 0.1 * b * b,
        ],
        Facing::Small => vec![
            (0.6 - 0.6 * b).max(0.0),
            0.5,
            0.05 + 0.2 * b,
            0.03 + 0.15 * b,
            0.02 + 0.15 * b * b,
        ],
        Facing::Large => vec![
            (0.8 - 0.8 * b).max(0.0) + re_raise,
            0.3 + 0.2 * b,
            0.02 + 0.1 * b,
            0.02 + 0.1 * b,
            0.02 + 0.25 * b * b,
        ],
    };
    let total: f32 = w.iter().sum();
    for x in &mut w {
        *x /= total;
    }
    w
}

/// Positive regrets normalised; uniform when none are positive.
pub fn regret_matching_into(regrets: &[f64], out: &mut [f64]) {
    let mut positive_sum = 0.0;
    for (s, &r) in out.iter_mut().zip(regrets) {
        *s = if r > 0.0 { r } else { 0.0 };
        positive_sum += *s;
    }
    if positive_sum > 0.0 {
        for s in out.iter_mut() {
            *s /= positive_sum;
        }
    } else {
        out.fill(1.0 / out.len() as f64);
    }
}

/// Mixed strategy per information key, plus accumulated regrets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyTable {
    pub version: u32,
    pub entries: BTreeMap<String, Vec<f32>>,
    #[serde(default)]
    pub regrets: BTreeMap<String, Vec<f64>>,
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StrategyTable {
    /// Hand-tuned prior covering every key.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        for street in [Street::PreFlop, Street::Flop, Street::Turn, Street::River] {
            for bucket in 0..BUCKETS {
                for facing in [Facing::Nothing, Facing::Small, Facing::Large] {
                    for raises in 0..=MAX_RAISE_CLASS {
                        let key = InfoKey {
                            street,
                            bucket,
                            facing,
                            raises,
                        };
                        entries.insert(key.to_string(), prior_weights(&key));
                    }
                }
            }
        }
        Self {
            version: TABLE_VERSION,
            entries,
            regrets: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, AiError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, AiError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, AiError> {
        let table = Self::from_json(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), entries = table.entries.len(), "strategy table loaded");
        Ok(table)
    }

    pub fn save(&self, path: &Path) -> Result<(), AiError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Weights for `key`, falling back to the prior for unknown keys.
    pub fn weights(&self, key: &InfoKey) -> Vec<f32> {
        match self.entries.get(&key.to_string()) {
            Some(w) if w.len() == AbstractAction::ALL.len() => w.clone(),
            _ => prior_weights(key),
        }
    }

    /// Fold the report's counterfactual regrets into the entry for `event`.
    ///
    /// Returns `false` when the event carries no usable key.
    pub fn refine(&mut self, event: &DecisionEvent, report: &EvReport) -> bool {
        let Some(key) = InfoKey::from_observation(&event.observation) else {
            return false;
        };
        let name = key.to_string();
        let regrets = self
            .regrets
            .entry(name.clone())
            .or_insert_with(|| vec![0.0; AbstractAction::ALL.len()]);
        let mut touched = false;
        for alt in &report.alternatives {
            if let Some(a) = AbstractAction::from_alternative(alt.kind) {
                regrets[a.index()] += alt.ev - report.taken_ev;
                touched = true;
            }
        }
        if !touched {
            return false;
        }
        let mut matched = vec![0.0; regrets.len()];
        regret_matching_into(regrets, &mut matched);
        self.entries
            .insert(name, matched.iter().map(|&p| p as f32).collect());
        true
    }
}

/// Sampling strategy over a [`StrategyTable`].
#[derive(Debug, Clone)]
pub struct GtoStrategy {
    table: StrategyTable,
    rng: ChaCha8Rng,
    seed: u64,
    /// EV settings for refining after each hand; `None` disables it
    online: Option<EvSettings>,
    own_seats: HashSet<usize>,
}

impl GtoStrategy {
    pub fn new(seed: u64) -> Self {
        Self::with_table(StrategyTable::builtin(), seed)
    }

    pub fn with_table(table: StrategyTable, seed: u64) -> Self {
        Self {
            table,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            online: None,
            own_seats: HashSet::new(),
        }
    }

    /// Refine the table from this seat's own decisions after each hand.
    pub fn with_online_refinement(mut self, settings: EvSettings) -> Self {
        self.online = Some(settings);
        self
    }

    pub fn table(&self) -> &StrategyTable {
        &self.table
    }

    /// Mixed policy over distinct legal actions; weights sum to one.
    pub fn policy(&self, obs: &Observation) -> Vec<(Action, f64)> {
        let Some(key) = InfoKey::from_observation(obs) else {
            return vec![(obs.legal.minimal(), 1.0)];
        };
        let weights = self.table.weights(&key);
        let mut out: Vec<(Action, f64)> = Vec::with_capacity(AbstractAction::ALL.len());
        for a in AbstractAction::ALL {
            let Some(action) = a.concretize(&obs.legal, obs.pot, obs.bet_to_match, obs.to_call) else {
                continue;
            };
            let w = f64::from(weights[a.index()].max(FLOOR));
            match out.iter_mut().find(|(x, _)| *x == action) {
                Some(entry) => entry.1 += w,
                None => out.push((action, w)),
            }
        }
        let total: f64 = out.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return vec![(obs.legal.minimal(), 1.0)];
        }
        for entry in &mut out {
            entry.1 /= total;
        }
        out
    }
}

impl Strategy for GtoStrategy {
    fn name(&self) -> &str {
        "gto"
    }

    fn decide(&mut self, obs: &Observation) -> Action {
        self.own_seats.insert(obs.seat);
        let policy = self.policy(obs);
        let mut roll = self.rng.random_range(0.0..1.0);
        for (action, p) in &policy {
            if roll < *p {
                return *action;
            }
            roll -= p;
        }
        policy
            .last()
            .map_or_else(|| obs.legal.minimal(), |(a, _)| *a)
    }

    fn hand_finished(&mut self, record: &HandRecord) {
        let Some(settings) = self.online.as_ref() else {
            return;
        };
        let cancel = CancelToken::new();
        let mut refined = 0;
        for event in record.events.iter().filter(|e| self.own_seats.contains(&e.seat)) {
            match evaluate_decision(event, settings, &cancel) {
                Ok(report) => {
                    if self.table.refine(event, &report) {
                        refined += 1;
                    }
                }
                Err(e) => debug!(error = %e, "skipping refinement"),
            }
        }
        debug!(hand_id = %record.hand_id, refined, "strategy table refined");
    }

    fn reset_session(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.own_seats.clear();
    }
}
