use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::hand::HandRank;
use crate::observation::Observation;
use crate::player::SeatKind;
use crate::pot::PotResult;
use crate::rules::{Action, LegalActions};
use crate::state::Street;

/// A public action at the table.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seat: usize,
    pub street: Street,
    pub action: Action,
}

/// How the table repaired a decision it could not apply as given.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Recovery {
    /// Not in the legal set; the minimal action was applied instead
    IllegalAction { reason: String },
    /// Bet above the stack, clamped to all-in
    InsufficientStack { requested: u32, available: u32 },
    /// Decision arrived after the budget; the minimal action was applied
    StrategyTimeout { elapsed_ms: u64, budget_ms: u64 },
}

/// One decision point, frozen at the moment the action was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionEvent {
    pub hand_id: String,
    /// Position of this decision within its hand, from 0
    pub sequence: u32,
    pub street: Street,
    pub seat: usize,
    pub seat_kind: SeatKind,
    /// What the decider saw
    pub observation: Observation,
    pub legal: LegalActions,
    pub requested: Action,
    pub applied: Action,
    #[serde(default)]
    pub recovery: Option<Recovery>,
    pub timestamp: DateTime<Utc>,
    pub latency_ms: u64,
    #[serde(default)]
    pub scripted: bool,
    pub stack_after: u32,
    pub pot_after: u32,
}

/// A hand revealed at showdown.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShownHand {
    pub seat: usize,
    pub hole_cards: [Card; 2],
    pub best_five: [Card; 5],
    pub rank: HandRank,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShowdownInfo {
    pub hands: Vec<ShownHand>,
}

/// Archive of a completed hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandRecord {
    /// Format: YYYYMMDD-NNNNNN
    pub hand_id: String,
    pub deck_seed: Option<u64>,
    #[serde(default)]
    pub scripted: bool,
    pub button: usize,
    pub starting_stacks: Vec<u32>,
    /// Hole cards per seat; `None` for seats not dealt in
    pub hole_cards: Vec<Option<[Card; 2]>>,
    pub board: Vec<Card>,
    pub events: Vec<DecisionEvent>,
    pub actions: Vec<ActionRecord>,
    pub pots: Vec<PotResult>,
    #[serde(default)]
    pub showdown: Option<ShowdownInfo>,
    pub rake: u32,
    pub final_stacks: Vec<u32>,
    pub final_street: Street,
    pub evaluator_calls: u32,
    pub ts: DateTime<Utc>,
}

impl HandRecord {
    /// Net chips won or lost per seat.
    pub fn net(&self) -> Vec<i64> {
        self.starting_stacks
            .iter()
            .zip(&self.final_stacks)
            .map(|(&start, &end)| i64::from(end) - i64::from(start))
            .collect()
    }
}

/// Receives events as the table produces them.
///
/// Sinks cannot fail the session; an implementation doing I/O keeps its own
/// error state.
pub trait EventSink: Send {
    fn on_decision(&mut self, event: &DecisionEvent);

    fn on_hand_complete(&mut self, _record: &HandRecord) {}
}

pub fn format_hand_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}
