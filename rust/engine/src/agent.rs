//! Decision makers the table consults at each turn.

use crate::events::{ActionRecord, HandRecord};
use crate::observation::Observation;
use crate::rules::{Action, LegalActions};

/// An AI decision policy owned by one seat for the whole session.
///
/// Implementations should return a member of `observation.legal`; the table
/// replaces anything else with the minimal legal action. Decisions should
/// respect `observation.time_budget_ms`; late answers are discarded.
pub trait Strategy: Send {
    fn name(&self) -> &str;

    fn decide(&mut self, observation: &Observation) -> Action;

    /// Called for every action applied at the table, including this seat's own.
    fn observe(&mut self, _action: &ActionRecord) {}

    fn hand_finished(&mut self, _record: &HandRecord) {}

    /// Forget everything learned about the current opponents.
    fn reset_session(&mut self) {}
}

/// Source of decisions for human seats. May block.
pub trait HumanInput {
    fn request_action(&mut self, observation: &Observation, legal: &LegalActions) -> Action;

    /// Called after each completed hand, e.g. to show the result.
    fn hand_finished(&mut self, _record: &HandRecord) {}
}

/// Who decides for a seat.
pub enum Controller {
    Human,
    Strategy(Box<dyn Strategy>),
}

impl Controller {
    pub fn is_human(&self) -> bool {
        matches!(self, Controller::Human)
    }

    pub fn label(&self) -> &str {
        match self {
            Controller::Human => "human",
            Controller::Strategy(s) => s.name(),
        }
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Controller({})", self.label())
    }
}

/// Always takes the same kind of action, adjusted to what is legal.
///
/// Useful as a stand-in human or a sparring seat in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedPolicy {
    CheckOrFold,
    CheckOrCall,
    AlwaysRaise,
}

impl FixedPolicy {
    pub fn choose(&self, legal: &LegalActions) -> Action {
        match self {
            FixedPolicy::CheckOrFold => legal.minimal(),
            FixedPolicy::CheckOrCall => legal.passive(),
            FixedPolicy::AlwaysRaise => legal
                .raise
                .map(|r| r.action(r.min_to))
                .unwrap_or_else(|| legal.passive()),
        }
    }
}

impl Strategy for FixedPolicy {
    fn name(&self) -> &str {
        match self {
            FixedPolicy::CheckOrFold => "check-fold",
            FixedPolicy::CheckOrCall => "check-call",
            FixedPolicy::AlwaysRaise => "min-raiser",
        }
    }

    fn decide(&mut self, observation: &Observation) -> Action {
        self.choose(&observation.legal)
    }
}

impl HumanInput for FixedPolicy {
    fn request_action(&mut self, _observation: &Observation, legal: &LegalActions) -> Action {
        self.choose(legal)
    }
}
