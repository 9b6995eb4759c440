use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::events::ActionRecord;
use crate::player::{PlayerStatus, SeatKind};
use crate::rules::LegalActions;
use crate::state::Street;

/// Configured playing style of a seat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// 0.0 (beginner) to 1.0 (expert)
    pub skill: f32,
    /// 0.0 (passive) to 1.0 (maniac)
    pub aggression: f32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            skill: 0.5,
            aggression: 0.5,
        }
    }
}

impl Profile {
    /// Copy with both knobs clamped into `0.0..=1.0`.
    pub fn clamped(self) -> Self {
        Self {
            skill: self.skill.clamp(0.0, 1.0),
            aggression: self.aggression.clamp(0.0, 1.0),
        }
    }
}

/// Public view of another seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub seat: usize,
    pub name: String,
    pub kind: SeatKind,
    pub stack: u32,
    pub status: PlayerStatus,
    pub street_contribution: u32,
    pub hand_contribution: u32,
}

/// Everything a decider may know at its turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub hand_id: String,
    pub seat: usize,
    pub street: Street,
    pub hole_cards: Option<[Card; 2]>,
    pub board: Vec<Card>,
    /// All chips committed this hand
    pub pot: u32,
    pub bet_to_match: u32,
    pub to_call: u32,
    pub legal: LegalActions,
    pub button: usize,
    pub big_blind: u32,
    pub raises_this_street: u8,
    pub seats: Vec<SeatView>,
    pub history: Vec<ActionRecord>,
    pub profile: Profile,
    /// Wall-clock budget for the decision; `None` means unbounded
    pub time_budget_ms: Option<u64>,
}

impl Observation {
    pub fn own(&self) -> Option<&SeatView> {
        self.seats.iter().find(|s| s.seat == self.seat)
    }

    pub fn stack(&self) -> u32 {
        self.own().map_or(0, |s| s.stack)
    }

    /// Other seats still holding cards.
    pub fn live_opponents(&self) -> impl Iterator<Item = &SeatView> {
        self.seats
            .iter()
            .filter(move |s| s.seat != self.seat && s.status.is_live())
    }

    /// Share of the final pot this call would represent, 0 when nothing is owed.
    pub fn pot_odds(&self) -> f32 {
        if self.to_call == 0 {
            return 0.0;
        }
        let call = self.legal.call.unwrap_or(self.to_call);
        call as f32 / (self.pot + call) as f32
    }
}
