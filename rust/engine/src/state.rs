use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::events::ActionRecord;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    Complete,
}

impl Street {
    /// Community cards visible once this street is dealt.
    pub fn board_len(self) -> usize {
        match self {
            Street::PreFlop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River | Street::Showdown | Street::Complete => 5,
        }
    }

    /// The betting street following this one; `None` after the river.
    pub fn next_betting(self) -> Option<Street> {
        match self {
            Street::PreFlop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            _ => None,
        }
    }

    pub fn is_betting(self) -> bool {
        matches!(
            self,
            Street::PreFlop | Street::Flop | Street::Turn | Street::River
        )
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Street::PreFlop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
            Street::Showdown => "showdown",
            Street::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Per-hand betting state. Owned and mutated by [`crate::engine::Engine`]; everyone else
/// sees it through a shared reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandState {
    pub hand_id: String,
    pub street: Street,
    pub board: Vec<Card>,
    pub button: usize,
    pub small_blind_seat: usize,
    pub big_blind_seat: usize,
    /// Highest street contribution any player must match
    pub bet_to_match: u32,
    /// Last full bet or raise increment on this street
    pub last_raise_size: u32,
    pub last_aggressor: Option<usize>,
    /// Seat whose decision is pending
    pub to_act: Option<usize>,
    pub needs_to_act: Vec<bool>,
    /// Set when an incomplete all-in raise reaches a seat that already acted
    pub raise_locked: Vec<bool>,
    pub raises_this_street: u8,
    pub history: Vec<ActionRecord>,
}

impl HandState {
    pub(crate) fn new(hand_id: String, seats: usize, button: usize) -> Self {
        Self {
            hand_id,
            street: Street::PreFlop,
            board: Vec::with_capacity(5),
            button,
            small_blind_seat: button,
            big_blind_seat: button,
            bet_to_match: 0,
            last_raise_size: 0,
            last_aggressor: None,
            to_act: None,
            needs_to_act: vec![false; seats],
            raise_locked: vec![false; seats],
            raises_this_street: 0,
            history: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.street == Street::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streets_progress_in_order() {
        let mut s = Street::PreFlop;
        let mut seen = vec![s];
        while let Some(n) = s.next_betting() {
            seen.push(n);
            s = n;
        }
        assert_eq!(
            seen,
            vec![Street::PreFlop, Street::Flop, Street::Turn, Street::River]
        );
        assert!(Street::River < Street::Showdown);
        assert_eq!(Street::Turn.board_len(), 4);
    }
}
