use crate::cards::Card;
use serde::{Deserialize, Serialize};

/// Who supplies decisions for a seat.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatKind {
    Human,
    Ai,
}

/// Participation of a player in the current hand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    /// Still in the hand and able to act
    Active,
    /// Gave up the hand; never acts again until the next hand
    Folded,
    /// Committed the whole stack; stays eligible but takes no further action
    AllIn,
    /// Not dealt in (no chips)
    SittingOut,
}

impl PlayerStatus {
    /// Still holding cards (Active or AllIn).
    pub fn is_live(self) -> bool {
        matches!(self, PlayerStatus::Active | PlayerStatus::AllIn)
    }
}

/// A seated player: chip stack, private hole cards, and what they have put in this hand.
#[derive(Debug, Clone)]
pub struct Player {
    /// Seat index, stable for the whole session
    id: usize,
    name: String,
    kind: SeatKind,
    /// Chips behind (never negative)
    stack: u32,
    /// Hole cards, present only while a hand is dealt
    hole: Option<[Card; 2]>,
    /// Chips put in on the current street
    street_contribution: u32,
    /// Chips put in over the whole hand, antes and blinds included
    hand_contribution: u32,
    status: PlayerStatus,
}

impl Player {
    pub fn new(id: usize, name: impl Into<String>, kind: SeatKind, stack: u32) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            stack,
            hole: None,
            street_contribution: 0,
            hand_contribution: 0,
            status: if stack > 0 {
                PlayerStatus::Active
            } else {
                PlayerStatus::SittingOut
            },
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> SeatKind {
        self.kind
    }
    pub fn stack(&self) -> u32 {
        self.stack
    }
    pub fn status(&self) -> PlayerStatus {
        self.status
    }
    pub fn hole_cards(&self) -> Option<[Card; 2]> {
        self.hole
    }
    pub fn street_contribution(&self) -> u32 {
        self.street_contribution
    }
    pub fn hand_contribution(&self) -> u32 {
        self.hand_contribution
    }

    /// Prepare for a new hand: clear cards and contributions, sit out when broke.
    pub fn reset_for_hand(&mut self) {
        self.hole = None;
        self.street_contribution = 0;
        self.hand_contribution = 0;
        self.status = if self.stack > 0 {
            PlayerStatus::Active
        } else {
            PlayerStatus::SittingOut
        };
    }

    pub fn set_stack(&mut self, stack: u32) {
        self.stack = stack;
    }

    pub fn give_cards(&mut self, cards: [Card; 2]) {
        self.hole = Some(cards);
    }

    pub fn fold(&mut self) {
        self.status = PlayerStatus::Folded;
    }

    /// Move up to `amount` chips from the stack into the pot; returns what was actually paid.
    ///
    /// Paying the last chip marks the player all-in.
    pub fn commit(&mut self, amount: u32) -> u32 {
        let paid = amount.min(self.stack);
        self.stack -= paid;
        self.street_contribution += paid;
        self.hand_contribution += paid;
        if self.stack == 0 && self.status == PlayerStatus::Active {
            self.status = PlayerStatus::AllIn;
        }
        paid
    }

    /// Antes count for the hand but not toward matching the street's bet.
    pub fn commit_dead(&mut self, amount: u32) -> u32 {
        let paid = self.commit(amount);
        self.street_contribution -= paid;
        paid
    }

    pub fn end_street(&mut self) {
        self.street_contribution = 0;
    }

    pub fn add_chips(&mut self, amount: u32) {
        self.stack = self.stack.saturating_add(amount);
    }

    /// Return the whole hand's contribution to the stack (hand aborted).
    pub fn refund(&mut self) {
        self.stack = self.stack.saturating_add(self.hand_contribution);
        self.hand_contribution = 0;
        self.street_contribution = 0;
    }

    /// Contributions have been paid out into pots.
    pub(crate) fn clear_contributions(&mut self) {
        self.hand_contribution = 0;
        self.street_contribution = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_caps_at_stack_and_marks_all_in() {
        let mut p = Player::new(0, "p0", SeatKind::Ai, 30);
        assert_eq!(p.commit(50), 30);
        assert_eq!(p.stack(), 0);
        assert_eq!(p.status(), PlayerStatus::AllIn);
        assert_eq!(p.hand_contribution(), 30);
    }

    #[test]
    fn ante_is_dead_money() {
        let mut p = Player::new(1, "p1", SeatKind::Human, 100);
        p.commit_dead(5);
        assert_eq!(p.street_contribution(), 0);
        assert_eq!(p.hand_contribution(), 5);
        assert_eq!(p.stack(), 95);
    }
}
