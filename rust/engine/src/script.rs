use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::GameError;

/// Cards fixed in advance for one hand.
///
/// Seats without an entry, and board cards past `board.len()`, are dealt
/// from the seeded remainder of the deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedDeal {
    pub hole_cards: BTreeMap<usize, [Card; 2]>,
    pub board: Vec<Card>,
}

impl ScriptedDeal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seat(mut self, seat: usize, cards: [Card; 2]) -> Self {
        self.hole_cards.insert(seat, cards);
        self
    }

    pub fn board(mut self, cards: &[Card]) -> Self {
        self.board = cards.to_vec();
        self
    }

    /// Build a deck whose draws reproduce this deal.
    ///
    /// `dealing_order` is the seats receiving cards, starting left of the
    /// button. The engine deals two rounds of hole cards in that order, then
    /// burns before the flop, the turn and the river.
    pub fn to_deck(&self, dealing_order: &[usize], seed: u64) -> Result<Deck, GameError> {
        if self.board.len() > 5 {
            return Err(GameError::Configuration(format!(
                "scripted board has {} cards",
                self.board.len()
            )));
        }
        if let Some(seat) = self
            .hole_cards
            .keys()
            .find(|s| !dealing_order.contains(s))
        {
            return Err(GameError::Configuration(format!(
                "scripted seat {} is not dealt in",
                seat
            )));
        }

        let mut fixed: Vec<Card> = self.hole_cards.values().flatten().copied().collect();
        fixed.extend_from_slice(&self.board);
        let mut seen = HashSet::with_capacity(fixed.len());
        for &c in &fixed {
            if !seen.insert(c) {
                return Err(GameError::DuplicateCard(c));
            }
        }
        // Draw past the fixed cards to reach the shuffled filler.
        let mut filler = Deck::stacked(&fixed, seed)?;
        for _ in 0..fixed.len() {
            filler.draw()?;
        }

        let n = dealing_order.len();
        let mut slots: Vec<Option<Card>> = vec![None; 2 * n + 8];
        for (i, seat) in dealing_order.iter().enumerate() {
            if let Some(cards) = self.hole_cards.get(seat) {
                slots[i] = Some(cards[0]);
                slots[n + i] = Some(cards[1]);
            }
        }
        // burn, flop x3, burn, turn, burn, river
        let board_slots = [1, 2, 3, 5, 7];
        for (card, offset) in self.board.iter().zip(board_slots) {
            slots[2 * n + offset] = Some(*card);
        }

        let mut order = Vec::with_capacity(slots.len());
        for slot in slots {
            order.push(match slot {
                Some(c) => c,
                None => filler.draw()?,
            });
        }
        Deck::stacked(&order, seed)
    }
}
