use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::errors::GameError;

/// A 52-card deck with an explicitly seeded shuffle state.
///
/// # Examples
///
/// ```
/// use tiltbench_engine::deck::Deck;
///
/// let mut a = Deck::new_with_seed(42);
/// let mut b = Deck::new_with_seed(42);
/// a.shuffle();
/// b.shuffle();
/// assert_eq!(a.draw().unwrap(), b.draw().unwrap());
/// assert_eq!(a.remaining(), 51);
/// ```
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        // Keep initial order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            position: 0,
            rng,
        }
    }

    /// Build a deck whose draw order starts with `prefix`.
    ///
    /// The remaining cards follow in a seeded shuffle. Used to script a hand
    /// without touching the dealing logic.
    pub fn stacked(prefix: &[Card], seed: u64) -> Result<Self, GameError> {
        let mut seen = HashSet::with_capacity(prefix.len());
        for &c in prefix {
            if !seen.insert(c) {
                return Err(GameError::DuplicateCard(c));
            }
        }
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut rest: Vec<Card> = full_deck()
            .into_iter()
            .filter(|c| !seen.contains(c))
            .collect();
        rest.shuffle(&mut rng);
        let mut cards = prefix.to_vec();
        cards.extend(rest);
        Ok(Self {
            cards,
            position: 0,
            rng,
        })
    }

    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
        self.position = 0;
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        if self.position >= self.cards.len() {
            None
        } else {
            let c = self.cards[self.position];
            self.position += 1;
            Some(c)
        }
    }

    /// Remove and return the top card.
    pub fn draw(&mut self) -> Result<Card, GameError> {
        self.deal_card().ok_or(GameError::EmptyDeck)
    }

    pub fn burn(&mut self) -> Result<(), GameError> {
        self.draw().map(|_| ())
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}
