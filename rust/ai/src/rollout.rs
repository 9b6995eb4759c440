//! Chunked, seeded Monte-Carlo sampling over hidden cards.
//!
//! Work is split into fixed-size chunks. Chunk `i` draws from its own
//! `ChaCha8Rng` seeded from `(seed, i)`, so the merged result only depends
//! on the seed and the number of chunks completed, never on scheduling.

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tiltbench_engine::cancel::CancelToken;
use tiltbench_engine::cards::{full_deck, Card};
use tiltbench_engine::hand::{evaluate, HandRank};

use crate::errors::AiError;

pub const CHUNK_SIZE: u32 = 64;

/// Partial sums that can be combined in any order.
pub trait Accumulator: Default + Send {
    fn merge(self, other: Self) -> Self;
}

/// How much sampling to do and when to stop.
#[derive(Debug, Clone, Copy)]
pub struct RolloutBudget {
    pub samples: u32,
    pub seed: u64,
    /// Chunks not started by this instant are skipped
    pub deadline: Option<Instant>,
}

/// Seed for chunk `index`, spread with a splitmix64 step.
pub fn chunk_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed
        .wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Run `sample` up to `budget.samples` times in parallel chunks.
///
/// Returns the merged accumulator and the number of samples completed.
/// Cancellation discards everything and returns [`AiError::Cancelled`].
pub fn run<A, F>(budget: &RolloutBudget, cancel: &CancelToken, sample: F) -> Result<(A, u32), AiError>
where
    A: Accumulator,
    F: Fn(&mut ChaCha8Rng, &mut A) + Sync,
{
    let chunks = budget.samples.div_ceil(CHUNK_SIZE);
    let partials: Vec<(A, u32)> = (0..chunks)
        .into_par_iter()
        .map(|i| {
            let mut acc = A::default();
            if cancel.is_cancelled() || budget.deadline.is_some_and(|d| Instant::now() >= d) {
                return (acc, 0u32);
            }
            let mut rng = ChaCha8Rng::seed_from_u64(chunk_seed(budget.seed, u64::from(i)));
            let n = CHUNK_SIZE.min(budget.samples - i * CHUNK_SIZE);
            for _ in 0..n {
                sample(&mut rng, &mut acc);
            }
            (acc, n)
        })
        .collect();
    // Merge in chunk order so floating-point sums do not depend on scheduling.
    let (acc, done) = partials
        .into_iter()
        .fold((A::default(), 0), |(a, n), (b, m)| (a.merge(b), n + m));
    if cancel.is_cancelled() {
        return Err(AiError::Cancelled);
    }
    Ok((acc, done))
}

/// Cards not yet seen, ready to be sampled.
#[derive(Debug, Clone)]
pub struct Dealer {
    unseen: Vec<Card>,
}

/// One completion of the hidden information.
#[derive(Debug, Clone)]
pub struct Deal {
    pub board: Vec<Card>,
    pub opponents: Vec<[Card; 2]>,
}

impl Dealer {
    pub fn new(known: &[Card]) -> Self {
        Self {
            unseen: full_deck()
                .into_iter()
                .filter(|c| !known.contains(c))
                .collect(),
        }
    }

    pub fn unseen(&self) -> usize {
        self.unseen.len()
    }

    /// Deal hole cards to `opponents` players and complete `board` to five cards.
    pub fn deal(&mut self, rng: &mut ChaCha8Rng, board: &[Card], opponents: usize) -> Deal {
        let missing = 5usize.saturating_sub(board.len());
        let need = (missing + 2 * opponents).min(self.unseen.len());
        let (picked, _) = self.unseen.partial_shuffle(rng, need);
        let mut full_board = board.to_vec();
        full_board.extend_from_slice(&picked[..missing.min(picked.len())]);
        let holes = picked[missing.min(picked.len())..]
            .chunks_exact(2)
            .map(|p| [p[0], p[1]])
            .collect();
        Deal {
            board: full_board,
            opponents: holes,
        }
    }
}

/// Rank of hole cards on a complete board.
pub fn rank_with(hole: [Card; 2], board: &[Card]) -> Option<HandRank> {
    let mut cards = Vec::with_capacity(7);
    cards.extend_from_slice(&hole);
    cards.extend_from_slice(board);
    evaluate(&cards).ok()
}

/// Showdown equity tallies: wins count 1, ties count the split share.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equity {
    pub share: f64,
    pub samples: u32,
}

impl Accumulator for Equity {
    fn merge(self, other: Self) -> Self {
        Self {
            share: self.share + other.share,
            samples: self.samples + other.samples,
        }
    }
}

impl Equity {
    pub fn value(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.share / f64::from(self.samples)
        }
    }
}

/// Equity of `hole` against `opponents` random hands.
///
/// # Examples
///
/// ```
/// use tiltbench_ai::rollout::{estimate_equity, RolloutBudget};
/// use tiltbench_engine::cancel::CancelToken;
/// use tiltbench_engine::cards::parse_cards;
///
/// let hole = parse_cards("AsAh").unwrap();
/// let budget = RolloutBudget { samples: 2_000, seed: 1, deadline: None };
/// let eq = estimate_equity([hole[0], hole[1]], &[], 1, &budget, &CancelToken::new()).unwrap();
/// assert!(eq.value() > 0.75);
/// ```
pub fn estimate_equity(
    hole: [Card; 2],
    board: &[Card],
    opponents: usize,
    budget: &RolloutBudget,
    cancel: &CancelToken,
) -> Result<Equity, AiError> {
    let mut known = hole.to_vec();
    known.extend_from_slice(board);
    let dealer = Dealer::new(&known);
    let (eq, _) = run(budget, cancel, |rng, acc: &mut Equity| {
        let mut dealer = dealer.clone();
        let deal = dealer.deal(rng, board, opponents);
        let Some(mine) = rank_with(hole, &deal.board) else {
            return;
        };
        let mut best_other = None;
        let mut ties = 0u32;
        for opp in &deal.opponents {
            let Some(r) = rank_with(*opp, &deal.board) else {
                return;
            };
            if best_other.is_none_or(|b| r > b) {
                best_other = Some(r);
            }
            if r == mine {
                ties += 1;
            }
        }
        acc.samples += 1;
        match best_other {
            Some(b) if b > mine => {}
            _ => acc.share += 1.0 / f64::from(ties + 1),
        }
    })?;
    Ok(eq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiltbench_engine::cards::parse_cards;

    #[derive(Default)]
    struct Count(u32);

    impl Accumulator for Count {
        fn merge(self, other: Self) -> Self {
            Count(self.0 + other.0)
        }
    }

    #[test]
    fn runs_exact_sample_count() {
        let budget = RolloutBudget {
            samples: 1000,
            seed: 3,
            deadline: None,
        };
        let (count, done) = run(&budget, &CancelToken::new(), |_, c: &mut Count| c.0 += 1).unwrap();
        assert_eq!(count.0, 1000);
        assert_eq!(done, 1000);
    }

    #[test]
    fn same_seed_same_estimate() {
        let hole = parse_cards("KhQh").unwrap();
        let board = parse_cards("Jh4h9c").unwrap();
        let budget = RolloutBudget {
            samples: 500,
            seed: 17,
            deadline: None,
        };
        let a = estimate_equity([hole[0], hole[1]], &board, 2, &budget, &CancelToken::new()).unwrap();
        let b = estimate_equity([hole[0], hole[1]], &board, 2, &budget, &CancelToken::new()).unwrap();
        assert_eq!(a.share, b.share);
        assert_eq!(a.samples, 500);
    }

    #[test]
    fn cancelled_run_returns_error() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let budget = RolloutBudget {
            samples: 100,
            seed: 0,
            deadline: None,
        };
        let r = run(&budget, &cancel, |_, c: &mut Count| c.0 += 1);
        assert!(matches!(r, Err(AiError::Cancelled)));
    }

    #[test]
    fn dealer_never_reuses_known_cards() {
        let known = parse_cards("AsKs2c3c4c").unwrap();
        let mut dealer = Dealer::new(&known);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..200 {
            let deal = dealer.deal(&mut rng, &known[2..], 3);
            assert_eq!(deal.board.len(), 5);
            assert_eq!(deal.opponents.len(), 3);
            let mut all: Vec<Card> = deal.board.clone();
            all.extend(known[..2].iter().copied());
            all.extend(deal.opponents.iter().flatten().copied());
            let before = all.len();
            all.sort();
            all.dedup();
            assert_eq!(all.len(), before);
        }
    }
}
