use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank, Suit};
use crate::errors::GameError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::HighCard => "high card",
            Category::OnePair => "one pair",
            Category::TwoPair => "two pair",
            Category::ThreeOfAKind => "three of a kind",
            Category::Straight => "straight",
            Category::Flush => "flush",
            Category::FullHouse => "full house",
            Category::FourOfAKind => "four of a kind",
            Category::StraightFlush => "straight flush",
        }
    }
}

/// Value of the best five-card hand.
///
/// Ordering is lexicographic: category first, then `kickers` from most to
/// least significant. Unused kicker slots are zero, so two ranks with equal
/// category always compare on the same layout:
///
/// | category | kickers |
/// |---|---|
/// | straight / straight flush | high card (5 for the wheel) |
/// | quads | quad rank, kicker |
/// | full house | trips rank, pair rank |
/// | flush / high card | five ranks, descending |
/// | trips | trips rank, two kickers |
/// | two pair | high pair, low pair, kicker |
/// | one pair | pair rank, three kickers |
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct HandRank {
    pub category: Category,
    // kickers: ordered high -> low for tiebreaks
    pub kickers: [u8; 5],
}

/// Rank the best five-card hand contained in 5 to 7 cards.
///
/// Uses rank counts and per-suit buckets instead of enumerating subsets.
/// [`evaluate_exhaustive`] computes the same value by brute force.
///
/// # Errors
///
/// - [`GameError::InvalidHandSize`] for fewer than 5 or more than 7 cards
/// - [`GameError::DuplicateCard`] if a card appears twice
///
/// # Examples
///
/// ```
/// use tiltbench_engine::cards::parse_cards;
/// use tiltbench_engine::hand::{evaluate, Category};
///
/// let wheel = evaluate(&parse_cards("As2d3c4h5s").unwrap()).unwrap();
/// let six_high = evaluate(&parse_cards("2d3c4h5s6d").unwrap()).unwrap();
/// assert_eq!(wheel.category, Category::Straight);
/// assert!(wheel < six_high);
/// ```
pub fn evaluate(cards: &[Card]) -> Result<HandRank, GameError> {
    check_input(cards)?;
    Ok(evaluate_unchecked(cards))
}

/// Brute-force evaluator: the maximum of [`rank_five`] over every 5-card subset.
pub fn evaluate_exhaustive(cards: &[Card]) -> Result<HandRank, GameError> {
    best_five(cards).map(|(_, rank)| rank)
}

/// The five cards forming the best hand, with their rank.
pub fn best_five(cards: &[Card]) -> Result<([Card; 5], HandRank), GameError> {
    check_input(cards)?;
    let n = cards.len();
    let mut best: Option<([Card; 5], HandRank)> = None;
    for a in 0..n {
        for b in a + 1..n {
            for c in b + 1..n {
                for d in c + 1..n {
                    for e in d + 1..n {
                        let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        let rank = rank_five(&five);
                        if best.as_ref().is_none_or(|(_, r)| rank > *r) {
                            best = Some((five, rank));
                        }
                    }
                }
            }
        }
    }
    best.ok_or(GameError::InvalidHandSize { count: n })
}

/// Rank exactly five cards.
pub fn rank_five(cards: &[Card; 5]) -> HandRank {
    let mut ranks: Vec<u8> = cards.iter().map(|c| rank_val(c.rank)).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    let flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight = detect_straight_high(&ranks);

    match (flush, straight) {
        (true, Some(high)) => {
            return HandRank {
                category: Category::StraightFlush,
                kickers: [high, 0, 0, 0, 0],
            }
        }
        (true, None) => {
            let mut k = [0u8; 5];
            k.copy_from_slice(&ranks);
            return HandRank {
                category: Category::Flush,
                kickers: k,
            };
        }
        (false, Some(high)) => {
            return HandRank {
                category: Category::Straight,
                kickers: [high, 0, 0, 0, 0],
            }
        }
        _ => {}
    }

    // group by multiplicity, larger groups first, then higher rank
    let mut groups: Vec<(u8, u8)> = Vec::with_capacity(5);
    for &r in &ranks {
        match groups.iter_mut().find(|(rank, _)| *rank == r) {
            Some((_, n)) => *n += 1,
            None => groups.push((r, 1)),
        }
    }
    groups.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    let mut k = [0u8; 5];
    for (slot, (rank, _)) in k.iter_mut().zip(groups.iter()) {
        *slot = *rank;
    }
    let category = match (groups[0].1, groups.get(1).map(|g| g.1)) {
        (4, _) => Category::FourOfAKind,
        (3, Some(2)) => Category::FullHouse,
        (3, _) => Category::ThreeOfAKind,
        (2, Some(2)) => Category::TwoPair,
        (2, _) => Category::OnePair,
        _ => Category::HighCard,
    };
    HandRank { category, kickers: k }
}

pub fn compare_hands(a: &HandRank, b: &HandRank) -> Ordering {
    a.cmp(b)
}

fn check_input(cards: &[Card]) -> Result<(), GameError> {
    if !(5..=7).contains(&cards.len()) {
        return Err(GameError::InvalidHandSize { count: cards.len() });
    }
    let mut seen = HashSet::with_capacity(cards.len());
    for &c in cards {
        if !seen.insert(c) {
            return Err(GameError::DuplicateCard(c));
        }
    }
    Ok(())
}

/// Rank-pattern evaluation for 5..=7 distinct cards. Callers guarantee the input.
pub(crate) fn evaluate_unchecked(cards: &[Card]) -> HandRank {
    // Count ranks and suits
    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut by_suit_mask: [u16; 4] = [0; 4];
    let mut suit_counts = [0u8; 4];
    let mut rank_mask: u16 = 0;
    for &c in cards.iter() {
        let r = rank_val(c.rank);
        rank_counts[r as usize] += 1;
        let s = suit_index(c.suit);
        suit_counts[s] += 1;
        by_suit_mask[s] |= 1u16 << r;
        rank_mask |= 1u16 << r;
    }

    let flush_suit = suit_counts.iter().position(|&n| n >= 5);

    // Straight flush
    if let Some(s) = flush_suit {
        if let Some(high) = straight_high_from_mask(by_suit_mask[s]) {
            return HandRank {
                category: Category::StraightFlush,
                kickers: [high, 0, 0, 0, 0],
            };
        }
    }

    // Four of a kind
    if let Some((quad, kicker)) = detect_quads(&rank_counts) {
        return HandRank {
            category: Category::FourOfAKind,
            kickers: [quad, kicker, 0, 0, 0],
        };
    }

    // Full house
    if let Some((trip, pair)) = detect_full_house(&rank_counts) {
        return HandRank {
            category: Category::FullHouse,
            kickers: [trip, pair, 0, 0, 0],
        };
    }

    // Flush: five highest cards of the suit
    if let Some(s) = flush_suit {
        let mut k = [0u8; 5];
        let mut i = 0;
        for r in (2..=14u8).rev() {
            if i < 5 && by_suit_mask[s] & (1 << r) != 0 {
                k[i] = r;
                i += 1;
            }
        }
        return HandRank {
            category: Category::Flush,
            kickers: k,
        };
    }

    if let Some(high) = straight_high_from_mask(rank_mask) {
        return HandRank {
            category: Category::Straight,
            kickers: [high, 0, 0, 0, 0],
        };
    }

    // Three / Two pair / One pair / High card
    let (trip_ranks, pair_ranks, singles) = classify_multiples(&rank_counts);
    if let Some(t) = trip_ranks.first().copied() {
        // trips + two highest kickers
        let rest = descending_except(&rank_counts, &[t]);
        return HandRank {
            category: Category::ThreeOfAKind,
            kickers: [t, rest[0], rest[1], 0, 0],
        };
    }
    if pair_ranks.len() >= 2 {
        let high = pair_ranks[0];
        let low = pair_ranks[1];
        // a third pair can still supply the kicker
        let rest = descending_except(&rank_counts, &[high, low]);
        return HandRank {
            category: Category::TwoPair,
            kickers: [high, low, rest[0], 0, 0],
        };
    }
    if let Some(p) = pair_ranks.first().copied() {
        let rest = descending_except(&rank_counts, &[p]);
        return HandRank {
            category: Category::OnePair,
            kickers: [p, rest[0], rest[1], rest[2], 0],
        };
    }

    // High card: top 5 ranks
    let mut k = [0u8; 5];
    for (item, r) in k.iter_mut().zip(singles.iter()) {
        *item = *r;
    }
    HandRank {
        category: Category::HighCard,
        kickers: k,
    }
}

fn rank_val(r: Rank) -> u8 {
    r as u8
}

fn suit_index(s: Suit) -> usize {
    s.index()
}

/// High card of a straight in a descending rank list of exactly five cards.
fn detect_straight_high(desc: &[u8]) -> Option<u8> {
    let mut mask = 0u16;
    for &r in desc {
        mask |= 1 << r;
    }
    if mask.count_ones() != 5 {
        return None;
    }
    straight_high_from_mask(mask)
}

fn straight_high_from_mask(mask: u16) -> Option<u8> {
    // Treat Ace as 14 and optionally as 1
    let mut m = mask;
    if (m & (1 << 14)) != 0 {
        m |= 1 << 1;
    }
    // Sliding 5-bit window from Ace(14) down to 5
    for high in (5..=14u8).rev() {
        let window = 0b11111u16 << (high - 4);
        if (m & window) == window {
            return Some(high);
        }
    }
    None
}

fn detect_quads(rank_counts: &[u8; 15]) -> Option<(u8, u8)> {
    let quad = (2..=14u8).rev().find(|&r| rank_counts[r as usize] == 4)?;
    let kicker = (2..=14u8)
        .rev()
        .find(|&r| r != quad && rank_counts[r as usize] > 0)
        .unwrap_or(0);
    Some((quad, kicker))
}

fn detect_full_house(rank_counts: &[u8; 15]) -> Option<(u8, u8)> {
    let mut trips: Vec<u8> = vec![];
    let mut pairs: Vec<u8> = vec![];
    for r in (2..=14u8).rev() {
        match rank_counts[r as usize] {
            3 => trips.push(r),
            2 => pairs.push(r),
            _ => {}
        }
    }
    let t = *trips.first()?;
    // second trips plays as the pair when it outranks every pair
    let pair = trips
        .get(1)
        .copied()
        .into_iter()
        .chain(pairs.first().copied())
        .max()?;
    Some((t, pair))
}

/// Ranks grouped by multiplicity, each list descending.
fn classify_multiples(rank_counts: &[u8; 15]) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let mut trips = vec![];
    let mut pairs = vec![];
    let mut singles = vec![];
    for r in (2..=14u8).rev() {
        match rank_counts[r as usize] {
            3 => trips.push(r),
            2 => pairs.push(r),
            1 => singles.push(r),
            _ => {}
        }
    }
    (trips, pairs, singles)
}

/// Distinct ranks present, descending, skipping `used`; padded with zeros.
fn descending_except(rank_counts: &[u8; 15], used: &[u8]) -> [u8; 5] {
    let mut out = [0u8; 5];
    let mut i = 0;
    for r in (2..=14u8).rev() {
        if i == 5 {
            break;
        }
        if rank_counts[r as usize] > 0 && !used.contains(&r) {
            out[i] = r;
            i += 1;
        }
    }
    out
}
