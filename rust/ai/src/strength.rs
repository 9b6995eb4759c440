//! Hand strength on a 0-10 scale, shared by the heuristic and GTO bucketing.

use tiltbench_engine::cards::Card;
use tiltbench_engine::hand::{evaluate, Category, HandRank};

/// Drawing potential on the flop or turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Draws {
    pub flush_draw: bool,
    pub open_ended: bool,
    pub gutshot: bool,
}

impl Draws {
    pub fn any(&self) -> bool {
        self.flush_draw || self.open_ended || self.gutshot
    }

    /// Rough outs count used to scale the draw bonus.
    pub fn outs(&self) -> u8 {
        let mut outs = 0;
        if self.flush_draw {
            outs += 9;
        }
        if self.open_ended {
            outs += 8;
        } else if self.gutshot {
            outs += 4;
        }
        outs.min(15)
    }
}

/// Strength of two hole cards before the flop.
///
/// - 9-10: premium (AA-JJ, AKs)
/// - 7-8: strong (TT-99, AK, AQ, KQs)
/// - 5-6: medium (88-77, AJ, suited connectors)
/// - 3-4: marginal (66-22, Ax, suited broadway)
/// - 0-2: weak
pub fn preflop_strength(hole: [Card; 2]) -> u8 {
    let r1 = hole[0].rank.value();
    let r2 = hole[1].rank.value();
    let (high, low) = if r1 >= r2 { (r1, r2) } else { (r2, r1) };
    let suited = hole[0].suit == hole[1].suit;
    let pick = |s: u8, o: u8| if suited { s } else { o };

    if high == low {
        return match high {
            13..=14 => 10,
            11..=12 => 9,
            10 => 8,
            9 => 7,
            8 => 6,
            7 => 5,
            _ => 4,
        };
    }
    match (high, low) {
        (14, 13) => pick(10, 8),
        (14, 12) => pick(8, 7),
        (14, 11) => pick(7, 6),
        (14, 10) => pick(6, 5),
        (14, _) => pick(5, 3),
        (13, 12) => pick(7, 6),
        (13, 11) => pick(6, 5),
        (13, 10) => pick(5, 4),
        (12, 11) => pick(6, 5),
        (12, 10) => pick(5, 4),
        _ if suited && high - low <= 2 => {
            if high >= 9 {
                5
            } else {
                4
            }
        }
        _ if high >= 11 && low >= 9 => 4,
        _ if high - low == 1 && low >= 5 => 3,
        _ => 2,
    }
}

fn category_base(category: Category) -> u8 {
    match category {
        Category::HighCard => 1,
        Category::OnePair => 3,
        Category::TwoPair => 5,
        Category::ThreeOfAKind => 6,
        Category::Straight => 7,
        Category::Flush => 8,
        Category::FullHouse => 9,
        Category::FourOfAKind | Category::StraightFlush => 10,
    }
}

/// Rank of a complete five-card board.
fn board_rank(board: &[Card]) -> Option<HandRank> {
    if board.len() == 5 {
        return evaluate(board).ok();
    }
    None
}

/// Category the board makes by rank multiplicity alone.
fn board_pairing(board: &[Card]) -> Category {
    let mut counts = [0u8; 15];
    for c in board {
        counts[c.rank.value() as usize] += 1;
    }
    let max = counts.iter().copied().max().unwrap_or(0);
    let pairs = counts.iter().filter(|&&n| n == 2).count();
    match (max, pairs) {
        (4, _) => Category::FourOfAKind,
        (3, p) if p > 0 => Category::FullHouse,
        (3, _) => Category::ThreeOfAKind,
        (2, p) if p >= 2 => Category::TwoPair,
        (2, _) => Category::OnePair,
        _ => Category::HighCard,
    }
}

pub fn draws(hole: [Card; 2], board: &[Card]) -> Draws {
    if board.len() < 3 || board.len() >= 5 {
        return Draws::default();
    }
    let mut suit_counts = [0u8; 4];
    let mut hole_suits = [false; 4];
    let mut mask: u16 = 0;
    for c in hole.iter().chain(board) {
        suit_counts[c.suit.index()] += 1;
        mask |= 1 << c.rank.value();
    }
    for c in &hole {
        hole_suits[c.suit.index()] = true;
    }
    if mask & (1 << 14) != 0 {
        mask |= 1 << 1;
    }
    let flush_draw = (0..4).any(|s| suit_counts[s] == 4 && hole_suits[s]);

    let mut open_ended = false;
    let mut gutshot = false;
    for low in 1..=10u8 {
        let window = (0..5).filter(|i| mask & (1 << (low + i)) != 0).count();
        if window == 4 {
            let ends_missing = mask & (1 << low) == 0 || mask & (1 << (low + 4)) == 0;
            if ends_missing && low > 1 && low < 10 {
                open_ended = true;
            } else {
                gutshot = true;
            }
        }
    }
    Draws {
        flush_draw,
        open_ended,
        gutshot: gutshot && !open_ended,
    }
}

/// Made-hand strength after the flop, 0-10, plus a draw bonus.
///
/// A hand that only plays the board's own pairing scores as high card.
pub fn postflop_strength(hole: [Card; 2], board: &[Card]) -> Option<u8> {
    if board.len() < 3 {
        return None;
    }
    let mut cards = Vec::with_capacity(7);
    cards.extend_from_slice(&hole);
    cards.extend_from_slice(board);
    let rank = evaluate(&cards).ok()?;

    let plays_board = match board_rank(board) {
        Some(b) => b == rank,
        None => rank.category == board_pairing(board) && rank.category != Category::HighCard,
    };
    let mut score = if plays_board {
        1
    } else {
        category_base(rank.category)
    };
    if !plays_board && rank.kickers[0] >= 12 && score < 10 {
        score += 1;
    }
    let d = draws(hole, board);
    if score < 6 {
        score += match d.outs() {
            12.. => 3,
            8..=11 => 2,
            4..=7 => 1,
            _ => 0,
        };
    }
    Some(score.min(10))
}

/// Best available strength for the street.
pub fn strength(hole: [Card; 2], board: &[Card]) -> u8 {
    postflop_strength(hole, board).unwrap_or_else(|| preflop_strength(hole))
}

/// Strength bucket in `0..buckets`.
pub fn bucket(hole: [Card; 2], board: &[Card], buckets: u8) -> u8 {
    let s = strength(hole, board) as u16;
    ((s * buckets as u16) / 11).min(buckets as u16 - 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiltbench_engine::cards::parse_cards;

    fn two(s: &str) -> [Card; 2] {
        let v = parse_cards(s).unwrap();
        [v[0], v[1]]
    }

    #[test]
    fn preflop_table_orders_classic_hands() {
        assert_eq!(preflop_strength(two("AhAs")), 10);
        assert_eq!(preflop_strength(two("AhKh")), 10);
        assert_eq!(preflop_strength(two("AhKs")), 8);
        assert!(preflop_strength(two("7h2s")) <= 2);
        assert!((4..=6).contains(&preflop_strength(two("9h8h"))));
    }

    #[test]
    fn board_pair_alone_is_weak() {
        let board = parse_cards("KdKc7s").unwrap();
        let s = postflop_strength(two("2h3c"), &board).unwrap();
        assert!(s <= 2, "got {}", s);
        let trips = postflop_strength(two("Kh3c"), &board).unwrap();
        assert!(trips >= 6);
    }

    #[test]
    fn draws_are_detected() {
        let board = parse_cards("9h8h2c").unwrap();
        let d = draws(two("AhTh"), &board);
        assert!(d.flush_draw);
        let d = draws(two("TcJd"), &board);
        assert!(d.open_ended);
        assert!(!d.flush_draw);
        assert!(postflop_strength(two("AhTh"), &board).unwrap() >= 3);
    }

    #[test]
    fn buckets_stay_in_range() {
        assert_eq!(bucket(two("AhAs"), &[], 6), 5);
        assert_eq!(bucket(two("7h2s"), &[], 6), 1);
    }
}
