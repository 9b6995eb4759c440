use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::hand::HandRank;

/// One tier of the pot: main pot first, side pots after.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PotLayer {
    pub amount: u32,
    /// Contribution level closing this tier
    pub threshold: u32,
    /// Seats that can win this tier, ascending
    pub eligible: Vec<usize>,
}

impl PotLayer {
    /// A tier only one player reached is an uncalled bet.
    pub fn is_uncalled(&self) -> bool {
        self.eligible.len() == 1
    }
}

/// What a seat put in over the hand, and whether it is still contesting.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Contribution {
    pub seat: usize,
    pub amount: u32,
    pub folded: bool,
}

/// Partition hand contributions into pot layers.
///
/// Each distinct contribution level among non-folded players closes a tier.
/// Folded chips are dead money inside the tiers they reached.
///
/// ```
/// use tiltbench_engine::pot::{build_layers, Contribution};
///
/// let layers = build_layers(&[
///     Contribution { seat: 0, amount: 50, folded: false },
///     Contribution { seat: 1, amount: 200, folded: false },
///     Contribution { seat: 2, amount: 200, folded: false },
///     Contribution { seat: 3, amount: 80, folded: true },
/// ]);
/// assert_eq!(layers.len(), 2);
/// assert_eq!(layers[0].amount, 200);
/// assert_eq!(layers[0].eligible, vec![0, 1, 2]);
/// assert_eq!(layers[1].amount, 330);
/// assert_eq!(layers[1].eligible, vec![1, 2]);
/// ```
pub fn build_layers(contributions: &[Contribution]) -> Vec<PotLayer> {
    let mut levels: Vec<u32> = contributions
        .iter()
        .filter(|c| !c.folded && c.amount > 0)
        .map(|c| c.amount)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut layers = Vec::with_capacity(levels.len());
    let mut prev = 0u32;
    for &level in &levels {
        let amount: u32 = contributions
            .iter()
            .map(|c| c.amount.min(level) - c.amount.min(prev))
            .sum();
        let mut eligible: Vec<usize> = contributions
            .iter()
            .filter(|c| !c.folded && c.amount >= level)
            .map(|c| c.seat)
            .collect();
        eligible.sort_unstable();
        layers.push(PotLayer {
            amount,
            threshold: level,
            eligible,
        });
        prev = level;
    }

    // Dead chips above every live level belong to the top tier.
    let overflow: u32 = contributions
        .iter()
        .map(|c| c.amount.saturating_sub(prev))
        .sum();
    if let Some(top) = layers.last_mut() {
        top.amount += overflow;
    }
    layers
}

/// Seats in clockwise order starting left of the button.
pub fn clockwise_from_button(button: usize, seats: usize) -> Vec<usize> {
    (1..=seats).map(|i| (button + i) % seats).collect()
}

/// Split `amount` evenly; odd chips go one at a time in `order`.
///
/// `winners` may be in any order; only seats present in `order` receive chips.
pub fn split_amount(amount: u32, winners: &[usize], order: &[usize]) -> Vec<(usize, u32)> {
    let ordered: Vec<usize> = order
        .iter()
        .copied()
        .filter(|s| winners.contains(s))
        .collect();
    if ordered.is_empty() {
        return Vec::new();
    }
    let n = ordered.len() as u32;
    let base = amount / n;
    let remainder = (amount % n) as usize;
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, seat)| (seat, base + u32::from(i < remainder)))
        .collect()
}

/// Settlement of one layer.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PotResult {
    pub amount: u32,
    pub eligible: Vec<usize>,
    pub winners: Vec<usize>,
    pub shares: Vec<(usize, u32)>,
    /// Returned to its only contributor rather than won
    pub uncalled: bool,
}

/// Award every layer to the best rank among its eligible seats.
///
/// Layers with a single eligible seat need no rank. A contested layer whose
/// eligible seats have no entry in `ranks` is returned unawarded (empty
/// winners) so the caller can detect the inconsistency.
pub fn award_layers(
    layers: &[PotLayer],
    ranks: &HashMap<usize, HandRank>,
    order: &[usize],
) -> Vec<PotResult> {
    layers
        .iter()
        .map(|layer| {
            if layer.is_uncalled() {
                let seat = layer.eligible[0];
                return PotResult {
                    amount: layer.amount,
                    eligible: layer.eligible.clone(),
                    winners: vec![seat],
                    shares: vec![(seat, layer.amount)],
                    uncalled: true,
                };
            }
            let best = layer.eligible.iter().filter_map(|s| ranks.get(s)).max();
            let winners: Vec<usize> = match best {
                Some(best) => layer
                    .eligible
                    .iter()
                    .copied()
                    .filter(|s| ranks.get(s) == Some(best))
                    .collect(),
                None => Vec::new(),
            };
            PotResult {
                amount: layer.amount,
                eligible: layer.eligible.clone(),
                shares: split_amount(layer.amount, &winners, order),
                winners,
                uncalled: false,
            }
        })
        .collect()
}

/// Rake charged on a hand that saw a flop.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Rake {
    /// Percentage in hundredths of a percent (500 = 5%)
    pub basis_points: u32,
    pub cap: u32,
}

impl Rake {
    pub fn is_zero(&self) -> bool {
        self.basis_points == 0 || self.cap == 0
    }
}

/// Remove rake from contested layers, main pot first. Returns chips taken.
pub fn take_rake(layers: &mut [PotLayer], rake: &Rake) -> u32 {
    if rake.is_zero() {
        return 0;
    }
    let contested: u64 = layers
        .iter()
        .filter(|l| !l.is_uncalled())
        .map(|l| u64::from(l.amount))
        .sum();
    let due = (contested * u64::from(rake.basis_points) / 10_000).min(u64::from(rake.cap));
    let mut remaining = due as u32;
    for layer in layers.iter_mut().filter(|l| !l.is_uncalled()) {
        let cut = remaining.min(layer.amount);
        layer.amount -= cut;
        remaining -= cut;
        if remaining == 0 {
            break;
        }
    }
    due as u32 - remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;
    use crate::hand::evaluate;

    fn c(seat: usize, amount: u32, folded: bool) -> Contribution {
        Contribution {
            seat,
            amount,
            folded,
        }
    }

    #[test]
    fn uncalled_top_tier_is_its_own_layer() {
        let layers = build_layers(&[c(0, 300, false), c(1, 100, false)]);
        assert_eq!(layers.len(), 2);
        assert!(!layers[0].is_uncalled());
        assert!(layers[1].is_uncalled());
        assert_eq!(layers[1].amount, 200);
    }

    #[test]
    fn folded_overflow_lands_in_top_layer() {
        let layers = build_layers(&[c(0, 40, false), c(1, 60, true)]);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].amount, 100);
        assert_eq!(layers[0].eligible, vec![0]);
    }

    #[test]
    fn odd_chip_goes_left_of_button_first() {
        // Button at seat 1: clockwise order is 2, 0, 1.
        let order = clockwise_from_button(1, 3);
        assert_eq!(order, vec![2, 0, 1]);
        let shares = split_amount(101, &[0, 2], &order);
        assert_eq!(shares, vec![(2, 51), (0, 50)]);
    }

    #[test]
    fn tie_splits_and_side_pot_goes_to_better_covering_hand() {
        let board = parse_cards("2c7d9hJsKd").unwrap();
        let hand = |h: &str| {
            let mut cards = parse_cards(h).unwrap();
            cards.extend_from_slice(&board);
            evaluate(&cards).unwrap()
        };
        let mut ranks = HashMap::new();
        ranks.insert(0, hand("AhQh"));
        ranks.insert(1, hand("AsQs"));
        ranks.insert(2, hand("3c4c"));
        let layers = build_layers(&[c(0, 50, false), c(1, 150, false), c(2, 150, false)]);
        let results = award_layers(&layers, &ranks, &[1, 2, 0]);
        assert_eq!(results[0].winners, vec![0, 1]);
        assert_eq!(results[0].shares, vec![(1, 75), (0, 75)]);
        assert_eq!(results[1].winners, vec![1]);
        assert_eq!(results[1].shares, vec![(1, 200)]);
    }

    #[test]
    fn rake_respects_cap_and_skips_uncalled() {
        let mut layers = build_layers(&[c(0, 1000, false), c(1, 500, false)]);
        let taken = take_rake(
            &mut layers,
            &Rake {
                basis_points: 500,
                cap: 30,
            },
        );
        assert_eq!(taken, 30);
        assert_eq!(layers[0].amount, 970);
        assert_eq!(layers[1].amount, 500);
    }
}
