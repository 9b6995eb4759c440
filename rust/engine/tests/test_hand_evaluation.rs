use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tiltbench_engine::cards::{full_deck, parse_cards};
use tiltbench_engine::errors::GameError;
use tiltbench_engine::hand::{best_five, compare_hands, evaluate, evaluate_exhaustive, Category};

fn rank(s: &str) -> tiltbench_engine::hand::HandRank {
    evaluate(&parse_cards(s).unwrap()).unwrap()
}

#[test]
fn reference_hands_rank_in_category_order() {
    let ladder = [
        ("2c5d9hJsKd", Category::HighCard),
        ("2c2d9hJsKd", Category::OnePair),
        ("2c2d9h9sKd", Category::TwoPair),
        ("2c2d2h9sKd", Category::ThreeOfAKind),
        ("5c6d7h8s9d", Category::Straight),
        ("2h5h9hJhKh", Category::Flush),
        ("2c2d2h9s9d", Category::FullHouse),
        ("2c2d2h2s9d", Category::FourOfAKind),
        ("5h6h7h8h9h", Category::StraightFlush),
    ];
    let ranks: Vec<_> = ladder.iter().map(|(s, _)| rank(s)).collect();
    for ((_, cat), r) in ladder.iter().zip(&ranks) {
        assert_eq!(r.category, *cat);
    }
    for pair in ranks.windows(2) {
        assert!(compare_hands(&pair[1], &pair[0]).is_gt());
    }
}

#[test]
fn wheel_is_lowest_straight_but_beats_trips() {
    let wheel = rank("As2d3c4h5s");
    let six_high = rank("2d3c4h5s6d");
    let trips = rank("AcAdAhKsQd");
    assert!(wheel < six_high);
    assert!(wheel > trips);
    assert_eq!(wheel.kickers[0], 5);

    let steel_wheel = rank("Ah2h3h4h5h");
    let six_high_sf = rank("2h3h4h5h6h");
    assert_eq!(steel_wheel.category, Category::StraightFlush);
    assert!(steel_wheel < six_high_sf);
}

#[test]
fn kickers_break_ties_in_significance_order() {
    assert!(rank("AcAdKh7s2d") > rank("AhAsQh7c2c"));
    assert!(rank("KcKd5h5s9d") > rank("KhKs4h4c9c"));
    assert!(rank("KcKd5h5sAd") > rank("KhKs5d5cQc"));
    assert_eq!(
        rank("AcKdQh9s7d"),
        rank("AhKsQd9c7c"),
        "suits never break ties"
    );
}

#[test]
fn best_of_seven_picks_highest_subset() {
    let cards = parse_cards("AhKhQhJh9h2c3d").unwrap();
    let (five, r) = best_five(&cards).unwrap();
    assert_eq!(r.category, Category::Flush);
    assert!(five.iter().all(|c| c.suit == cards[0].suit));
}

#[test]
fn shortcut_agrees_with_brute_force_on_random_hands() {
    let mut rng = ChaCha8Rng::seed_from_u64(20260101);
    let mut deck = full_deck();
    for i in 0..5_000 {
        deck.shuffle(&mut rng);
        let n = 5 + i % 3;
        let hand = &deck[..n];
        assert_eq!(
            evaluate(hand).unwrap(),
            evaluate_exhaustive(hand).unwrap(),
            "mismatch on {:?}",
            hand
        );
    }
}

#[test]
fn rejects_bad_input() {
    let four = parse_cards("AhKhQhJh").unwrap();
    assert_eq!(
        evaluate(&four),
        Err(GameError::InvalidHandSize { count: 4 })
    );
    let eight = parse_cards("AhKhQhJhTh9h8h7h").unwrap();
    assert!(matches!(
        evaluate(&eight),
        Err(GameError::InvalidHandSize { count: 8 })
    ));
    let dup = parse_cards("AhAhQhJhTh").unwrap();
    assert!(matches!(evaluate(&dup), Err(GameError::DuplicateCard(_))));
}
