mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::RandomLegal;
use tiltbench_engine::agent::{Controller, FixedPolicy, Strategy};
use tiltbench_engine::cards::{parse_cards, Card};
use tiltbench_engine::config::{GameConfig, SeatConfig, StackPolicy};
use tiltbench_engine::errors::GameError;
use tiltbench_engine::hand::Category;
use tiltbench_engine::observation::{Observation, Profile};
use tiltbench_engine::pot::Rake;
use tiltbench_engine::rules::Action;
use tiltbench_engine::script::ScriptedDeal;
use tiltbench_engine::state::Street;
use tiltbench_engine::table::{ai, Table};

fn ai_config(seats: usize, seed: u64) -> GameConfig {
    let mut config = GameConfig::new(
        (0..seats)
            .map(|i| SeatConfig::ai(format!("bot{}", i), Profile::default()))
            .collect(),
    );
    config.seed = Some(seed);
    config.decision_timeout_ms = None;
    config
}

fn random_table(seats: usize, seed: u64) -> Table {
    let controllers = (0..seats)
        .map(|i| ai(RandomLegal::new(seed * 31 + i as u64)))
        .collect();
    Table::new(ai_config(seats, seed), controllers, None).unwrap()
}

#[test]
fn fold_to_big_blind_ends_without_evaluation() {
    let controllers: Vec<Controller> = vec![
        ai(FixedPolicy::CheckOrFold),
        ai(FixedPolicy::CheckOrFold),
        ai(FixedPolicy::CheckOrFold),
    ];
    let mut table = Table::new(ai_config(3, 1), controllers, None).unwrap();
    let record = table.play_hand().unwrap().clone();

    // Button 0 and small blind 1 fold; big blind 2 collects.
    assert_eq!(record.events.len(), 2);
    assert_eq!(record.evaluator_calls, 0);
    assert!(record.showdown.is_none());
    assert!(record.board.is_empty());
    assert_eq!(record.final_stacks, vec![1000, 995, 1005]);
    assert_eq!(record.final_street, Street::Complete);
}

#[test]
fn chips_are_conserved_across_random_hands() {
    for seats in [2usize, 3, 6, 9] {
        let mut table = random_table(seats, seats as u64 + 100);
        let total = 1000 * seats as u32;
        let played = table.run(150).unwrap();
        assert!(played > 0);
        for record in table.hands() {
            let start: u32 = record.starting_stacks.iter().sum();
            let end: u32 = record.final_stacks.iter().sum();
            assert_eq!(start, total);
            assert_eq!(end + record.rake, start, "hand {}", record.hand_id);
            assert_eq!(record.final_street, Street::Complete);
            assert_eq!(
                record.events.len(),
                record.actions.len(),
                "one event per applied action"
            );
        }
    }
}

#[test]
fn rake_only_after_flop_and_capped() {
    let mut config = ai_config(4, 77);
    config.rake = Rake {
        basis_points: 500,
        cap: 15,
    };
    config.stack_policy = StackPolicy::Restock;
    let controllers = (0..4).map(|i| ai(RandomLegal::new(900 + i))).collect();
    let mut table = Table::new(config, controllers, None).unwrap();
    table.run(80).unwrap();
    assert_eq!(table.hands().len(), 80);
    let mut raked = 0;
    for record in table.hands() {
        assert!(record.rake <= 15);
        if record.board.is_empty() {
            assert_eq!(record.rake, 0, "no flop, no drop");
        }
        if record.rake > 0 {
            raked += 1;
        }
        let start: u32 = record.starting_stacks.iter().sum();
        let end: u32 = record.final_stacks.iter().sum();
        assert_eq!(end + record.rake, start);
    }
    assert!(raked > 0);
}

#[test]
fn same_seed_replays_identically() {
    let run = || {
        let mut t = random_table(4, 555);
        t.run(30).unwrap();
        t.hands()
            .iter()
            .map(|h| (h.board.clone(), h.actions.clone(), h.final_stacks.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

fn two(s: &str) -> [Card; 2] {
    let v = parse_cards(s).unwrap();
    [v[0], v[1]]
}

#[test]
fn scripted_hand_uses_fixed_cards_once() {
    let controllers = vec![ai(FixedPolicy::CheckOrCall), ai(FixedPolicy::CheckOrCall)];
    let mut table = Table::new(ai_config(2, 3), controllers, None).unwrap();
    table.script_next_hand(
        ScriptedDeal::new()
            .seat(0, two("AsAh"))
            .seat(1, two("KsKh"))
            .board(&parse_cards("2c7d9hJs3c").unwrap()),
    );
    let record = table.play_hand().unwrap().clone();
    assert!(record.scripted);
    assert!(record.events.iter().all(|e| e.scripted));
    assert_eq!(record.hole_cards[0], Some(two("AsAh")));
    assert_eq!(record.hole_cards[1], Some(two("KsKh")));
    assert_eq!(record.board, parse_cards("2c7d9hJs3c").unwrap());
    let showdown = record.showdown.as_ref().unwrap();
    assert!(showdown
        .hands
        .iter()
        .all(|h| h.rank.category == Category::OnePair));
    assert_eq!(record.pots[0].winners, vec![0]);
    assert_eq!(record.evaluator_calls, 2);

    let next = table.play_hand().unwrap();
    assert!(!next.scripted);
}

#[test]
fn busted_seats_end_a_carry_session() {
    let controllers = vec![ai(FixedPolicy::AlwaysRaise), ai(RandomLegal::new(4))];
    let mut config = ai_config(2, 8);
    config.starting_stack = 100;
    let mut table = Table::new(config, controllers, None).unwrap();
    let played = table.run(10_000).unwrap();
    assert!(played < 10_000);
    let stacks = table.stacks();
    assert!(stacks.contains(&0));
    assert_eq!(stacks.iter().sum::<u32>(), 200);
}

#[test]
fn cancelled_table_refuses_new_hands() {
    let mut table = random_table(3, 12);
    table.play_hand().unwrap();
    let before = table.stacks();
    table.cancel_token().cancel();
    assert!(matches!(table.play_hand(), Err(GameError::Cancelled)));
    assert_eq!(table.stacks(), before);
    assert_eq!(table.hands().len(), 1);
}

#[test]
fn actions_are_broadcast_in_table_order() {
    let mut table = random_table(3, 21);
    let record = table.play_hand().unwrap();
    let seqs: Vec<u32> = record.events.iter().map(|e| e.sequence).collect();
    assert_eq!(seqs, (0..record.events.len() as u32).collect::<Vec<_>>());
    for (event, action) in record.events.iter().zip(&record.actions) {
        assert_eq!(event.seat, action.seat);
        assert_eq!(event.applied, action.action);
        assert_ne!(event.applied, Action::Call(0));
    }
}

struct ResetCounter(Arc<AtomicUsize>);

impl Strategy for ResetCounter {
    fn name(&self) -> &str {
        "reset-counter"
    }

    fn decide(&mut self, obs: &Observation) -> Action {
        obs.legal.passive()
    }

    fn reset_session(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn strategies_reset_once_when_the_table_opens() {
    let resets = Arc::new(AtomicUsize::new(0));
    let controllers = (0..3)
        .map(|_| ai(ResetCounter(Arc::clone(&resets))))
        .collect();
    let mut table = Table::new(ai_config(3, 12), controllers, None).unwrap();
    assert_eq!(resets.load(Ordering::SeqCst), 3);
    table.run(4).unwrap();
    assert_eq!(resets.load(Ordering::SeqCst), 3);
}
