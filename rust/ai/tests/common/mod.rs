#![allow(dead_code)]

use tiltbench_engine::agent::FixedPolicy;
use tiltbench_engine::cards::{parse_cards, Card};
use tiltbench_engine::config::{GameConfig, SeatConfig};
use tiltbench_engine::events::{DecisionEvent, HandRecord};
use tiltbench_engine::observation::Profile;
use tiltbench_engine::script::ScriptedDeal;
use tiltbench_engine::state::Street;
use tiltbench_engine::table::{ai, Table};

pub fn two(s: &str) -> [Card; 2] {
    let v = parse_cards(s).unwrap();
    [v[0], v[1]]
}

/// Heads-up hand: seat 0 min-raises every street, seat 1 checks and calls.
pub fn scripted_hand(hero: &str, villain: &str, board: &str) -> HandRecord {
    let mut config = GameConfig::new(vec![
        SeatConfig::ai("raiser", Profile::default()),
        SeatConfig::ai("caller", Profile::default()),
    ]);
    config.seed = Some(11);
    config.decision_timeout_ms = None;
    let controllers = vec![ai(FixedPolicy::AlwaysRaise), ai(FixedPolicy::CheckOrCall)];
    let mut table = Table::new(config, controllers, None).unwrap();
    table.script_next_hand(
        ScriptedDeal::new()
            .seat(0, two(villain))
            .seat(1, two(hero))
            .board(&parse_cards(board).unwrap()),
    );
    table.play_hand().unwrap().clone()
}

/// Seat 1 holding the nuts on the river, facing a bet.
pub fn river_call_with_nuts() -> DecisionEvent {
    let record = scripted_hand("AhKh", "7c2d", "QhJhTh2c3d");
    record
        .events
        .into_iter()
        .find(|e| e.seat == 1 && e.street == Street::River && e.legal.call.is_some())
        .unwrap()
}
