mod common;

use common::{capture_logs, Sleepy, Stubborn};
use tiltbench_engine::agent::FixedPolicy;
use tiltbench_engine::config::{GameConfig, SeatConfig};
use tiltbench_engine::errors::GameError;
use tiltbench_engine::events::Recovery;
use tiltbench_engine::observation::Profile;
use tiltbench_engine::rules::Action;
use tiltbench_engine::table::{ai, Table};
use tracing::Level;

fn heads_up(seed: u64, timeout_ms: Option<u64>) -> GameConfig {
    let mut config = GameConfig::new(vec![
        SeatConfig::ai("a", Profile::default()),
        SeatConfig::ai("b", Profile::default()),
    ]);
    config.seed = Some(seed);
    config.decision_timeout_ms = timeout_ms;
    config
}

#[test]
fn illegal_check_becomes_fold_with_one_warning() {
    let (record, logs) = capture_logs(|| {
        let controllers = vec![ai(Stubborn(Action::Check)), ai(FixedPolicy::CheckOrCall)];
        let mut table = Table::new(heads_up(1, None), controllers, None).unwrap();
        table.play_hand().unwrap().clone()
    });

    // The button faces the big blind, so Check is illegal and Fold is substituted.
    let first = &record.events[0];
    assert_eq!(first.requested, Action::Check);
    assert_eq!(first.applied, Action::Fold);
    assert!(matches!(first.recovery, Some(Recovery::IllegalAction { .. })));

    let warnings: Vec<_> = logs
        .iter()
        .filter(|e| e.field("kind") == Some("IllegalAction"))
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].level, Level::WARN);
    assert_eq!(warnings[0].target, "tiltbench_engine::table");
}

#[test]
fn illegal_action_substitutes_check_when_available() {
    let controllers = vec![ai(FixedPolicy::CheckOrCall), ai(Stubborn(Action::Call(999)))];
    let mut table = Table::new(heads_up(2, None), controllers, None).unwrap();
    let record = table.play_hand().unwrap();
    // Big blind after a limp may check; its bogus call becomes a check.
    let bb = record.events.iter().find(|e| e.seat == 1).unwrap();
    assert_eq!(bb.applied, Action::Check);
    assert!(bb.recovery.is_some());
    assert_eq!(record.final_stacks.iter().sum::<u32>(), 2000);
}

#[test]
fn slow_strategy_times_out_to_minimal_action() {
    let (record, logs) = capture_logs(|| {
        let controllers = vec![ai(Sleepy(40)), ai(FixedPolicy::CheckOrCall)];
        let mut table = Table::new(heads_up(3, Some(5)), controllers, None).unwrap();
        table.play_hand().unwrap().clone()
    });
    let first = &record.events[0];
    assert_eq!(first.applied, Action::Fold);
    assert!(first.latency_ms >= 40);
    assert!(matches!(
        first.recovery,
        Some(Recovery::StrategyTimeout { budget_ms: 5, .. })
    ));
    assert!(logs
        .iter()
        .any(|e| e.field("kind") == Some("StrategyTimeout")));
    assert_eq!(first.observation.time_budget_ms, Some(5));
}

#[test]
fn oversized_raise_is_clamped_to_all_in() {
    let controllers = vec![ai(Stubborn(Action::Raise(1_000_000))), ai(FixedPolicy::CheckOrFold)];
    let mut table = Table::new(heads_up(4, None), controllers, None).unwrap();
    let record = table.play_hand().unwrap();
    let first = &record.events[0];
    assert_eq!(first.applied, Action::Raise(1000));
    assert_eq!(
        first.recovery,
        Some(Recovery::InsufficientStack {
            requested: 1_000_000,
            available: 1000
        })
    );
    assert_eq!(first.stack_after, 0);
    assert_eq!(record.final_stacks, vec![1010, 990]);
}

#[test]
fn covered_stack_calls_all_in_instead_of_folding() {
    let controllers = vec![
        ai(Stubborn(Action::Raise(1000))),
        ai(Stubborn(Action::Call(1000))),
    ];
    let mut table = Table::new(heads_up(5, None), controllers, None).unwrap();
    let record = table.play_hand().unwrap();
    // The big blind owes 990 and holds exactly 990.
    let call = &record.events[1];
    assert_eq!(call.requested, Action::Call(1000));
    assert_eq!(call.applied, Action::Call(990));
    assert_eq!(
        call.recovery,
        Some(Recovery::InsufficientStack {
            requested: 1000,
            available: 990
        })
    );
    assert_eq!(call.stack_after, 0);
    assert_eq!(record.board.len(), 5);
    assert_eq!(record.final_stacks.iter().sum::<u32>(), 2000);
}

#[test]
fn every_shove_past_the_first_is_a_call() {
    let seats = (0..5)
        .map(|i| SeatConfig::ai(format!("s{}", i), Profile::default()))
        .collect();
    let mut config = GameConfig::new(seats);
    config.seed = Some(6);
    config.decision_timeout_ms = None;
    let controllers = (0..5).map(|_| ai(Stubborn(Action::Raise(u32::MAX)))).collect();
    let mut table = Table::new(config, controllers, None).unwrap();
    let record = table.play_hand().unwrap();

    assert_eq!(record.events.len(), 5);
    assert!(record.events[0].applied.is_aggressive());
    for event in &record.events[1..] {
        assert!(matches!(event.applied, Action::Call(_)), "{:?}", event.applied);
        assert!(matches!(
            event.recovery,
            Some(Recovery::InsufficientStack { .. })
        ));
    }
    assert_eq!(record.final_stacks.iter().sum::<u32>(), 5000);
}

#[test]
fn chip_total_above_the_limit_is_rejected_up_front() {
    let seats = (0..5)
        .map(|i| SeatConfig::ai(format!("s{}", i), Profile::default()))
        .collect();
    let mut config = GameConfig::new(seats);
    config.starting_stack = 1_000_000_000;
    let controllers = (0..5).map(|_| ai(FixedPolicy::CheckOrCall)).collect();
    assert!(matches!(
        Table::new(config, controllers, None),
        Err(GameError::Configuration(_))
    ));
}
