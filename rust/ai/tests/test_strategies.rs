mod common;

use common::{river_call_with_nuts, scripted_hand};
use tiltbench_ai::ev::{evaluate_decision, EvSettings};
use tiltbench_ai::gto::{GtoStrategy, InfoKey, StrategyTable, FLOOR};
use tiltbench_ai::heuristic::HeuristicStrategy;
use tiltbench_ai::montecarlo::MonteCarloStrategy;
use tiltbench_ai::opponents::OpponentModel;
use tiltbench_engine::agent::Strategy;
use tiltbench_engine::cancel::CancelToken;
use tiltbench_engine::events::ActionRecord;
use tiltbench_engine::observation::Profile;
use tiltbench_engine::rules::Action;
use tiltbench_engine::state::Street;

#[test]
fn montecarlo_never_folds_the_nuts() {
    let event = river_call_with_nuts();
    let mut mc = MonteCarloStrategy::new(5, 400);
    let eval = mc.evaluate(&event.observation).unwrap();
    assert!(eval.samples > 0);
    let best = eval.best().unwrap();
    assert_ne!(best, Action::Fold);
    assert!(event.legal.contains(&best));
    assert_ne!(mc.decide(&event.observation), Action::Fold);
}

#[test]
fn montecarlo_falls_back_when_out_of_time() {
    let event = river_call_with_nuts();
    let mut obs = event.observation.clone();
    obs.time_budget_ms = Some(0);
    let mut mc = MonteCarloStrategy::new(5, 10_000);
    assert!(mc.evaluate(&obs).is_none());
    assert_eq!(mc.decide(&obs), obs.legal.minimal());
}

#[test]
fn gto_policy_is_never_pure() {
    let record = scripted_hand("9d8d", "AsKc", "Td7c2h3sQs");
    let gto = GtoStrategy::new(1);

    // A table that puts every weight on the passive action still mixes.
    let mut pure = StrategyTable::builtin();
    for w in pure.entries.values_mut() {
        *w = vec![0.0, 1.0, 0.0, 0.0, 0.0];
    }
    let pure_gto = GtoStrategy::with_table(pure, 1);

    for event in &record.events {
        for strategy in [&gto, &pure_gto] {
            let policy = strategy.policy(&event.observation);
            let total: f64 = policy.iter().map(|(_, p)| p).sum();
            assert!((total - 1.0).abs() < 1e-9);
            for (action, p) in &policy {
                assert!(event.legal.contains(action), "{:?}", action);
                assert!(*p > 0.0);
            }
            if event.legal.raise.is_some() || !event.legal.check {
                assert!(policy.len() >= 2, "{:?}", policy);
                let max = policy.iter().map(|(_, p)| *p).fold(0.0, f64::max);
                assert!(max < 1.0 - f64::from(FLOOR) / 2.0);
            }
        }
    }
}

#[test]
fn online_refinement_rewrites_weights_after_the_hand() {
    let record = scripted_hand("9d8d", "AsKc", "Td7c2h3sQs");
    let settings = EvSettings {
        samples: 60,
        seed: 3,
        ..EvSettings::default()
    };
    let mut gto = GtoStrategy::new(4).with_online_refinement(settings);
    let before = gto.table().clone();
    let mine: Vec<_> = record.events.iter().filter(|e| e.seat == 1).collect();
    assert!(!mine.is_empty());
    for event in &mine {
        gto.decide(&event.observation);
    }
    gto.hand_finished(&record);

    let changed = mine
        .iter()
        .filter_map(|e| InfoKey::from_observation(&e.observation))
        .filter(|key| gto.table().weights(key) != before.weights(key))
        .count();
    assert!(changed > 0);
    assert!(!gto.table().regrets.is_empty());

    // Refined rows may hold zeros; the sampled policy still floors them.
    let floor = f64::from(FLOOR) / 1.2;
    for event in &mine {
        for (action, p) in gto.policy(&event.observation) {
            assert!(event.legal.contains(&action));
            assert!(p >= floor, "{:?} has {}", action, p);
        }
    }
}

#[test]
fn refinement_is_off_unless_asked_for() {
    let record = scripted_hand("9d8d", "AsKc", "Td7c2h3sQs");
    let mut gto = GtoStrategy::new(4);
    for event in record.events.iter().filter(|e| e.seat == 1) {
        gto.decide(&event.observation);
    }
    gto.hand_finished(&record);
    assert_eq!(gto.table(), &StrategyTable::builtin());
}

#[test]
fn strategy_table_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.json");
    let mut table = StrategyTable::builtin();
    let event = river_call_with_nuts();
    let report = evaluate_decision(&event, &EvSettings::default(), &CancelToken::new()).unwrap();
    assert!(table.refine(&event, &report));
    table.save(&path).unwrap();
    let loaded = StrategyTable::load(&path).unwrap();
    assert_eq!(loaded, table);
    assert!(StrategyTable::from_json("{not json").is_err());
}

#[test]
fn refine_moves_weight_toward_better_actions() {
    let event = river_call_with_nuts();
    let key = InfoKey::from_observation(&event.observation).unwrap();
    let mut table = StrategyTable::builtin();
    let report = evaluate_decision(&event, &EvSettings::default(), &CancelToken::new()).unwrap();
    let before = table.weights(&key);
    table.refine(&event, &report);
    let after = table.weights(&key);
    // Folding the nuts accumulates negative regret and drops out.
    assert_eq!(after[0], 0.0);
    assert!(after[4] >= before[4]);
}

#[test]
fn heuristic_bluffs_more_against_folders() {
    let record = scripted_hand("7s2d", "AhKc", "Td9c4h3sQs");
    let event = record
        .events
        .iter()
        .find(|e| e.seat == 1 && !e.observation.board.is_empty() && e.legal.check)
        .unwrap();
    let mut obs = event.observation.clone();
    obs.profile = Profile {
        skill: 1.0,
        aggression: 0.5,
    };
    let neutral = HeuristicStrategy::new(1).mix(&obs);

    let mut exploiting = HeuristicStrategy::new(1);
    let mut model_feed = OpponentModel::new();
    for _ in 0..20 {
        let bet = ActionRecord {
            seat: 1,
            street: Street::Flop,
            action: Action::Bet(20),
        };
        let fold = ActionRecord {
            seat: 0,
            street: Street::Flop,
            action: Action::Fold,
        };
        exploiting.observe(&bet);
        exploiting.observe(&fold);
        model_feed.observe(&bet);
        model_feed.observe(&fold);
        exploiting.hand_finished(&record);
        model_feed.hand_finished(&record);
    }
    assert!(exploiting.opponents().fold_to_raise(0) > 0.9);
    assert_eq!(exploiting.opponents().stats(0), model_feed.stats(0));
    let exploit = exploiting.mix(&obs);
    assert!(exploit[2] > neutral[2], "{:?} vs {:?}", exploit, neutral);

    exploiting.reset_session();
    assert_eq!(exploiting.mix(&obs), neutral);
}
