use serde_json::Value;
use serial_test::serial;
use tiltbench_cli::config::{
    self, ConfigError, ValueSource, ENV_AI_TIMEOUT_MS, ENV_BLINDS, ENV_CONFIG,
    ENV_REFINE_SAMPLES, ENV_ROLLOUTS, ENV_SEED, ENV_STARTING_STACK,
};
use tiltbench_cli::run;

fn clear_env() {
    for var in [
        ENV_CONFIG,
        ENV_SEED,
        ENV_STARTING_STACK,
        ENV_BLINDS,
        ENV_AI_TIMEOUT_MS,
        ENV_ROLLOUTS,
        ENV_REFINE_SAMPLES,
    ] {
        std::env::remove_var(var);
    }
}

fn cfg_json() -> (i32, Value, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = run(["tiltbench", "cfg"], &mut out, &mut err);
    let json = serde_json::from_slice(&out).unwrap_or(Value::Null);
    (code, json, String::from_utf8_lossy(&err).into_owned())
}

#[test]
#[serial]
fn defaults_when_nothing_is_set() {
    clear_env();
    let (code, json, _) = cfg_json();
    assert_eq!(code, 0);
    assert_eq!(json["starting_stack"]["value"], 1000);
    assert_eq!(json["starting_stack"]["source"], "default");
    assert_eq!(json["blinds"]["value"], "5/10");
    assert_eq!(json["seed"]["value"], Value::Null);
    assert_eq!(json["ai_timeout_ms"]["value"], 2000);
    assert_eq!(json["rollouts"]["source"], "default");
    assert_eq!(json["refine_samples"]["value"], 0);
}

#[test]
#[serial]
fn env_overrides_file_overrides_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiltbench.toml");
    std::fs::write(&path, "starting_stack = 500\nseed = 456\nsmall_blind = 10\nbig_blind = 20\n")
        .unwrap();
    std::env::set_var(ENV_CONFIG, &path);
    std::env::set_var(ENV_SEED, "9");

    let (code, json, _) = cfg_json();
    clear_env();
    assert_eq!(code, 0);
    assert_eq!(json["starting_stack"]["value"], 500);
    assert_eq!(json["starting_stack"]["source"], "file");
    assert_eq!(json["blinds"]["value"], "10/20");
    assert_eq!(json["blinds"]["source"], "file");
    assert_eq!(json["seed"]["value"], 9);
    assert_eq!(json["seed"]["source"], "env");
    assert_eq!(json["rollouts"]["source"], "default");
}

#[test]
#[serial]
fn resolved_sources_match_what_was_set() {
    clear_env();
    std::env::set_var(ENV_BLINDS, "25/50");
    std::env::set_var(ENV_AI_TIMEOUT_MS, "0");
    let resolved = config::load_with_sources();
    clear_env();
    let resolved = resolved.unwrap();
    assert_eq!(resolved.config.small_blind, 25);
    assert_eq!(resolved.config.big_blind, 50);
    assert_eq!(resolved.sources.blinds, ValueSource::Env);
    assert_eq!(resolved.sources.ai_timeout_ms, ValueSource::Env);
    assert_eq!(resolved.sources.starting_stack, ValueSource::Default);
    let game = resolved.config.game_config(
        vec![
            tiltbench_engine::config::SeatConfig::human("a"),
            tiltbench_engine::config::SeatConfig::human("b"),
        ],
        None,
    );
    assert_eq!(game.decision_timeout_ms, None);
}

#[test]
#[serial]
fn invalid_values_are_rejected() {
    clear_env();
    std::env::set_var(ENV_BLINDS, "20/10");
    assert!(matches!(config::load(), Err(ConfigError::Invalid(_))));

    std::env::set_var(ENV_BLINDS, "five/ten");
    assert!(matches!(config::load(), Err(ConfigError::Invalid(_))));
    clear_env();

    std::env::set_var(ENV_STARTING_STACK, "0");
    let (code, _, err) = cfg_json();
    clear_env();
    assert_eq!(code, 2);
    assert!(err.contains("starting_stack"), "{}", err);

    std::env::set_var(ENV_ROLLOUTS, "lots");
    assert!(matches!(config::load(), Err(ConfigError::Invalid(_))));
    clear_env();
}

#[test]
#[serial]
fn unknown_file_keys_are_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "starting_stack = 500\nlevel = 3\n").unwrap();
    std::env::set_var(ENV_CONFIG, &path);
    let result = config::load();
    clear_env();
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
#[serial]
fn missing_config_file_fails_commands() {
    clear_env();
    std::env::set_var(ENV_CONFIG, "/nonexistent/tiltbench.toml");
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = run(["tiltbench", "sim", "--hands", "1"], &mut out, &mut err);
    clear_env();
    assert_eq!(code, 2);
    assert!(String::from_utf8_lossy(&err).contains("Configuration error"));
}

#[test]
#[serial]
fn refine_samples_from_env_drive_gto_refinement() {
    clear_env();
    std::env::set_var(ENV_REFINE_SAMPLES, "20");
    let (code, json, _) = cfg_json();
    assert_eq!(code, 0);
    assert_eq!(json["refine_samples"]["value"], 20);
    assert_eq!(json["refine_samples"]["source"], "env");

    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = run(
        [
            "tiltbench", "sim", "--seats", "2", "--strategies", "gto", "--hands", "3", "--seed", "8",
        ],
        &mut out,
        &mut err,
    );
    clear_env();
    assert_eq!(code, 0, "{}", String::from_utf8_lossy(&err));
    assert!(String::from_utf8_lossy(&out).contains("Simulated 3 hands"));
}
