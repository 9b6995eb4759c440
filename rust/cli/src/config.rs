//! Session defaults resolved from built-ins, a TOML file and the environment.
//!
//! Precedence, lowest first: defaults, the file named by `TILTBENCH_CONFIG`,
//! then `TILTBENCH_*` variables. Command-line flags override all of them in
//! the command handlers. Every value remembers where it came from.

use std::fs;

use serde::{Deserialize, Serialize};
use tiltbench_engine::config::{GameConfig, SeatConfig, StackPolicy};

pub const ENV_CONFIG: &str = "TILTBENCH_CONFIG";
pub const ENV_SEED: &str = "TILTBENCH_SEED";
pub const ENV_STARTING_STACK: &str = "TILTBENCH_STARTING_STACK";
pub const ENV_BLINDS: &str = "TILTBENCH_BLINDS";
pub const ENV_AI_TIMEOUT_MS: &str = "TILTBENCH_AI_TIMEOUT_MS";
pub const ENV_ROLLOUTS: &str = "TILTBENCH_ROLLOUTS";
pub const ENV_REFINE_SAMPLES: &str = "TILTBENCH_REFINE_SAMPLES";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub starting_stack: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    pub seed: Option<u64>,
    /// 0 disables the AI decision timeout
    pub ai_timeout_ms: u64,
    pub rollouts: u32,
    /// Rollouts per decision when GTO seats refine their table; 0 turns refinement off
    pub refine_samples: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            starting_stack: 1000,
            small_blind: 5,
            big_blind: 10,
            seed: None,
            ai_timeout_ms: 2000,
            rollouts: 2000,
            refine_samples: 0,
        }
    }
}

impl Config {
    /// Engine configuration for `seats`, with `seed` taking precedence over the file/env seed.
    pub fn game_config(&self, seats: Vec<SeatConfig>, seed: Option<u64>) -> GameConfig {
        let mut game = GameConfig::new(seats);
        game.starting_stack = self.starting_stack;
        game.small_blind = self.small_blind;
        game.big_blind = self.big_blind;
        game.seed = seed.or(self.seed);
        game.decision_timeout_ms = if self.ai_timeout_ms == 0 {
            None
        } else {
            Some(self.ai_timeout_ms)
        };
        game.stack_policy = StackPolicy::Carry;
        game
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub starting_stack: ValueSource,
    pub blinds: ValueSource,
    pub seed: ValueSource,
    pub ai_timeout_ms: ValueSource,
    pub rollouts: ValueSource,
    pub refine_samples: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            starting_stack: ValueSource::Default,
            blinds: ValueSource::Default,
            seed: ValueSource::Default,
            ai_timeout_ms: ValueSource::Default,
            rollouts: ValueSource::Default,
            refine_samples: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    starting_stack: Option<u32>,
    #[serde(default)]
    small_blind: Option<u32>,
    #[serde(default)]
    big_blind: Option<u32>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    ai_timeout_ms: Option<u64>,
    #[serde(default)]
    rollouts: Option<u32>,
    #[serde(default)]
    refine_samples: Option<u32>,
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("Invalid {}: '{}'", name, value)))
}

/// Parse `"SB/BB"`, e.g. `"5/10"`.
pub fn parse_blinds(s: &str) -> Option<(u32, u32)> {
    let (sb, bb) = s.trim().split_once('/')?;
    Some((sb.trim().parse().ok()?, bb.trim().parse().ok()?))
}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Some(path) = env_value(ENV_CONFIG) {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.starting_stack {
            cfg.starting_stack = v;
            sources.starting_stack = ValueSource::File;
        }
        if let Some(v) = f.small_blind {
            cfg.small_blind = v;
            sources.blinds = ValueSource::File;
        }
        if let Some(v) = f.big_blind {
            cfg.big_blind = v;
            sources.blinds = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.ai_timeout_ms {
            cfg.ai_timeout_ms = v;
            sources.ai_timeout_ms = ValueSource::File;
        }
        if let Some(v) = f.rollouts {
            cfg.rollouts = v;
            sources.rollouts = ValueSource::File;
        }
        if let Some(v) = f.refine_samples {
            cfg.refine_samples = v;
            sources.refine_samples = ValueSource::File;
        }
    }

    if let Some(seed) = env_value(ENV_SEED) {
        cfg.seed = Some(parse_env("seed", &seed)?);
        sources.seed = ValueSource::Env;
    }
    if let Some(stack) = env_value(ENV_STARTING_STACK) {
        cfg.starting_stack = parse_env("starting stack", &stack)?;
        sources.starting_stack = ValueSource::Env;
    }
    if let Some(blinds) = env_value(ENV_BLINDS) {
        let (sb, bb) = parse_blinds(&blinds).ok_or_else(|| {
            ConfigError::Invalid(format!("Invalid blinds: '{}' (expected SB/BB)", blinds))
        })?;
        cfg.small_blind = sb;
        cfg.big_blind = bb;
        sources.blinds = ValueSource::Env;
    }
    if let Some(ms) = env_value(ENV_AI_TIMEOUT_MS) {
        cfg.ai_timeout_ms = parse_env("AI timeout", &ms)?;
        sources.ai_timeout_ms = ValueSource::Env;
    }
    if let Some(n) = env_value(ENV_ROLLOUTS) {
        cfg.rollouts = parse_env("rollouts", &n)?;
        sources.rollouts = ValueSource::Env;
    }
    if let Some(n) = env_value(ENV_REFINE_SAMPLES) {
        cfg.refine_samples = parse_env("refine samples", &n)?;
        sources.refine_samples = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.starting_stack == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: starting_stack must be >0".into(),
        ));
    }
    if cfg.small_blind == 0 || cfg.big_blind == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: blinds must be >0".into(),
        ));
    }
    if cfg.small_blind > cfg.big_blind {
        return Err(ConfigError::Invalid(format!(
            "Invalid configuration: small blind {} exceeds big blind {}",
            cfg.small_blind, cfg.big_blind
        )));
    }
    if cfg.rollouts == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: rollouts must be >0".into(),
        ));
    }
    Ok(())
}
