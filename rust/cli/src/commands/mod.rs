//! Command handlers.
//!
//! Every handler has the shape
//! `handle_X_command(..., out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError>`:
//! results go to `out`, warnings to `err`, and failures are returned so
//! [`crate::run`] can map them to an exit code.

pub mod cfg;
pub mod eval;
pub mod play;
pub mod sim;

pub use cfg::handle_cfg_command;
pub use eval::handle_eval_command;
pub use play::{handle_play_command, PlayOptions};
pub use sim::{handle_sim_command, SimOptions};

use std::path::Path;

use tiltbench_ai::ev::EvSettings;
use tiltbench_ai::gto::StrategyTable;
use tiltbench_ai::{create_strategy_with, StrategyKind, StrategyOptions};
use tiltbench_engine::agent::Controller;

use crate::config::Config;
use crate::error::CliError;

/// Session seed: the flag, then the configured seed, then a random one.
pub(crate) fn session_seed(flag: Option<u64>, config: &Config) -> u64 {
    flag.or(config.seed).unwrap_or_else(rand::random::<u64>)
}

/// Strategy seeds differ per seat but follow from the session seed.
pub(crate) fn seat_seed(base: u64, seat: usize) -> u64 {
    base ^ 0x9e37_79b9_7f4a_7c15u64.wrapping_mul(seat as u64 + 1)
}

pub(crate) fn strategy_options(
    config: &Config,
    table: Option<&Path>,
) -> Result<StrategyOptions, CliError> {
    let table = match table {
        Some(path) => Some(StrategyTable::load(path)?),
        None => None,
    };
    let refinement = (config.refine_samples > 0).then(|| EvSettings {
        samples: config.refine_samples,
        ..EvSettings::default()
    });
    Ok(StrategyOptions {
        rollouts: Some(config.rollouts),
        table,
        refinement,
    })
}

/// One strategy controller per seat in `seats`, cycling through `kinds`.
pub(crate) fn strategy_controllers(
    kinds: &[StrategyKind],
    seats: std::ops::Range<usize>,
    base_seed: u64,
    options: &StrategyOptions,
) -> Result<Vec<(StrategyKind, Controller)>, CliError> {
    if kinds.is_empty() {
        return Err(CliError::InvalidInput("at least one strategy is required".into()));
    }
    Ok(seats
        .enumerate()
        .map(|(i, seat)| {
            let kind = kinds[i % kinds.len()];
            let strategy = create_strategy_with(kind, seat_seed(base_seed, seat), options.clone());
            (kind, Controller::Strategy(strategy))
        })
        .collect())
}
