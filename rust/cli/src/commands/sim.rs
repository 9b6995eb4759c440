//! `sim`: an AI-only session, optionally written to JSONL and scored.
//!
//! Each hand's deck seed is the session seed plus the hand index, so a run
//! with `--seed` is reproducible hand for hand.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tiltbench_ai::ev::EvSettings;
use tiltbench_ai::StrategyKind;
use tiltbench_engine::cancel::CancelToken;
use tiltbench_engine::config::{SeatConfig, StackPolicy};
use tiltbench_engine::events::Recovery;
use tiltbench_engine::observation::Profile;
use tiltbench_engine::table::Table;
use tracing::info;

use super::{session_seed, strategy_controllers, strategy_options};
use crate::config;
use crate::error::CliError;
use crate::io_utils::ensure_parent_dir;
use crate::sink::JsonlSink;
use crate::ui;

#[derive(Debug, Clone)]
pub struct SimOptions {
    pub seats: usize,
    pub strategies: Vec<StrategyKind>,
    pub profile: Profile,
    pub hands: usize,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub ev: bool,
    pub ev_samples: u32,
    pub restock: bool,
    pub table: Option<PathBuf>,
}

pub fn handle_sim_command(
    opts: SimOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if opts.hands == 0 {
        return Err(CliError::InvalidInput("hands must be at least 1".into()));
    }
    if opts.ev && opts.ev_samples == 0 {
        return Err(CliError::InvalidInput("ev-samples must be at least 1".into()));
    }
    let cfg = config::load()?;
    let seed = session_seed(opts.seed, &cfg);
    let options = strategy_options(&cfg, opts.table.as_deref())?;
    let ai = strategy_controllers(&opts.strategies, 0..opts.seats, seed, &options)?;

    let mut seats = Vec::with_capacity(opts.seats);
    let mut controllers = Vec::with_capacity(opts.seats);
    let mut kinds = Vec::with_capacity(opts.seats);
    for (i, (kind, controller)) in ai.into_iter().enumerate() {
        seats.push(SeatConfig::ai(format!("{}-{}", kind, i), opts.profile));
        controllers.push(controller);
        kinds.push(kind);
    }
    let names: Vec<String> = seats.iter().map(|s| s.name.clone()).collect();

    let mut game = cfg.game_config(seats, Some(seed));
    if opts.restock {
        game.stack_policy = StackPolicy::Restock;
    }
    let mut table = Table::new(game, controllers, None)?;

    let writer: Option<Box<dyn Write + Send>> = match &opts.output {
        Some(path) => {
            ensure_parent_dir(path)?;
            Some(Box::new(BufWriter::new(File::create(path)?)))
        }
        None if opts.ev => Some(Box::new(std::io::sink())),
        None => None,
    };
    let log = writer.map(|w| {
        let mut sink = JsonlSink::new(w);
        if opts.ev {
            let settings = EvSettings {
                samples: opts.ev_samples,
                seed,
                ..EvSettings::default()
            };
            sink = sink.with_ev(settings, table.cancel_token());
        }
        let handle = sink.handle();
        table.add_sink(Box::new(sink));
        handle
    });

    let played = table.run(opts.hands)?;
    info!(played, seed, "simulation finished");

    let mut recoveries: BTreeMap<&'static str, u32> = BTreeMap::new();
    for event in table.hands().iter().flat_map(|h| &h.events) {
        let kind = match &event.recovery {
            Some(Recovery::IllegalAction { .. }) => "illegal_action",
            Some(Recovery::InsufficientStack { .. }) => "insufficient_stack",
            Some(Recovery::StrategyTimeout { .. }) => "strategy_timeout",
            None => continue,
        };
        *recoveries.entry(kind).or_default() += 1;
    }
    let net = net_per_seat(&table, opts.restock, cfg.starting_stack);
    let tally = log.as_ref().map(|h| h.tally());

    writeln!(out, "Simulated {} hands (seed {})", played, seed)?;
    if played < opts.hands {
        writeln!(out, "Stopped early: fewer than two seats have chips")?;
    }
    for (seat, name) in names.iter().enumerate() {
        let mut line = format!(
            "  seat {} {:<16} {:<10} net {:+}",
            seat, name, kinds[seat], net[seat]
        );
        if let Some(regret) = tally.as_ref().and_then(|t| t.seats.get(&seat)) {
            line.push_str(&format!(
                " | {} decisions, mean regret {:.2}",
                regret.decisions,
                regret.mean_regret()
            ));
        }
        writeln!(out, "{}", line)?;
    }
    if !recoveries.is_empty() {
        let summary: Vec<String> = recoveries
            .iter()
            .map(|(kind, n)| format!("{}={}", kind, n))
            .collect();
        writeln!(out, "Recoveries: {}", summary.join(", "))?;
    }
    if let Some(handle) = &log {
        if let Some(e) = handle.take_error() {
            ui::display_warning(err, &format!("output incomplete: {}", e))?;
        } else if let Some(path) = &opts.output {
            writeln!(
                out,
                "Wrote {} lines to {}",
                handle.lines_written(),
                path.display()
            )?;
        }
    }
    Ok(())
}

/// Net result per seat. Restocked sessions sum each hand's result.
fn net_per_seat(table: &Table, restock: bool, starting_stack: u32) -> Vec<i64> {
    if restock {
        let mut net = vec![0i64; table.stacks().len()];
        for hand in table.hands() {
            for (total, n) in net.iter_mut().zip(hand.net()) {
                *total += n;
            }
        }
        net
    } else {
        table
            .stacks()
            .iter()
            .map(|&s| i64::from(s) - i64::from(starting_stack))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(hands: usize) -> SimOptions {
        SimOptions {
            seats: 3,
            strategies: vec![StrategyKind::Heuristic],
            profile: Profile::default(),
            hands,
            seed: Some(17),
            output: None,
            ev: false,
            ev_samples: 50,
            restock: true,
            table: None,
        }
    }

    #[test]
    fn zero_hands_is_rejected() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = handle_sim_command(options(0), &mut out, &mut err);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
