//! `play`: one human seat against AI opponents.
//!
//! The human sits at seat 0. Typing `q` (or closing stdin) aborts the hand
//! in progress, refunds it and ends the session normally.

use std::fs::OpenOptions;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;

use tiltbench_ai::ev::{EvReport, EvSettings, EvWorker};
use tiltbench_ai::StrategyKind;
use tiltbench_engine::agent::Controller;
use tiltbench_engine::cancel::CancelToken;
use tiltbench_engine::config::SeatConfig;
use tiltbench_engine::errors::GameError;
use tiltbench_engine::observation::Profile;
use tiltbench_engine::table::Table;
use tracing::info;

use super::{session_seed, strategy_controllers, strategy_options};
use crate::config;
use crate::error::CliError;
use crate::human::TerminalInput;
use crate::io_utils::ensure_parent_dir;
use crate::sink::{JsonlSink, RegretTally};
use crate::ui;

const HUMAN_SEAT: usize = 0;

#[derive(Debug, Clone)]
pub struct PlayOptions {
    pub opponents: usize,
    pub strategies: Vec<StrategyKind>,
    pub profile: Profile,
    pub hands: usize,
    pub seed: Option<u64>,
    pub log: Option<PathBuf>,
    pub ev: bool,
    pub table: Option<PathBuf>,
}

/// Run an interactive session. Prompts go to `prompt`, the closing summary to `out`.
pub fn handle_play_command(
    opts: PlayOptions,
    input: Box<dyn BufRead>,
    prompt: Box<dyn Write>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let cfg = config::load()?;
    let seed = session_seed(opts.seed, &cfg);
    let options = strategy_options(&cfg, opts.table.as_deref())?;
    let ai = strategy_controllers(&opts.strategies, 1..opts.opponents + 1, seed, &options)?;

    let mut seats = vec![SeatConfig::human("you")];
    let mut controllers = vec![Controller::Human];
    for (i, (kind, controller)) in ai.into_iter().enumerate() {
        seats.push(SeatConfig::ai(format!("{}-{}", kind, i + 1), opts.profile));
        controllers.push(controller);
    }
    let names: Vec<String> = seats.iter().map(|s| s.name.clone()).collect();

    let cancel = CancelToken::new();
    let human = TerminalInput::new(input, prompt, cancel.clone(), names.clone());
    let mut table = Table::new(
        cfg.game_config(seats, Some(seed)),
        controllers,
        Some(Box::new(human)),
    )?
    .with_cancel_token(cancel);
    writeln!(
        out,
        "Seed {} | {} opponents | blinds {}/{} | stacks {}",
        seed, opts.opponents, cfg.small_blind, cfg.big_blind, cfg.starting_stack
    )?;

    let log = match &opts.log {
        Some(path) => {
            ensure_parent_dir(path)?;
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let sink = JsonlSink::new(BufWriter::new(file));
            let handle = sink.handle();
            table.add_sink(Box::new(sink));
            Some(handle)
        }
        None => None,
    };
    // Scoring has its own token so quitting still reports what was played.
    let worker = opts.ev.then(|| {
        let settings = EvSettings {
            seed,
            ..EvSettings::default()
        };
        let worker = EvWorker::spawn(settings, CancelToken::new());
        table.add_sink(Box::new(worker.sink()));
        worker
    });

    let quit = match table.run(opts.hands) {
        Ok(_) => false,
        Err(GameError::Cancelled) => true,
        Err(e) => return Err(e.into()),
    };
    let played = table.hands().len();
    info!(played, quit, "play session finished");

    if quit {
        writeln!(out, "Session ended by player after {} hands.", played)?;
    } else if table.stacks()[HUMAN_SEAT] == 0 {
        writeln!(out, "You are out of chips after {} hands.", played)?;
    } else {
        writeln!(out, "Played {} hands.", played)?;
    }
    let stacks = table.stacks();
    for (name, stack) in names.iter().zip(&stacks) {
        let net = i64::from(*stack) - i64::from(cfg.starting_stack);
        writeln!(out, "  {:<16} {:>7} ({:+})", name, stack, net)?;
    }

    if let Some(worker) = worker {
        let reports = worker.finish()?;
        write_regret(out, &reports)?;
    }
    if let Some(handle) = log {
        if let Some(e) = handle.take_error() {
            ui::display_warning(err, &format!("session log incomplete: {}", e))?;
        }
    }
    Ok(())
}

fn write_regret(out: &mut dyn Write, reports: &[EvReport]) -> std::io::Result<()> {
    let mut tally = RegretTally::default();
    for report in reports.iter().filter(|r| r.seat == HUMAN_SEAT) {
        tally.add(report);
    }
    match tally.seats.get(&HUMAN_SEAT) {
        Some(seat) => writeln!(
            out,
            "Your decisions: {} scored, mean regret {:.2} chips, total {:.1}",
            seat.decisions,
            seat.mean_regret(),
            seat.total_regret
        ),
        None => writeln!(out, "Your decisions: none scored"),
    }
}
