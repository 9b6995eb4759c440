//! # tiltbench CLI library
//!
//! Command-line front end for the tiltbench engine and strategies.
//!
//! The entry point is [`run`], which parses arguments and dispatches to a
//! handler in [`commands`]. Handlers write results to `out` and diagnostics
//! to `err`, so tests drive them with in-memory buffers.
//!
//! ## Subcommands
//!
//! - `play`: sit at a table with AI opponents and play from the terminal
//! - `sim`: run an AI-only session, optionally logging and scoring it
//! - `eval`: score a session log's decisions, or rank and price a hand
//! - `cfg`: show the resolved configuration and each value's source
//!
//! ```no_run
//! use std::io;
//! let args = ["tiltbench", "sim", "--hands", "50", "--seed", "7"];
//! let code = tiltbench_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```

use std::io::{BufReader, Write};

use clap::Parser;

#[macro_use]
mod macros;
pub mod cli;
pub mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod human;
pub mod io_utils;
pub mod logging;
pub mod sink;
pub mod ui;
pub mod validation;

use cli::{Commands, TiltbenchCli};
use commands::eval::EvalSource;
use commands::{
    handle_cfg_command, handle_eval_command, handle_play_command, handle_sim_command,
    PlayOptions, SimOptions,
};
use tiltbench_engine::observation::Profile;

pub use error::{BatchValidationError, CliError};

const COMMANDS: &[&str] = &["play", "sim", "eval", "cfg"];

/// Parse `args` and run the selected command.
///
/// Returns [`exit_code::SUCCESS`], [`exit_code::ERROR`] for any failure, or
/// [`exit_code::INTERRUPTED`] when a computation was cancelled. `play`
/// reads the real stdin and prompts on the real stdout.
///
/// ```
/// let mut out = Vec::new();
/// let mut err = Vec::new();
/// let code = tiltbench_cli::run(["tiltbench", "eval", "--cards", "AsKsQsJsTs"], &mut out, &mut err);
/// assert_eq!(code, 0);
/// assert!(String::from_utf8(out).unwrap().starts_with("straight flush"));
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match TiltbenchCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version go to stdout and succeed
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    write_or_exit!(err, "{}", e);
                    write_or_exit!(err, "Usage: tiltbench <command> [options]\n");
                    write_or_exit!(err, "Commands:");
                    for c in COMMANDS {
                        write_or_exit!(err, "  {}", c);
                    }
                    write_or_exit!(err, "\nFor full help, run: tiltbench --help");
                    exit_code::ERROR
                }
            };
        }
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Play {
            opponents,
            strategy,
            skill,
            aggression,
            hands,
            seed,
            log,
            ev,
            table,
        } => match validation::parse_strategy_list(&strategy) {
            Ok(strategies) => {
                let opts = PlayOptions {
                    opponents: usize::from(opponents),
                    strategies,
                    profile: Profile { skill, aggression },
                    hands,
                    seed,
                    log,
                    ev,
                    table,
                };
                let input = Box::new(BufReader::new(std::io::stdin()));
                let prompt = Box::new(std::io::stdout());
                handle_play_command(opts, input, prompt, out, err)
            }
            Err(msg) => Err(CliError::InvalidInput(msg)),
        },
        Commands::Sim {
            seats,
            strategies,
            hands,
            seed,
            skill,
            aggression,
            output,
            ev,
            ev_samples,
            restock,
            table,
        } => match validation::parse_strategy_list(&strategies) {
            Ok(strategies) => handle_sim_command(
                SimOptions {
                    seats: usize::from(seats),
                    strategies,
                    profile: Profile { skill, aggression },
                    hands,
                    seed,
                    output,
                    ev,
                    ev_samples,
                    restock,
                    table,
                },
                out,
                err,
            ),
            Err(msg) => Err(CliError::InvalidInput(msg)),
        },
        Commands::Eval {
            input,
            cards,
            opponents,
            seat,
            samples,
            seed,
        } => {
            let source = match (&input, &cards) {
                (Some(path), _) => EvalSource::Log { input: path, seat },
                (None, Some(cards)) => EvalSource::Cards {
                    cards,
                    opponents: usize::from(opponents),
                },
                (None, None) => {
                    let _ = ui::write_error(err, "either --input or --cards is required");
                    return exit_code::ERROR;
                }
            };
            handle_eval_command(source, samples, seed, out, err)
        }
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(msg)) => {
            let _ = ui::write_error(err, &format!("interrupted: {}", msg));
            exit_code::INTERRUPTED
        }
        Err(e) => {
            write_or_exit!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_goes_to_stdout() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        assert_eq!(run(["tiltbench", "--help"], &mut out, &mut err), exit_code::SUCCESS);
        let text = String::from_utf8(out).unwrap();
        for c in COMMANDS {
            assert!(text.contains(c), "help lacks {}", c);
        }
        assert!(err.is_empty());
    }

    #[test]
    fn unknown_command_lists_commands() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        assert_eq!(run(["tiltbench", "replay"], &mut out, &mut err), exit_code::ERROR);
        let text = String::from_utf8(err).unwrap();
        assert!(text.contains("Commands:"));
        assert!(text.contains("  sim"));
    }

    #[test]
    fn unknown_strategy_is_an_error() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(
            ["tiltbench", "sim", "--strategies", "heuristic,bogus", "--hands", "1"],
            &mut out,
            &mut err,
        );
        assert_eq!(code, exit_code::ERROR);
        assert!(String::from_utf8(err).unwrap().contains("bogus"));
    }
}
