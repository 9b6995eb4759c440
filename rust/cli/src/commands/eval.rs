//! `eval`: counterfactual scoring of a session log, or ranking of a hand.
//!
//! With `--input`, every logged decision is replayed through the EV model
//! and each seat's regret (chips given up against the best alternative) is
//! summarised. With `--cards`, 5 to 7 cards are ranked; two hole cards
//! followed by a board also get an equity estimate.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::Path;

use tiltbench_ai::ev::{evaluate_decision, EvReport, EvSettings};
use tiltbench_ai::rollout::{estimate_equity, RolloutBudget};
use tiltbench_engine::cancel::CancelToken;
use tiltbench_engine::cards::{parse_cards, Card};
use tiltbench_engine::hand::best_five;

use crate::error::{BatchValidationError, CliError};
use crate::formatters::{format_action, format_board, format_cards};
use crate::io_utils::read_text;
use crate::sink::{LogLine, RegretTally};
use crate::ui;

const WORST_SHOWN: usize = 5;

pub enum EvalSource<'a> {
    Log {
        input: &'a Path,
        seat: Option<usize>,
    },
    Cards {
        cards: &'a str,
        opponents: usize,
    },
}

pub fn handle_eval_command(
    source: EvalSource<'_>,
    samples: u32,
    seed: u64,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if samples == 0 {
        return Err(CliError::InvalidInput("samples must be at least 1".into()));
    }
    match source {
        EvalSource::Log { input, seat } => eval_log(input, seat, samples, seed, out, err),
        EvalSource::Cards { cards, opponents } => {
            eval_cards(cards, opponents, samples, seed, out)
        }
    }
}

fn eval_log(
    input: &Path,
    seat: Option<usize>,
    samples: u32,
    seed: u64,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let text = read_text(input)?;
    let settings = EvSettings {
        samples,
        seed,
        ..EvSettings::default()
    };
    let cancel = CancelToken::new();
    let mut tally = RegretTally::default();
    let mut reports: Vec<EvReport> = Vec::new();
    let mut skipped: Vec<BatchValidationError<usize>> = Vec::new();
    let mut net: BTreeMap<usize, i64> = BTreeMap::new();
    let mut hands = 0u32;

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed: LogLine = parse_json_or_continue!(line, err, format!("line {}", i + 1));
        match parsed {
            LogLine::Hand { net: hand_net, .. } => {
                hands += 1;
                for (s, n) in hand_net.into_iter().enumerate() {
                    *net.entry(s).or_default() += n;
                }
            }
            LogLine::Decision { event, .. } => {
                if seat.is_some_and(|s| s != event.seat) {
                    continue;
                }
                match evaluate_decision(&event, &settings, &cancel) {
                    Ok(report) => {
                        tally.add(&report);
                        reports.push(report);
                    }
                    Err(e) => skipped.push(BatchValidationError {
                        item_context: i + 1,
                        message: e.to_string(),
                    }),
                }
            }
        }
    }

    for problem in &skipped {
        ui::display_warning(err, &format!("line {}", problem))?;
    }
    if reports.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "no decisions could be scored in {}",
            input.display()
        )));
    }

    writeln!(
        out,
        "Scored {} decisions from {} hands ({} rollouts each)",
        reports.len(),
        hands,
        samples
    )?;
    for (s, regret) in &tally.seats {
        let mut line = format!(
            "  seat {}: {} decisions, mean regret {:.2}, total regret {:.1}",
            s,
            regret.decisions,
            regret.mean_regret(),
            regret.total_regret
        );
        if let Some(n) = net.get(s) {
            line.push_str(&format!(", net {:+}", n));
        }
        writeln!(out, "{}", line)?;
    }

    reports.sort_by(|a, b| b.regret().total_cmp(&a.regret()));
    let worst: Vec<&EvReport> = reports
        .iter()
        .filter(|r| r.regret() > 0.0)
        .take(WORST_SHOWN)
        .collect();
    if !worst.is_empty() {
        writeln!(out, "Costliest decisions:")?;
    }
    for r in worst {
        let Some(best) = r.best() else { continue };
        writeln!(
            out,
            "  {} #{} seat {}: {} ({:.1}) vs {} ({:.1}), regret {:.1}",
            r.hand_id,
            r.sequence,
            r.seat,
            format_action(&r.taken, false),
            r.taken_ev,
            format_action(&best.action, false),
            best.ev,
            r.regret()
        )?;
    }
    Ok(())
}

fn parse_card_group(s: &str) -> Result<Vec<Card>, CliError> {
    parse_cards(s).map_err(|e| CliError::InvalidInput(e.to_string()))
}

fn eval_cards(
    input: &str,
    opponents: usize,
    samples: u32,
    seed: u64,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let (hole, board) = match input.trim().split_once(char::is_whitespace) {
        Some((hole, board)) => (parse_card_group(hole)?, parse_card_group(board)?),
        None => {
            let cards = parse_card_group(input)?;
            if cards.len() == 2 {
                (cards, Vec::new())
            } else {
                (Vec::new(), cards)
            }
        }
    };
    let mut seen = HashSet::new();
    if let Some(dup) = hole.iter().chain(&board).find(|c| !seen.insert(**c)) {
        return Err(CliError::InvalidInput(format!("duplicate card {}", dup)));
    }

    let all: Vec<Card> = hole.iter().chain(&board).copied().collect();
    if (5..=7).contains(&all.len()) {
        let (five, rank) = best_five(&all).map_err(|e| CliError::InvalidInput(e.to_string()))?;
        writeln!(out, "{}: {}", rank.category.name(), format_board(&five))?;
    }

    match <[Card; 2]>::try_from(hole.as_slice()) {
        Ok(pair) => {
            if !matches!(board.len(), 0 | 3 | 4 | 5) {
                return Err(CliError::InvalidInput(format!(
                    "board must have 0, 3, 4 or 5 cards, got {}",
                    board.len()
                )));
            }
            let budget = RolloutBudget {
                samples,
                seed,
                deadline: None,
            };
            let equity = estimate_equity(pair, &board, opponents, &budget, &CancelToken::new())?;
            writeln!(
                out,
                "Equity of {} on {} vs {} random hand(s): {:.1}% ({} samples)",
                format_cards(&pair),
                format_board(&board),
                opponents,
                equity.value() * 100.0,
                equity.samples
            )?;
        }
        Err(_) if (5..=7).contains(&all.len()) && hole.is_empty() => {}
        Err(_) => {
            return Err(CliError::InvalidInput(format!(
                "expected 2 hole cards, got {}",
                hole.len()
            )))
        }
    }
    Ok(())
}
