//! Terminal implementation of the human seat.

use std::io::{BufRead, Write};

use tiltbench_engine::agent::HumanInput;
use tiltbench_engine::cancel::CancelToken;
use tiltbench_engine::events::HandRecord;
use tiltbench_engine::observation::Observation;
use tiltbench_engine::rules::{Action, LegalActions};
use tracing::info;

use crate::formatters::{format_action, format_board, format_cards, format_hand_summary};
use crate::io_utils::read_stdin_line;
use crate::validation::{parse_player_action, ParseResult};

/// Prompts on `out` and reads commands from `input`.
///
/// `q` or end of input cancels the shared token; the table then aborts the
/// running hand and refunds it.
pub struct TerminalInput {
    input: Box<dyn BufRead>,
    out: Box<dyn Write>,
    cancel: CancelToken,
    names: Vec<String>,
    shown_history: usize,
}

impl TerminalInput {
    pub fn new(
        input: Box<dyn BufRead>,
        out: Box<dyn Write>,
        cancel: CancelToken,
        names: Vec<String>,
    ) -> Self {
        Self {
            input,
            out,
            cancel,
            names,
            shown_history: 0,
        }
    }

    fn name(&self, seat: usize) -> String {
        self.names
            .get(seat)
            .cloned()
            .unwrap_or_else(|| format!("seat {}", seat))
    }

    fn show_state(&mut self, obs: &Observation, legal: &LegalActions) -> std::io::Result<()> {
        if obs.history.len() < self.shown_history {
            self.shown_history = 0;
        }
        for record in &obs.history[self.shown_history..] {
            let all_in = obs
                .seats
                .get(record.seat)
                .is_some_and(|s| s.stack == 0 && record.action.amount() > 0);
            writeln!(
                self.out,
                "  {} {}",
                self.name(record.seat),
                format_action(&record.action, all_in)
            )?;
        }
        self.shown_history = obs.history.len();

        let hole = obs
            .hole_cards
            .map(|c| format_cards(&c))
            .unwrap_or_else(|| "--".to_string());
        writeln!(
            self.out,
            "[{} {}] board {} pot {} | your cards {} stack {}",
            obs.hand_id,
            obs.street,
            format_board(&obs.board),
            obs.pot,
            hole,
            obs.stack()
        )?;
        writeln!(self.out, "Options: {}", describe_legal(legal))?;
        write!(self.out, "> ")?;
        self.out.flush()
    }

    fn quit(&mut self, legal: &LegalActions) -> Action {
        info!("human left the table");
        self.cancel.cancel();
        legal.minimal()
    }
}

fn describe_legal(legal: &LegalActions) -> String {
    let mut options = Vec::new();
    if legal.fold {
        options.push("fold".to_string());
    }
    if legal.check {
        options.push("check".to_string());
    }
    if let Some(amount) = legal.call {
        options.push(format!("call {}", amount));
    }
    if let Some(range) = legal.raise {
        let verb = match range.action(range.min_to) {
            Action::Bet(_) => "bet",
            _ => "raise",
        };
        if range.min_to == range.max_to {
            options.push(format!("allin ({})", range.max_to));
        } else {
            options.push(format!("{} {}..{}", verb, range.min_to, range.max_to));
            options.push("allin".to_string());
        }
    }
    options.push("q".to_string());
    options.join(", ")
}

impl HumanInput for TerminalInput {
    fn request_action(&mut self, observation: &Observation, legal: &LegalActions) -> Action {
        if self.show_state(observation, legal).is_err() {
            return self.quit(legal);
        }
        loop {
            let Some(line) = read_stdin_line(&mut self.input) else {
                return self.quit(legal);
            };
            match parse_player_action(&line, legal) {
                ParseResult::Action(action) => return action,
                ParseResult::Quit => return self.quit(legal),
                ParseResult::Invalid(msg) => {
                    if write!(self.out, "{}\n> ", msg)
                        .and_then(|_| self.out.flush())
                        .is_err()
                    {
                        return self.quit(legal);
                    }
                }
            }
        }
    }

    fn hand_finished(&mut self, record: &HandRecord) {
        self.shown_history = 0;
        // Best effort: a closed terminal is noticed at the next prompt.
        let _ = writeln!(self.out, "{}\n", format_hand_summary(record, &self.names));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tiltbench_engine::rules::{RaiseKind, RaiseRange};

    fn facing_bet() -> LegalActions {
        LegalActions {
            fold: true,
            check: false,
            call: Some(20),
            raise: Some(RaiseRange {
                kind: RaiseKind::Raise,
                min_to: 60,
                max_to: 980,
            }),
        }
    }

    #[test]
    fn legal_options_are_listed() {
        assert_eq!(
            describe_legal(&facing_bet()),
            "fold, call 20, raise 60..980, allin, q"
        );
    }

    #[test]
    fn quitting_cancels_the_token() {
        let cancel = CancelToken::new();
        let mut input = TerminalInput::new(
            Box::new(Cursor::new("")),
            Box::new(std::io::sink()),
            cancel.clone(),
            vec![],
        );
        let legal = facing_bet();
        assert_eq!(input.quit(&legal), Action::Fold);
        assert!(cancel.is_cancelled());
    }
}
