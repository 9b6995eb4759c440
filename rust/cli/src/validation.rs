//! Input parsing and validation for interactive commands.

use tiltbench_ai::StrategyKind;
use tiltbench_engine::rules::{Action, LegalActions};

/// Outcome of parsing one line typed by the human player.
#[derive(Debug, PartialEq)]
pub enum ParseResult {
    Action(Action),
    /// `q` or `quit`
    Quit,
    Invalid(String),
}

/// Parse a command typed at the action prompt.
///
/// Accepts (case-insensitive) `fold`/`f`, `check`/`k`, `call`/`c`,
/// `bet N`, `raise N` (both "raise to N"), `allin`/`all-in`, and `q`/`quit`.
/// Amounts are read as street totals. `bet` and `raise` are interchangeable;
/// the legal set decides which one is meant. A bet above the stack passes
/// through so the table can clamp it to all-in.
///
/// # Example
///
/// ```rust
/// use tiltbench_cli::validation::{parse_player_action, ParseResult};
/// use tiltbench_engine::rules::{Action, LegalActions, RaiseKind, RaiseRange};
///
/// let legal = LegalActions {
///     fold: true,
///     check: false,
///     call: Some(10),
///     raise: Some(RaiseRange { kind: RaiseKind::Raise, min_to: 20, max_to: 500 }),
/// };
/// assert_eq!(parse_player_action("call", &legal), ParseResult::Action(Action::Call(10)));
/// assert_eq!(parse_player_action("bet 60", &legal), ParseResult::Action(Action::Raise(60)));
/// assert_eq!(parse_player_action("q", &legal), ParseResult::Quit);
/// assert!(matches!(parse_player_action("check", &legal), ParseResult::Invalid(_)));
/// ```
pub fn parse_player_action(input: &str, legal: &LegalActions) -> ParseResult {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();

    let Some(&verb) = parts.first() else {
        return ParseResult::Invalid("Empty input".to_string());
    };
    if verb == "q" || verb == "quit" {
        return ParseResult::Quit;
    }

    let action = match verb {
        "fold" | "f" => Action::Fold,
        "check" | "k" => {
            if !legal.check {
                return ParseResult::Invalid("Cannot check: there is a bet to call".into());
            }
            Action::Check
        }
        "call" | "c" => match legal.call {
            Some(amount) => Action::Call(amount),
            None if legal.check => Action::Check,
            None => return ParseResult::Invalid("Nothing to call".into()),
        },
        "allin" | "all-in" | "shove" => legal.all_in(),
        "bet" | "raise" | "b" | "r" => {
            let Some(amount) = parts.get(1) else {
                return ParseResult::Invalid(format!("{} requires an amount", verb));
            };
            let Ok(to) = amount.parse::<u32>() else {
                return ParseResult::Invalid(format!("Invalid amount: {}", amount));
            };
            let Some(range) = legal.raise else {
                return ParseResult::Invalid("Raising is not allowed here".into());
            };
            if to < range.min_to {
                return ParseResult::Invalid(format!(
                    "Minimum is {} (all-in is {})",
                    range.min_to, range.max_to
                ));
            }
            range.action(to)
        }
        other => {
            return ParseResult::Invalid(format!(
                "Unrecognized action: '{}'. Use fold, check, call, bet N, raise N, allin or q",
                other
            ))
        }
    };
    ParseResult::Action(action)
}

/// Parse a comma-separated list of strategy names, e.g. `heuristic,gto`.
pub fn parse_strategy_list(s: &str) -> Result<Vec<StrategyKind>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::parse)
        .collect()
}

/// Profile knobs must sit in `0.0..=1.0`.
pub fn validate_unit(name: &str, value: f32) -> Result<f32, String> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} must be between 0.0 and 1.0, got {}", name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiltbench_engine::rules::{RaiseKind, RaiseRange};

    fn unopened() -> LegalActions {
        LegalActions {
            fold: true,
            check: true,
            call: None,
            raise: Some(RaiseRange {
                kind: RaiseKind::Bet,
                min_to: 10,
                max_to: 300,
            }),
        }
    }

    #[test]
    fn call_with_nothing_owed_checks() {
        assert_eq!(
            parse_player_action("c", &unopened()),
            ParseResult::Action(Action::Check)
        );
    }

    #[test]
    fn raise_keyword_becomes_bet_when_unopened() {
        assert_eq!(
            parse_player_action("RAISE 40", &unopened()),
            ParseResult::Action(Action::Bet(40))
        );
    }

    #[test]
    fn oversized_bet_passes_through() {
        assert_eq!(
            parse_player_action("bet 5000", &unopened()),
            ParseResult::Action(Action::Bet(5000))
        );
    }

    #[test]
    fn undersized_and_malformed_bets_are_rejected() {
        assert!(matches!(
            parse_player_action("bet 5", &unopened()),
            ParseResult::Invalid(_)
        ));
        assert!(matches!(
            parse_player_action("bet lots", &unopened()),
            ParseResult::Invalid(_)
        ));
        assert!(matches!(
            parse_player_action("bet", &unopened()),
            ParseResult::Invalid(_)
        ));
        assert!(matches!(
            parse_player_action("", &unopened()),
            ParseResult::Invalid(_)
        ));
    }

    #[test]
    fn allin_uses_the_top_of_the_range() {
        assert_eq!(
            parse_player_action("allin", &unopened()),
            ParseResult::Action(Action::Bet(300))
        );
    }

    #[test]
    fn strategy_lists() {
        assert_eq!(
            parse_strategy_list("heuristic, mc,gto").unwrap(),
            vec![
                StrategyKind::Heuristic,
                StrategyKind::MonteCarlo,
                StrategyKind::Gto
            ]
        );
        assert!(parse_strategy_list("heuristic,nope").is_err());
    }
}
