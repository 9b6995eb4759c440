use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// A decision at a betting turn.
///
/// `Bet` and `Raise` carry the street total the player puts in ("raise to"),
/// not the increment. `Call` carries the chips added to match.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "amount")]
pub enum Action {
    Fold,
    Check,
    Call(u32),
    Bet(u32),
    Raise(u32),
}

impl Action {
    /// Chip figure attached to the action (0 for fold/check).
    pub fn amount(&self) -> u32 {
        match *self {
            Action::Fold | Action::Check => 0,
            Action::Call(a) | Action::Bet(a) | Action::Raise(a) => a,
        }
    }

    pub fn is_aggressive(&self) -> bool {
        matches!(self, Action::Bet(_) | Action::Raise(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Fold => write!(f, "fold"),
            Action::Check => write!(f, "check"),
            Action::Call(a) => write!(f, "call {}", a),
            Action::Bet(a) => write!(f, "bet {}", a),
            Action::Raise(a) => write!(f, "raise to {}", a),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaiseKind {
    /// Opening the betting on a street
    Bet,
    /// Increasing an existing bet
    Raise,
}

/// Inclusive "raise to" bounds for a bet or raise.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RaiseRange {
    pub kind: RaiseKind,
    pub min_to: u32,
    pub max_to: u32,
}

impl RaiseRange {
    pub fn action(&self, to: u32) -> Action {
        match self.kind {
            RaiseKind::Bet => Action::Bet(to),
            RaiseKind::Raise => Action::Raise(to),
        }
    }

    /// True when the only raise available is the all-in.
    pub fn is_all_in_only(&self) -> bool {
        self.min_to == self.max_to
    }
}

/// The set of actions a seat may take at its turn.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LegalActions {
    pub fold: bool,
    pub check: bool,
    /// Chips needed to call, already capped at the stack
    pub call: Option<u32>,
    pub raise: Option<RaiseRange>,
}

impl LegalActions {
    /// Nothing can be done (used when a seat is not to act).
    pub fn none() -> Self {
        Self {
            fold: false,
            check: false,
            call: None,
            raise: None,
        }
    }

    pub fn contains(&self, action: &Action) -> bool {
        match *action {
            Action::Fold => self.fold,
            Action::Check => self.check,
            Action::Call(a) => self.call == Some(a),
            Action::Bet(to) | Action::Raise(to) => self.raise.is_some_and(|r| {
                r.action(to) == *action && (r.min_to..=r.max_to).contains(&to)
            }),
        }
    }

    /// The substitute used when a decision is illegal or late: check if possible, else fold.
    pub fn minimal(&self) -> Action {
        if self.check {
            Action::Check
        } else {
            Action::Fold
        }
    }

    /// Check when free, otherwise call.
    pub fn passive(&self) -> Action {
        match (self.check, self.call) {
            (true, _) => Action::Check,
            (false, Some(c)) => Action::Call(c),
            _ => Action::Fold,
        }
    }

    /// A bet/raise to `to`, clamped into the legal range. `None` when raising is closed.
    pub fn raise_to(&self, to: u32) -> Option<Action> {
        self.raise
            .map(|r| r.action(to.clamp(r.min_to, r.max_to)))
    }

    /// Everything in: the maximum raise, or the call when raising is closed.
    pub fn all_in(&self) -> Action {
        match self.raise {
            Some(r) => r.action(r.max_to),
            None => self.passive(),
        }
    }
}

/// The betting facts needed to compute one seat's legal actions.
#[derive(Debug, Clone, Copy)]
pub struct Situation {
    pub stack: u32,
    pub street_contribution: u32,
    pub bet_to_match: u32,
    /// Size of the last full bet or raise increment on this street
    pub last_raise_size: u32,
    pub big_blind: u32,
    /// An incomplete all-in raise does not reopen betting for this seat
    pub raise_locked: bool,
    /// Another live player still has chips to respond to a raise
    pub opponents_can_respond: bool,
}

/// Legal actions under no-limit, table-stakes rules.
///
/// # Examples
///
/// ```
/// use tiltbench_engine::rules::{legal_actions, Situation, RaiseKind};
///
/// let legal = legal_actions(&Situation {
///     stack: 990,
///     street_contribution: 10,
///     bet_to_match: 30,
///     last_raise_size: 20,
///     big_blind: 10,
///     raise_locked: false,
///     opponents_can_respond: true,
/// });
/// assert_eq!(legal.call, Some(20));
/// let raise = legal.raise.unwrap();
/// assert_eq!(raise.kind, RaiseKind::Raise);
/// assert_eq!((raise.min_to, raise.max_to), (50, 1000));
/// ```
pub fn legal_actions(s: &Situation) -> LegalActions {
    let to_call = s.bet_to_match.saturating_sub(s.street_contribution);
    let check = to_call == 0;
    let call = (to_call > 0).then(|| to_call.min(s.stack));

    let raise = if s.stack > to_call && !s.raise_locked && s.opponents_can_respond {
        let max_to = s.street_contribution + s.stack;
        let (kind, min_to) = if s.bet_to_match == 0 {
            (RaiseKind::Bet, s.big_blind.max(1))
        } else {
            (
                RaiseKind::Raise,
                s.bet_to_match + s.last_raise_size.max(s.big_blind),
            )
        };
        Some(RaiseRange {
            kind,
            min_to: min_to.min(max_to),
            max_to,
        })
    } else {
        None
    };

    LegalActions {
        fold: true,
        check,
        call,
        raise,
    }
}

/// An action accepted by [`validate_action`], possibly clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedAction {
    pub action: Action,
    /// Original "raise to" when it exceeded the stack and was clamped to all-in
    pub clamped_from: Option<u32>,
}

/// Check `action` against `legal`, clamping oversized requests.
///
/// A bet above the stack becomes the all-in raise. A call above the amount
/// owed becomes the call, and so does any bet or raise from a seat that may
/// only call. Both report the original figure in `clamped_from`.
///
/// # Errors
///
/// [`GameError::IllegalAction`] when the action is not offered: checking while
/// facing a bet, calling short, betting when a raise is required, or raising
/// below the minimum.
///
/// ```
/// use tiltbench_engine::rules::{legal_actions, validate_action, Action, Situation};
///
/// let legal = legal_actions(&Situation {
///     stack: 80,
///     street_contribution: 0,
///     bet_to_match: 0,
///     last_raise_size: 0,
///     big_blind: 10,
///     raise_locked: false,
///     opponents_can_respond: true,
/// });
/// let v = validate_action(0, &legal, Action::Bet(500)).unwrap();
/// assert_eq!(v.action, Action::Bet(80));
/// assert_eq!(v.clamped_from, Some(500));
/// assert!(validate_action(0, &legal, Action::Call(10)).is_err());
///
/// let short = legal_actions(&Situation {
///     stack: 90,
///     street_contribution: 10,
///     bet_to_match: 500,
///     last_raise_size: 490,
///     big_blind: 10,
///     raise_locked: false,
///     opponents_can_respond: true,
/// });
/// let v = validate_action(1, &short, Action::Raise(5000)).unwrap();
/// assert_eq!(v.action, Action::Call(90));
/// assert_eq!(v.clamped_from, Some(5000));
/// ```
pub fn validate_action(
    seat: usize,
    legal: &LegalActions,
    action: Action,
) -> Result<ValidatedAction, GameError> {
    let illegal = |reason: String| GameError::IllegalAction {
        seat,
        action,
        reason,
    };
    let ok = |action| ValidatedAction {
        action,
        clamped_from: None,
    };
    match action {
        Action::Fold if legal.fold => Ok(ok(action)),
        Action::Fold => Err(illegal("folding is not available".into())),
        Action::Check if legal.check => Ok(ok(action)),
        Action::Check => Err(illegal(format!(
            "cannot check while facing {}",
            legal.call.unwrap_or(0)
        ))),
        Action::Call(amount) => match legal.call {
            Some(c) if c == amount => Ok(ok(action)),
            Some(c) if amount > c => Ok(ValidatedAction {
                action: Action::Call(c),
                clamped_from: Some(amount),
            }),
            Some(c) => Err(illegal(format!("call amount is {}, not {}", c, amount))),
            None => Err(illegal("there is nothing to call".into())),
        },
        Action::Bet(to) | Action::Raise(to) => {
            let Some(range) = legal.raise else {
                // A stack that cannot raise can still put in what it owes.
                return match legal.call {
                    Some(c) => Ok(ValidatedAction {
                        action: Action::Call(c),
                        clamped_from: Some(to),
                    }),
                    None => Err(illegal("betting is closed for this seat".into())),
                };
            };
            if range.action(to) != action {
                return Err(illegal(format!("expected a {:?}", range.kind).to_lowercase()));
            }
            if to > range.max_to {
                return Ok(ValidatedAction {
                    action: range.action(range.max_to),
                    clamped_from: Some(to),
                });
            }
            if to < range.min_to {
                return Err(illegal(format!(
                    "minimum is {}, got {}",
                    range.min_to, to
                )));
            }
            Ok(ok(action))
        }
    }
}
