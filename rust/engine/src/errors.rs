use thiserror::Error;

use crate::cards::Card;
use crate::rules::Action;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid hand size: {count} cards (expected 5 to 7)")]
    InvalidHandSize { count: usize },
    #[error("Duplicate card: {0}")]
    DuplicateCard(Card),
    #[error("Invalid card code: {0:?}")]
    InvalidCard(String),
    #[error("Deck is empty")]
    EmptyDeck,
    #[error("Illegal action {action:?} for seat {seat}: {reason}")]
    IllegalAction {
        seat: usize,
        action: Action,
        reason: String,
    },
    #[error("Seat {seat} requested {requested} chips with only {available} behind")]
    InsufficientStack {
        seat: usize,
        requested: u32,
        available: u32,
    },
    #[error("Seat {seat} took {elapsed_ms}ms to decide (budget {budget_ms}ms)")]
    StrategyTimeout {
        seat: usize,
        elapsed_ms: u64,
        budget_ms: u64,
    },
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Chip conservation violated: expected {expected}, found {actual}")]
    EngineInvariantViolation { expected: u64, actual: u64 },
    #[error("It's not seat {actual}'s turn (expected seat {expected})")]
    NotPlayersTurn { expected: usize, actual: usize },
    #[error("No hand in progress")]
    NoHandInProgress,
    #[error("Hand already complete")]
    HandAlreadyComplete,
    #[error("At least two funded players are required to start a hand")]
    NotEnoughPlayers,
    #[error("Operation cancelled")]
    Cancelled,
}
