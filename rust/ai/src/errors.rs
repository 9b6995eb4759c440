use thiserror::Error;
use tiltbench_engine::errors::GameError;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Computation cancelled")]
    Cancelled,
    #[error("Seat {seat} has no hole cards in this snapshot")]
    MissingHoleCards { seat: usize },
    #[error(transparent)]
    Engine(#[from] GameError),
    #[error("Strategy table I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Strategy table is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("EV worker stopped unexpectedly")]
    WorkerGone,
}
