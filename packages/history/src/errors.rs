//! Error types for change queues

use std::fmt;
use thiserror::Error;

/// Which way along the active path an operation looked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Backward => write!(f, "backward"),
            Direction::Forward => write!(f, "forward"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("No change {0} of the current position")]
    EmptyHistory(Direction),

    #[error("Redo change does not match the change recorded in history")]
    InconsistentStep,

    #[error("Change queue is closed")]
    Closed,
}

pub type HistoryResult<T> = Result<T, HistoryError>;
