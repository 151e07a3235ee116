//! Error types for the undo manager

use thiserror::Error;
use undograph_history::HistoryError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UndoError<C> {
    /// Applying an undo/redo produced a different change than the one computed
    #[error("Unexpected change received.\nExpected:\n{expected:?}\nReceived:\n{received:?}")]
    UnexpectedChange { expected: C, received: C },

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Undo manager is closed")]
    Closed,
}

pub type UndoResult<T, C> = Result<T, UndoError<C>>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid history config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
