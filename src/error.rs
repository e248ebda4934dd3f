//! Error types for the Gomoku engine
//!
//! Invalid placements are reported by `Board::place` returning `false` and a
//! search running out of time still produces a result, so neither shows up
//! here. These variants cover construction failures and misuse of the
//! asynchronous search protocol.

use thiserror::Error;

/// Errors that can occur in the engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Board size outside the supported range
    #[error("invalid board size {size} (must be {min}-{max})")]
    InvalidBoardSize { size: usize, min: usize, max: usize },

    /// Grid handed to an engine configured for another size
    #[error("grid is {actual}x{actual} but the engine expects {expected}x{expected}")]
    BoardSizeMismatch { expected: usize, actual: usize },

    /// A search request arrived while another one is pending
    #[error("another search is in progress")]
    SearchInProgress,

    /// Waiting on a coordinator with nothing in flight
    #[error("no search is pending")]
    NoSearchPending,

    /// The search worker thread could not be started
    #[error("failed to spawn search worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    /// The search worker went away before answering
    #[error("search worker disconnected")]
    WorkerDisconnected,

    /// The engine could not be built inside the worker
    #[error("search engine failed to initialize: {reason}")]
    Initialization { reason: String },

    /// The search itself panicked
    #[error("search failed: {reason}")]
    SearchPanicked { reason: String },

    /// Difficulty name not recognized
    #[error("unknown difficulty {0:?}")]
    UnknownDifficulty(String),

    /// Opening table or configuration JSON could not be parsed
    #[error("invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
