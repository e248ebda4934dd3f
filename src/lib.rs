//! Gomoku AI Engine
//!
//! A freestyle Gomoku engine: five or more in a row wins, on square boards
//! from 5x5 to 25x25 (15x15 by default). No forbidden moves, no captures.
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Grid, sides, move history and win detection
//! - [`eval`]: Pattern evaluation and candidate move generation
//! - [`search`]: Zobrist hashing, transposition table, alpha-beta search
//! - [`opening`]: Embedded opening book
//! - [`config`]: Difficulty levels and engine options
//! - [`engine`]: Synchronous request pipeline
//! - [`coordinator`]: Worker thread running the engine asynchronously
//!
//! # Quick Start
//!
//! ```
//! use gomoku::{AIEngine, Board, Difficulty, EngineConfig, Side};
//!
//! let mut board = Board::default();
//! let mut engine = AIEngine::new(EngineConfig::default()).unwrap();
//!
//! board.place(7, 7, Side::Black);
//!
//! // AI responds as White
//! let result = engine
//!     .get_move(board.grid(), Side::White, Difficulty::Easy, board.move_count())
//!     .unwrap();
//! if let Some(pos) = result.best_move {
//!     board.place(pos.row.into(), pos.col.into(), Side::White);
//!     println!("AI plays at {pos}");
//! }
//! ```
//!
//! # Search Priority
//!
//! 1. Opening book during the first plies
//! 2. Immediate winning move
//! 3. Block of the opponent's immediate win
//! 4. Alpha-beta search with iterative deepening and transposition table

pub mod board;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod eval;
pub mod opening;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, Grid, Pos, Side, Stone, DEFAULT_BOARD_SIZE};
pub use config::{Difficulty, DifficultyProfile, EngineConfig};
pub use coordinator::{Coordinator, SearchEvent};
pub use engine::AIEngine;
pub use error::{EngineError, Result};
pub use search::{SearchProgress, SearchResult, SearchSource};
