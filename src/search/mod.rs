//! Search module for Gomoku AI
//!
//! Contains:
//! - Zobrist hashing for position identification
//! - Transposition table for caching search results
//! - Alpha-Beta search with iterative deepening

pub mod alphabeta;
pub mod tt;
pub mod zobrist;

pub use alphabeta::{
    SearchLimits, SearchProgress, SearchResult, SearchSource, Searcher, LOSE_SCORE, WIN_SCORE,
};
pub use tt::{EntryType, TTEntry, TTStats, TranspositionTable};
pub use zobrist::ZobristTable;
