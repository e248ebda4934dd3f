//! Position evaluation for Gomoku
//!
//! - [`patterns`]: line pattern classification and score table
//! - [`heuristic`]: static evaluation, urgency check, candidate generation

pub mod heuristic;
pub mod patterns;

pub use heuristic::{
    candidate_moves, count_patterns, evaluate, evaluate_urgent, find_winning_move, URGENT_WIN,
};
pub use patterns::{Pattern, PatternScore};
