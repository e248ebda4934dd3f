//! Difficulty levels and engine configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::DEFAULT_BOARD_SIZE;
use crate::error::{EngineError, Result};

/// Default transposition table capacity in entries
pub const DEFAULT_TT_CAPACITY: usize = 100_000;

/// Named strength level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Master,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Master,
    ];

    /// Search budget for this level
    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                max_depth: 2,
                time_limit_ms: 100,
                use_iterative_deepening: false,
                use_transposition_table: true,
            },
            Difficulty::Medium => DifficultyProfile {
                max_depth: 4,
                time_limit_ms: 300,
                use_iterative_deepening: true,
                use_transposition_table: true,
            },
            Difficulty::Hard => DifficultyProfile {
                max_depth: 6,
                time_limit_ms: 1000,
                use_iterative_deepening: true,
                use_transposition_table: true,
            },
            Difficulty::Master => DifficultyProfile {
                max_depth: 8,
                time_limit_ms: 3000,
                use_iterative_deepening: true,
                use_transposition_table: true,
            },
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Difficulty::Easy => "shallow and fast, good for beginners",
            Difficulty::Medium => "moderate depth with iterative deepening",
            Difficulty::Hard => "deep search, punishes loose play",
            Difficulty::Master => "maximal depth and time budget",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Master => "master",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EngineError::UnknownDifficulty(s.to_string()))
    }
}

/// Depth and time budget of one difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub max_depth: i8,
    pub time_limit_ms: u64,
    pub use_iterative_deepening: bool,
    pub use_transposition_table: bool,
}

/// Engine construction options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Board edge length; validated when the engine is built
    pub board_size: usize,
    /// Transposition table capacity in entries
    pub tt_capacity: usize,
    /// Consult the opening book during the first plies
    pub use_opening_book: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            tt_capacity: DEFAULT_TT_CAPACITY,
            use_opening_book: true,
        }
    }
}

impl EngineConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_board_size(mut self, board_size: usize) -> Self {
        self.board_size = board_size;
        self
    }
}
