//! Main AI Engine integrating all search components
//!
//! This module provides the engine that turns a position into a move. The
//! request pipeline follows a priority system:
//!
//! 1. **Opening book**: scripted reply during the first plies
//! 2. **Immediate win**: any move that completes five, played without search
//! 3. **Defense**: block the opponent's immediate five, played without search
//! 4. **Alpha-Beta**: iterative deepening search within the difficulty budget
//!
//! # Example
//!
//! ```
//! use gomoku::{AIEngine, Difficulty, EngineConfig, Grid, Side};
//!
//! let mut engine = AIEngine::new(EngineConfig::default()).unwrap();
//! let grid = Grid::from_stones(15, &[(7, 7, Side::Black)]).unwrap();
//!
//! let result = engine.get_move(&grid, Side::White, Difficulty::Easy, 1).unwrap();
//! println!("Best move: {:?} via {}", result.best_move, result.source);
//! ```

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use tracing::{debug, info};

use crate::board::{Grid, Pos, Side};
use crate::config::{Difficulty, EngineConfig};
use crate::error::{EngineError, Result};
use crate::eval::{evaluate, find_winning_move};
use crate::opening::OpeningBook;
use crate::search::{
    SearchLimits, SearchProgress, SearchResult, SearchSource, Searcher, TTStats, WIN_SCORE,
};

impl SearchResult {
    /// Result for a scripted book reply
    #[inline]
    fn opening_book(pos: Pos, time_ms: u64) -> Self {
        Self {
            best_move: Some(pos),
            score: 0,
            depth: 0,
            nodes: 0,
            cutoffs: 0,
            time_ms,
            source: SearchSource::OpeningBook,
        }
    }

    /// Result for an immediate win
    #[inline]
    fn immediate_win(pos: Pos, time_ms: u64) -> Self {
        Self {
            best_move: Some(pos),
            score: WIN_SCORE,
            depth: 1,
            nodes: 1,
            cutoffs: 0,
            time_ms,
            source: SearchSource::ImmediateWin,
        }
    }

    /// Result for a forced block
    #[inline]
    fn defense(pos: Pos, score: i32, time_ms: u64) -> Self {
        Self {
            best_move: Some(pos),
            score,
            depth: 1,
            nodes: 1,
            cutoffs: 0,
            time_ms,
            source: SearchSource::Defense,
        }
    }
}

/// Main AI Engine for Gomoku.
///
/// Owns one [`Searcher`] (and therefore one transposition table, reused
/// across calls) and a reference to the process-wide opening book. A single
/// engine is strictly sequential; the [`crate::Coordinator`] runs one on a
/// worker thread for asynchronous use.
pub struct AIEngine {
    config: EngineConfig,
    searcher: Searcher,
    book: Option<&'static OpeningBook>,
}

impl AIEngine {
    /// Build an engine.
    ///
    /// Fails if the board size is unsupported or the embedded opening table
    /// cannot be parsed.
    pub fn new(config: EngineConfig) -> Result<Self> {
        // Validates the size
        Grid::new(config.board_size)?;

        let book = if config.use_opening_book {
            Some(OpeningBook::builtin()?)
        } else {
            None
        };

        Ok(Self {
            config,
            searcher: Searcher::new(config.board_size, config.tt_capacity),
            book,
        })
    }

    /// Get the best move for `side` at the given difficulty.
    ///
    /// `move_count` is the number of plies played so far; it gates the
    /// opening book.
    pub fn get_move(
        &mut self,
        grid: &Grid,
        side: Side,
        difficulty: Difficulty,
        move_count: usize,
    ) -> Result<SearchResult> {
        let never = AtomicBool::new(false);
        self.get_move_with(grid, side, difficulty, move_count, &never, &mut |_| {})
    }

    /// Like [`Self::get_move`], with cooperative cancellation and progress.
    ///
    /// # Search Priority
    ///
    /// 1. Opening book (first plies only)
    /// 2. Immediate winning move
    /// 3. Block of the opponent's immediate win
    /// 4. Alpha-beta search with the difficulty's depth and time budget
    pub fn get_move_with(
        &mut self,
        grid: &Grid,
        side: Side,
        difficulty: Difficulty,
        move_count: usize,
        abort: &AtomicBool,
        on_progress: &mut dyn FnMut(SearchProgress),
    ) -> Result<SearchResult> {
        if grid.size() != self.config.board_size {
            return Err(EngineError::BoardSizeMismatch {
                expected: self.config.board_size,
                actual: grid.size(),
            });
        }

        let start = Instant::now();

        // 0. Opening book for fast early game response
        if let Some(pos) = self.book.and_then(|b| b.find_move(grid, move_count, side)) {
            debug!(%pos, move_count, "opening book hit");
            let result = SearchResult::opening_book(pos, elapsed_ms(start));
            log_result(&result, side);
            return Ok(result);
        }

        // 1. Immediate winning move
        if let Some(pos) = find_winning_move(grid, side) {
            let result = SearchResult::immediate_win(pos, elapsed_ms(start));
            log_result(&result, side);
            return Ok(result);
        }

        // 2. Opponent wins next move unless blocked
        if let Some(pos) = find_winning_move(grid, side.opponent()) {
            let mut after = grid.clone();
            after.set(pos, side.stone());
            let result = SearchResult::defense(pos, evaluate(&after, side), elapsed_ms(start));
            log_result(&result, side);
            return Ok(result);
        }

        // 3. Regular Alpha-Beta search
        let limits = SearchLimits::from(&difficulty.profile());
        let result = self
            .searcher
            .search_with(grid, side, &limits, abort, on_progress)?;
        log_result(&result, side);

        let stats = self.searcher.tt_stats();
        debug!(
            size = stats.size,
            capacity = stats.capacity,
            hit_rate = stats.hit_rate,
            "transposition table"
        );
        Ok(result)
    }

    /// Clear the transposition table (e.g. for a new game).
    pub fn clear_cache(&mut self) {
        self.searcher.clear_tt();
    }

    /// Get transposition table statistics.
    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.searcher.tt_stats()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board_size(&self) -> usize {
        self.config.board_size
    }
}

fn log_result(result: &SearchResult, side: Side) {
    info!(
        %side,
        source = %result.source,
        best_move = ?result.best_move,
        score = result.score,
        depth = result.depth,
        nodes = result.nodes,
        cutoffs = result.cutoffs,
        time_ms = result.time_ms,
        "search finished"
    );
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> AIEngine {
        AIEngine::new(EngineConfig::default()).unwrap()
    }

    fn no_book() -> AIEngine {
        AIEngine::new(EngineConfig {
            use_opening_book: false,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_engine_rejects_bad_board_size() {
        let config = EngineConfig::default().with_board_size(3);
        assert!(matches!(
            AIEngine::new(config),
            Err(EngineError::InvalidBoardSize { size: 3, .. })
        ));
    }

    #[test]
    fn test_engine_rejects_mismatched_grid() {
        let mut engine = engine();
        let grid = Grid::new(9).unwrap();
        assert!(matches!(
            engine.get_move(&grid, Side::Black, Difficulty::Easy, 0),
            Err(EngineError::BoardSizeMismatch { expected: 15, actual: 9 })
        ));
    }

    #[test]
    fn test_engine_uses_opening_book() {
        let mut engine = engine();
        let result = engine
            .get_move(&Grid::default(), Side::Black, Difficulty::Master, 0)
            .unwrap();
        assert_eq!(result.best_move, Some(Pos::new(7, 7)));
        assert_eq!(result.source, SearchSource::OpeningBook);
    }

    #[test]
    fn test_engine_empty_board_without_book() {
        let mut engine = no_book();
        let result = engine
            .get_move(&Grid::default(), Side::Black, Difficulty::Easy, 0)
            .unwrap();
        assert_eq!(result.best_move, Some(Pos::new(7, 7)));
        assert_eq!(result.source, SearchSource::AlphaBeta);
    }

    #[test]
    fn test_engine_finds_immediate_win() {
        let stones: Vec<_> = (0..4)
            .map(|i| (9, i, Side::Black))
            .chain([(3, 3, Side::White), (3, 4, Side::White), (4, 3, Side::White)])
            .collect();
        let grid = Grid::from_stones(15, &stones).unwrap();

        let mut engine = engine();
        let result = engine.get_move(&grid, Side::Black, Difficulty::Hard, 7).unwrap();

        assert_eq!(result.best_move, Some(Pos::new(9, 4)));
        assert_eq!(result.source, SearchSource::ImmediateWin);
        assert_eq!(result.depth, 1);
        assert!(result.score >= WIN_SCORE);
    }

    #[test]
    fn test_engine_blocks_opponent_win() {
        let stones: Vec<_> = (0..4)
            .map(|i| (9, i, Side::White))
            .chain([(10, 5, Side::Black), (4, 4, Side::Black), (2, 2, Side::Black)])
            .collect();
        let grid = Grid::from_stones(15, &stones).unwrap();

        let mut engine = engine();
        let result = engine.get_move(&grid, Side::Black, Difficulty::Hard, 7).unwrap();

        assert_eq!(result.best_move, Some(Pos::new(9, 4)));
        assert_eq!(result.source, SearchSource::Defense);
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn test_engine_win_beats_defense() {
        // Both sides have four; take the win
        let stones: Vec<_> = (0..4)
            .map(|i| (2, i + 2, Side::Black))
            .chain((0..4).map(|i| (12, i + 2, Side::White)))
            .collect();
        let grid = Grid::from_stones(15, &stones).unwrap();

        let mut engine = engine();
        let result = engine.get_move(&grid, Side::White, Difficulty::Easy, 8).unwrap();
        assert_eq!(result.source, SearchSource::ImmediateWin);
        assert_eq!(result.best_move.map(|p| p.row), Some(12));
    }

    #[test]
    fn test_engine_easy_reports_fixed_depth() {
        let grid = Grid::from_stones(
            15,
            &[(7, 7, Side::Black), (8, 8, Side::White), (6, 8, Side::Black)],
        )
        .unwrap();
        let mut engine = no_book();
        let result = engine.get_move(&grid, Side::White, Difficulty::Easy, 3).unwrap();
        assert_eq!(result.depth, 2);
    }

    #[test]
    fn test_engine_clear_cache() {
        let grid = Grid::from_stones(15, &[(7, 7, Side::Black)]).unwrap();
        let mut engine = no_book();
        let _ = engine.get_move(&grid, Side::White, Difficulty::Easy, 1).unwrap();
        assert!(engine.tt_stats().size > 0);

        engine.clear_cache();
        assert_eq!(engine.tt_stats().size, 0);
    }
}
