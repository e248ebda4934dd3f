//! Alpha-Beta search with iterative deepening and transposition table
//!
//! This module implements the core search algorithm for the Gomoku AI.
//! It uses negamax with alpha-beta pruning and a transposition table.
//!
//! # Features
//!
//! - Iterative deepening for time management and move ordering
//! - Transposition table reused across search calls
//! - Cooperative cancellation through an abort flag
//! - Candidate generation with proximity filtering
//!
//! # Example
//!
//! ```
//! use gomoku::board::{Grid, Side};
//! use gomoku::search::{SearchLimits, Searcher};
//!
//! let mut searcher = Searcher::new(15, 10_000);
//! let grid = Grid::new(15).unwrap();
//!
//! let result = searcher
//!     .search(&grid, Side::Black, &SearchLimits::fixed_depth(2))
//!     .unwrap();
//! assert_eq!(result.best_move.map(|p| (p.row, p.col)), Some((7, 7)));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::board::{Grid, Pos, Side, Stone};
use crate::config::DifficultyProfile;
use crate::error::{EngineError, Result};
use crate::eval::{candidate_moves, evaluate};

use super::{EntryType, TTStats, TranspositionTable, ZobristTable};

/// Score of a proven win for the side to move
pub const WIN_SCORE: i32 = 100_000_000;

/// Score of a proven loss for the side to move
pub const LOSE_SCORE: i32 = -WIN_SCORE;

/// Infinity score for alpha-beta bounds
const INF: i32 = 1_000_000_000;

/// Maximum moves to consider at root.
const MAX_ROOT_MOVES: usize = 20;

/// Maximum moves at internal nodes with more than two plies remaining.
const MAX_INTERNAL_MOVES: usize = 20;

/// Maximum moves near the leaves, where nodes are cheap.
const MAX_LEAF_MOVES: usize = 40;

/// Remaining depth at or below which [`MAX_LEAF_MOVES`] applies.
const LEAF_DEPTH: i8 = 2;

/// Candidates drawn from the proximity ranking per kept move, before the
/// evaluation re-rank trims back to the move limit.
const CANDIDATE_POOL_FACTOR: usize = 2;

/// The wall clock is read once every this many nodes.
const TIME_CHECK_INTERVAL: u64 = 64;

/// Minimum interval between in-search progress reports.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Which stage of the pipeline produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    /// Scripted reply from the opening book
    OpeningBook,
    /// The side to move completes five immediately
    ImmediateWin,
    /// Blocking the opponent's immediate five
    Defense,
    /// Full alpha-beta search
    AlphaBeta,
}

impl std::fmt::Display for SearchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SearchSource::OpeningBook => "opening book",
            SearchSource::ImmediateWin => "immediate win",
            SearchSource::Defense => "defense",
            SearchSource::AlphaBeta => "alpha-beta",
        };
        f.write_str(name)
    }
}

/// Search result containing the best move found and associated statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Best move found; `None` only when the grid has no empty cell
    pub best_move: Option<Pos>,
    /// Evaluation score from the mover's perspective
    pub score: i32,
    /// Deepest fully completed depth (0 if none completed)
    pub depth: i8,
    /// Total nodes searched
    pub nodes: u64,
    /// Beta cutoffs, for diagnostics
    pub cutoffs: u64,
    /// Wall-clock time spent
    pub time_ms: u64,
    /// Stage that produced the move
    pub source: SearchSource,
}

impl SearchResult {
    /// Whether the score is a proven win for the mover
    #[inline]
    pub fn is_win(&self) -> bool {
        self.score >= WIN_SCORE
    }
}

/// Snapshot of a running search, reported through the progress hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProgress {
    /// Depth currently being searched (or just completed)
    pub depth: i8,
    /// Nodes visited so far
    pub nodes: u64,
    /// Time since the search started
    pub elapsed_ms: u64,
}

/// Depth and time budget for one search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: i8,
    /// `None` searches until `max_depth` completes or the abort flag is set
    pub time_limit: Option<Duration>,
    pub iterative_deepening: bool,
    pub use_transposition_table: bool,
}

impl SearchLimits {
    /// Single pass at `max_depth` with no time limit.
    #[must_use]
    pub fn fixed_depth(max_depth: i8) -> Self {
        Self {
            max_depth,
            time_limit: None,
            iterative_deepening: false,
            use_transposition_table: true,
        }
    }
}

impl From<&DifficultyProfile> for SearchLimits {
    fn from(profile: &DifficultyProfile) -> Self {
        Self {
            max_depth: profile.max_depth,
            time_limit: Some(Duration::from_millis(profile.time_limit_ms)),
            iterative_deepening: profile.use_iterative_deepening,
            use_transposition_table: profile.use_transposition_table,
        }
    }
}

/// Outcome of one root pass
struct RootResult {
    best_move: Option<Pos>,
    score: i32,
    /// False when the pass was interrupted before visiting every root move
    completed: bool,
}

// =============================================================================
// Worker: per-call search state
// =============================================================================

/// Per-call search state. Borrows the persistent table and hasher from the
/// [`Searcher`] and owns the counters and the abort bookkeeping.
struct Worker<'a> {
    zobrist: &'a ZobristTable,
    tt: &'a mut TranspositionTable,
    limits: SearchLimits,
    abort: &'a AtomicBool,
    on_progress: &'a mut dyn FnMut(SearchProgress),
    start: Instant,
    last_progress: Instant,
    current_depth: i8,
    nodes: u64,
    cutoffs: u64,
    stopped: bool,
}

impl Worker<'_> {
    /// Check the abort flag on every call and the clock every
    /// [`TIME_CHECK_INTERVAL`] nodes.
    #[inline]
    fn should_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if self.abort.load(Ordering::Relaxed) {
            self.stopped = true;
            return true;
        }
        if self.nodes % TIME_CHECK_INTERVAL == 0 {
            return self.check_clock();
        }
        false
    }

    /// Read the wall clock, stopping if over budget and emitting a
    /// throttled progress report otherwise.
    fn check_clock(&mut self) -> bool {
        if self.abort.load(Ordering::Relaxed) {
            self.stopped = true;
            return true;
        }
        if let Some(limit) = self.limits.time_limit {
            if self.start.elapsed() >= limit {
                self.stopped = true;
                return true;
            }
        }
        if self.last_progress.elapsed() >= PROGRESS_INTERVAL {
            self.report_progress();
        }
        false
    }

    fn report_progress(&mut self) {
        self.last_progress = Instant::now();
        (self.on_progress)(SearchProgress {
            depth: self.current_depth,
            nodes: self.nodes,
            elapsed_ms: elapsed_ms(self.start),
        });
    }

    fn time_exhausted(&self) -> bool {
        self.limits
            .time_limit
            .is_some_and(|limit| self.start.elapsed() >= limit)
    }

    /// Run the configured search: iterative deepening or a single pass.
    fn run(&mut self, grid: &mut Grid, side: Side) -> SearchResult {
        let hash = self.zobrist.hash(grid);

        if !self.limits.iterative_deepening {
            let depth = self.limits.max_depth.max(1);
            self.current_depth = depth;
            self.tt.increment_age();
            let root = self.search_root(grid, side, depth, hash, None);
            return self.finish(root.best_move, root.score, depth);
        }

        let mut best: Option<(Option<Pos>, i32, i8)> = None;
        let mut partial: Option<RootResult> = None;

        for depth in 1..=self.limits.max_depth.max(1) {
            self.current_depth = depth;
            self.tt.increment_age();

            let prev_best = best.and_then(|(mv, _, _)| mv);
            let root = self.search_root(grid, side, depth, hash, prev_best);

            if !root.completed {
                // Keep the last fully completed depth
                partial = Some(root);
                break;
            }

            debug!(
                depth,
                score = root.score,
                nodes = self.nodes,
                elapsed_ms = elapsed_ms(self.start),
                "depth completed"
            );
            best = Some((root.best_move, root.score, depth));
            self.report_progress();

            if root.score.abs() >= WIN_SCORE || self.time_exhausted() {
                break;
            }
        }

        match (best, partial) {
            (Some((mv, score, depth)), _) => self.finish(mv, score, depth),
            (None, Some(root)) => self.finish(root.best_move, root.score, 0),
            (None, None) => self.finish(None, 0, 0),
        }
    }

    fn finish(&self, best_move: Option<Pos>, score: i32, depth: i8) -> SearchResult {
        SearchResult {
            best_move,
            score,
            depth,
            nodes: self.nodes,
            cutoffs: self.cutoffs,
            time_ms: elapsed_ms(self.start),
            source: SearchSource::AlphaBeta,
        }
    }

    /// Root-level search with full alpha-beta window.
    fn search_root(
        &mut self,
        grid: &mut Grid,
        side: Side,
        depth: i8,
        hash: u64,
        prev_best: Option<Pos>,
    ) -> RootResult {
        let key = hash ^ self.zobrist.side_key(side);
        let hint = prev_best.or_else(|| self.tt.best_move(key));
        // Root is visited once per depth; rank every candidate
        let moves = ordered_moves(grid, side, usize::MAX, MAX_ROOT_MOVES, hint);

        let mut alpha = -INF;
        let beta = INF;
        let mut best_move = moves.first().copied();
        let mut best_score = -INF;
        let mut completed = true;

        for mv in moves {
            if self.stopped || self.check_clock() {
                completed = false;
                break;
            }

            let stone = side.stone();
            grid.set(mv, stone);
            let child_hash = self.zobrist.update_hash(hash, mv, Stone::Empty, stone);
            let score = -self.negamax(grid, side.opponent(), depth - 1, -beta, -alpha, child_hash, mv);
            grid.set(mv, Stone::Empty);

            if self.stopped {
                completed = false;
                break;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(score);
        }

        if best_move.is_none() {
            // No empty cell left
            return RootResult {
                best_move: None,
                score: 0,
                completed,
            };
        }
        if best_score == -INF {
            // Interrupted before the first root move finished
            best_score = evaluate(grid, side);
        }

        if completed && self.limits.use_transposition_table {
            self.tt.store(key, depth, best_score, EntryType::Exact, best_move);
        }

        RootResult {
            best_move,
            score: best_score,
            completed,
        }
    }

    /// Negamax with alpha-beta pruning.
    ///
    /// `hash` is the side-agnostic grid hash; `last` is the move that led
    /// here, played by the opponent of `side`.
    #[allow(clippy::too_many_arguments)]
    fn negamax(
        &mut self,
        grid: &mut Grid,
        side: Side,
        depth: i8,
        mut alpha: i32,
        beta: i32,
        hash: u64,
        last: Pos,
    ) -> i32 {
        self.nodes += 1;

        if self.should_stop() {
            return evaluate(grid, side);
        }

        let key = hash ^ self.zobrist.side_key(side);
        let mut tt_move = None;
        if self.limits.use_transposition_table {
            if let Some(entry) = self.tt.lookup(key, depth) {
                if let Some(score) = entry.usable_score(alpha, beta) {
                    return score;
                }
                tt_move = entry.best_move;
            } else {
                tt_move = self.tt.best_move(key);
            }
        }

        // The opponent just completed five; prefer the slowest loss
        if grid.is_win_at(last) {
            return LOSE_SCORE - i32::from(depth.max(0));
        }
        if grid.is_full() {
            return 0;
        }
        if depth <= 0 {
            return evaluate(grid, side);
        }

        let limit = if depth <= LEAF_DEPTH {
            MAX_LEAF_MOVES
        } else {
            MAX_INTERNAL_MOVES
        };
        let moves = ordered_moves(
            grid,
            side,
            limit.saturating_mul(CANDIDATE_POOL_FACTOR),
            limit,
            tt_move,
        );

        let alpha_orig = alpha;
        let mut best_score = -INF;
        let mut best_move = None;
        let stone = side.stone();

        for mv in moves {
            grid.set(mv, stone);
            let child_hash = self.zobrist.update_hash(hash, mv, Stone::Empty, stone);
            let score = -self.negamax(grid, side.opponent(), depth - 1, -beta, -alpha, child_hash, mv);
            grid.set(mv, Stone::Empty);

            if self.stopped {
                // Best effort; never stored
                return best_score.max(score);
            }

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                self.cutoffs += 1;
                break;
            }
        }

        if best_move.is_none() {
            return evaluate(grid, side);
        }

        if self.limits.use_transposition_table {
            let entry_type = if best_score <= alpha_orig {
                EntryType::UpperBound
            } else if best_score >= beta {
                EntryType::LowerBound
            } else {
                EntryType::Exact
            };
            self.tt.store(key, depth, best_score, entry_type, best_move);
        }

        best_score
    }
}

/// Candidate moves re-ranked by the static evaluation after playing them.
///
/// The best `pool` cells by proximity are scored, the top `limit` kept, and
/// `first` (cache or previous-depth best move) is tried before the rest.
fn ordered_moves(
    grid: &mut Grid,
    side: Side,
    pool: usize,
    limit: usize,
    first: Option<Pos>,
) -> Vec<Pos> {
    let stone = side.stone();
    let mut scored: Vec<(Pos, i32)> = candidate_moves(grid, pool)
        .into_iter()
        .map(|mv| {
            grid.set(mv, stone);
            let score = evaluate(grid, side);
            grid.set(mv, Stone::Empty);
            (mv, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(limit);

    let mut moves: Vec<Pos> = scored.into_iter().map(|(mv, _)| mv).collect();
    if let Some(first) = first {
        if let Some(idx) = moves.iter().position(|&m| m == first) {
            moves.remove(idx);
            moves.insert(0, first);
        } else if grid.contains(first) && grid.is_empty(first) {
            moves.insert(0, first);
        }
    }
    moves
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

// =============================================================================
// Searcher: persistent search engine
// =============================================================================

/// Alpha-Beta search engine with iterative deepening and transposition table.
///
/// The searcher keeps its transposition table across searches. For a new
/// game, call [`Searcher::clear_tt`] to reset the cached positions.
pub struct Searcher {
    zobrist: Arc<ZobristTable>,
    tt: TranspositionTable,
}

impl Searcher {
    /// Create a searcher for `board_size` boards with a table of
    /// `tt_capacity` entries.
    #[must_use]
    pub fn new(board_size: usize, tt_capacity: usize) -> Self {
        Self::with_zobrist(Arc::new(ZobristTable::new(board_size)), tt_capacity)
    }

    /// Create a searcher sharing an existing hash table.
    #[must_use]
    pub fn with_zobrist(zobrist: Arc<ZobristTable>, tt_capacity: usize) -> Self {
        Self {
            zobrist,
            tt: TranspositionTable::new(tt_capacity),
        }
    }

    /// Search without cancellation or progress reporting.
    pub fn search(
        &mut self,
        grid: &Grid,
        side: Side,
        limits: &SearchLimits,
    ) -> Result<SearchResult> {
        let never = AtomicBool::new(false);
        self.search_with(grid, side, limits, &never, &mut |_| {})
    }

    /// Search for the best move for `side`.
    ///
    /// The abort flag is polled at every node; setting it makes the search
    /// return promptly with the last completed depth (or, if none completed,
    /// the interrupted pass's best move with depth 0).
    ///
    /// Fails with [`EngineError::BoardSizeMismatch`] when `grid` is not the
    /// size the hash table was built for.
    pub fn search_with(
        &mut self,
        grid: &Grid,
        side: Side,
        limits: &SearchLimits,
        abort: &AtomicBool,
        on_progress: &mut dyn FnMut(SearchProgress),
    ) -> Result<SearchResult> {
        if grid.size() != self.zobrist.size() {
            return Err(EngineError::BoardSizeMismatch {
                expected: self.zobrist.size(),
                actual: grid.size(),
            });
        }

        let now = Instant::now();
        let mut scratch = grid.clone();
        let mut worker = Worker {
            zobrist: &self.zobrist,
            tt: &mut self.tt,
            limits: *limits,
            abort,
            on_progress,
            start: now,
            last_progress: now,
            current_depth: 0,
            nodes: 0,
            cutoffs: 0,
            stopped: false,
        };
        Ok(worker.run(&mut scratch, side))
    }

    /// Shared hash table
    pub fn zobrist(&self) -> &Arc<ZobristTable> {
        &self.zobrist
    }

    /// Get statistics about the transposition table.
    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    /// Clear the transposition table.
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }
}
