//! Heuristic evaluation function for Gomoku board positions
//!
//! This module provides the static evaluation used at the leaves of the
//! search, the cheap urgency check used before descending, and the
//! candidate move generator that keeps the branching factor manageable.

use crate::board::{Grid, Pos, Side, Stone, DIRECTIONS};

use super::patterns::Pattern;

/// Positional bonus for a stone on the center cell; drops by one per unit
/// of Manhattan distance.
const POSITION_WEIGHT: i32 = 10;

/// Candidate moves are empty cells within this Chebyshev radius of a stone
const CANDIDATE_RADIUS: i32 = 2;

/// Base score for candidate ranking; each neighbouring stone adds
/// `CANDIDATE_BASE - distance_to_center`.
const CANDIDATE_BASE: i32 = 100;

/// Urgency value when a side can win on its next move
pub const URGENT_WIN: i32 = 500_000;

/// Urgency weight per open four owned by the evaluated side
const URGENT_OWN_OPEN_FOUR: i32 = 50_000;

/// Urgency weight per open four owned by the opponent
const URGENT_OPP_OPEN_FOUR: i32 = 40_000;

/// Evaluate the grid from the perspective of `side`.
///
/// Positive values favour `side`. The result is antisymmetric:
/// `evaluate(g, Black) == -evaluate(g, White)`.
#[must_use]
pub fn evaluate(grid: &Grid, side: Side) -> i32 {
    let mut score = 0;

    for (pos, owner) in grid.occupied() {
        for &(dr, dc) in &DIRECTIONS {
            if !is_line_start(grid, pos, dr, dc) {
                continue;
            }
            let pattern_score = line_pattern(grid, pos, dr, dc).score();
            if owner == side {
                score += pattern_score;
            } else {
                score -= pattern_score;
            }
        }
    }

    score + evaluate_positions(grid, side)
}

/// Cheap tactical pre-check.
///
/// Returns [`URGENT_WIN`] if `side` can complete five with one stone,
/// `-URGENT_WIN` if the opponent can, otherwise a signal weighted by the
/// open fours each side owns.
#[must_use]
pub fn evaluate_urgent(grid: &Grid, side: Side) -> i32 {
    let opponent = side.opponent();

    if find_winning_move(grid, side).is_some() {
        return URGENT_WIN;
    }
    if find_winning_move(grid, opponent).is_some() {
        return -URGENT_WIN;
    }

    let my_open_fours = count_patterns(grid, side, Pattern::OpenFour) as i32;
    let opp_open_fours = count_patterns(grid, opponent, Pattern::OpenFour) as i32;

    my_open_fours * URGENT_OWN_OPEN_FOUR - opp_open_fours * URGENT_OPP_OPEN_FOUR
}

/// First empty cell (row-major) where `side` completes five in one move.
#[must_use]
pub fn find_winning_move(grid: &Grid, side: Side) -> Option<Pos> {
    let stone = side.stone();
    grid.cells()
        .filter(|&(_, s)| s == Stone::Empty)
        .map(|(pos, _)| pos)
        .find(|&pos| has_neighbour(grid, pos, stone) && grid.completes_five(pos, side))
}

/// Count occurrences of `pattern` among `side`'s runs (each run once per direction).
#[must_use]
pub fn count_patterns(grid: &Grid, side: Side, pattern: Pattern) -> usize {
    grid.occupied()
        .filter(|&(_, owner)| owner == side)
        .map(|(pos, _)| {
            DIRECTIONS
                .iter()
                .filter(|&&(dr, dc)| {
                    is_line_start(grid, pos, dr, dc) && line_pattern(grid, pos, dr, dc) == pattern
                })
                .count()
        })
        .sum()
}

/// Generate candidate moves ranked by proximity to the center.
///
/// Candidates are empty cells within [`CANDIDATE_RADIUS`] of any stone. Each
/// stone in range adds `CANDIDATE_BASE - distance_to_center` to a cell, so
/// cells near many stones and near the middle come first. Ties keep
/// row-major order. On an empty grid the only candidate is the center.
#[must_use]
pub fn candidate_moves(grid: &Grid, limit: usize) -> Vec<Pos> {
    if grid.is_board_empty() {
        return vec![grid.center()];
    }

    let size = grid.size();
    let center = grid.center();
    let mut scores = vec![0i32; size * size];
    let mut seen = vec![false; size * size];

    for (pos, _) in grid.occupied() {
        for dr in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
            for dc in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
                let Some(p) = Pos::checked(i32::from(pos.row) + dr, i32::from(pos.col) + dc, size)
                else {
                    continue;
                };
                if !grid.is_empty(p) {
                    continue;
                }
                let idx = p.to_index(size);
                seen[idx] = true;
                scores[idx] += CANDIDATE_BASE - p.manhattan(center);
            }
        }
    }

    let mut ranked: Vec<(usize, i32)> = seen
        .iter()
        .enumerate()
        .filter(|&(_, &s)| s)
        .map(|(idx, _)| (idx, scores[idx]))
        .collect();
    // Stable sort keeps row-major order among equal scores
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(idx, _)| Pos::from_index(idx, size))
        .collect()
}

/// A cell is the canonical start of its run along `(dr, dc)` when the
/// preceding cell is off the board, empty, or holds the other side.
#[inline]
fn is_line_start(grid: &Grid, pos: Pos, dr: i32, dc: i32) -> bool {
    let prev = grid.get_at(i32::from(pos.row) - dr, i32::from(pos.col) - dc);
    prev != Some(grid.get(pos))
}

/// Classify the run starting at `pos` along `(dr, dc)`.
fn line_pattern(grid: &Grid, pos: Pos, dr: i32, dc: i32) -> Pattern {
    let stone = grid.get(pos);
    let mut count = 1;
    let mut open_ends = 0u8;

    let before = grid.get_at(i32::from(pos.row) - dr, i32::from(pos.col) - dc);
    if before == Some(Stone::Empty) {
        open_ends += 1;
    }

    let mut r = i32::from(pos.row) + dr;
    let mut c = i32::from(pos.col) + dc;
    loop {
        match grid.get_at(r, c) {
            Some(s) if s == stone => {
                count += 1;
                r += dr;
                c += dc;
            }
            Some(Stone::Empty) => {
                open_ends += 1;
                break;
            }
            _ => break,
        }
    }

    Pattern::classify(count, open_ends)
}

/// Center-control term: each stone is worth `max(0, K - distance)`.
fn evaluate_positions(grid: &Grid, side: Side) -> i32 {
    let center = grid.center();
    grid.occupied()
        .map(|(pos, owner)| {
            let value = (POSITION_WEIGHT - pos.manhattan(center)).max(0);
            if owner == side {
                value
            } else {
                -value
            }
        })
        .sum()
}

/// True when any of the eight neighbours of `pos` holds `stone`.
fn has_neighbour(grid: &Grid, pos: Pos, stone: Stone) -> bool {
    (-1..=1).any(|dr| {
        (-1..=1).any(|dc| {
            (dr, dc) != (0, 0)
                && grid.get_at(i32::from(pos.row) + dr, i32::from(pos.col) + dc) == Some(stone)
        })
    })
}
