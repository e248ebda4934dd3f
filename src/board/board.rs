//! Game board with move history

use super::grid::Grid;
use super::{Pos, Side, Stone, DEFAULT_BOARD_SIZE};
use crate::error::Result;

/// Game board: a grid plus the ordered list of placements for undo.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    /// Placed positions, oldest first
    history: Vec<Pos>,
}

impl Board {
    /// Create an empty board of the given size.
    pub fn new(size: usize) -> Result<Self> {
        let grid = Grid::new(size)?;
        Ok(Self {
            history: Vec::with_capacity(size * size),
            grid,
        })
    }

    /// Clear every stone and the history.
    pub fn reset(&mut self) {
        for pos in self.history.drain(..) {
            self.grid.set(pos, Stone::Empty);
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Read-only view of the grid (snapshot source for the engine)
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Get stone at signed coordinates, `None` when off the board
    #[inline]
    pub fn get(&self, row: i32, col: i32) -> Option<Stone> {
        self.grid.get_at(row, col)
    }

    /// Check if position is on the board and empty
    #[inline]
    pub fn is_empty(&self, row: i32, col: i32) -> bool {
        self.get(row, col) == Some(Stone::Empty)
    }

    /// Place a stone for `side`.
    ///
    /// Returns `false` without touching the board when the position is off
    /// the board or already occupied.
    pub fn place(&mut self, row: i32, col: i32, side: Side) -> bool {
        let Some(pos) = Pos::checked(row, col, self.grid.size()) else {
            return false;
        };
        if !self.grid.is_empty(pos) {
            return false;
        }
        self.grid.set(pos, side.stone());
        self.history.push(pos);
        true
    }

    /// Remove the most recent placement and return its position,
    /// or `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Pos> {
        let pos = self.history.pop()?;
        self.grid.set(pos, Stone::Empty);
        Some(pos)
    }

    /// Placed positions, oldest first
    #[inline]
    pub fn move_history(&self) -> &[Pos] {
        &self.history
    }

    #[inline]
    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn last_move(&self) -> Option<Pos> {
        self.history.last().copied()
    }

    pub fn is_full(&self) -> bool {
        self.history.len() >= self.grid.size() * self.grid.size()
    }

    /// Check the four axes through a non-empty cell for a winning run.
    ///
    /// Returns the whole contiguous run, which may exceed five stones.
    pub fn check_win_at(&self, row: i32, col: i32) -> Option<Vec<Pos>> {
        let pos = Pos::checked(row, col, self.grid.size())?;
        self.grid.winning_line_at(pos)
    }

    /// Scan the board row-major and return the first winner with its run.
    pub fn check_board_win(&self) -> Option<(Side, Vec<Pos>)> {
        self.grid.find_winner()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            grid: Grid::default(),
            history: Vec::with_capacity(DEFAULT_BOARD_SIZE * DEFAULT_BOARD_SIZE),
        }
    }
}
