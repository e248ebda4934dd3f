//! Square grid of cell states with win detection

use super::{
    Pos, Side, Stone, DEFAULT_BOARD_SIZE, DIRECTIONS, MAX_BOARD_SIZE, MIN_BOARD_SIZE, WIN_LENGTH,
};
use crate::error::{EngineError, Result};

/// N x N grid of cell states.
///
/// This is the snapshot exchanged between the game session and the engine,
/// and the scratch buffer the searcher mutates with make/unmake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Stone>,
}

impl Grid {
    /// Create an empty grid.
    ///
    /// Fails with [`EngineError::InvalidBoardSize`] outside
    /// `MIN_BOARD_SIZE..=MAX_BOARD_SIZE`.
    pub fn new(size: usize) -> Result<Self> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(EngineError::InvalidBoardSize {
                size,
                min: MIN_BOARD_SIZE,
                max: MAX_BOARD_SIZE,
            });
        }
        Ok(Self {
            size,
            cells: vec![Stone::Empty; size * size],
        })
    }

    /// Build a grid from `(row, col, side)` placements.
    ///
    /// Out-of-bounds or repeated placements are ignored.
    pub fn from_stones(size: usize, stones: &[(u8, u8, Side)]) -> Result<Self> {
        let mut grid = Self::new(size)?;
        for &(row, col, side) in stones {
            let pos = Pos::new(row, col);
            if grid.contains(pos) && grid.is_empty(pos) {
                grid.set(pos, side.stone());
            }
        }
        Ok(grid)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Center cell (`size / 2` on both axes)
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn center(&self) -> Pos {
        let c = (self.size / 2) as u8;
        Pos::new(c, c)
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        (pos.row as usize) < self.size && (pos.col as usize) < self.size
    }

    /// Get cell state. Callers must pass an in-bounds position.
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        self.cells[pos.to_index(self.size)]
    }

    /// Get cell state at signed coordinates, `None` when off the board
    #[inline]
    pub fn get_at(&self, row: i32, col: i32) -> Option<Stone> {
        Pos::checked(row, col, self.size).map(|p| self.get(p))
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.get(pos) == Stone::Empty
    }

    /// Overwrite a cell. No legality checks; see [`crate::Board::place`].
    #[inline]
    pub fn set(&mut self, pos: Pos, stone: Stone) {
        let idx = pos.to_index(self.size);
        self.cells[idx] = stone;
    }

    /// Occupied cells in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = (Pos, Side)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(idx, stone)| {
            stone.side().map(|side| (Pos::from_index(idx, self.size), side))
        })
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (Pos, Stone)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, &stone)| (Pos::from_index(idx, self.size), stone))
    }

    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|s| **s != Stone::Empty).count()
    }

    pub fn is_board_empty(&self) -> bool {
        self.cells.iter().all(|s| *s == Stone::Empty)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|s| *s != Stone::Empty)
    }

    /// Length of the contiguous run through `pos` along `(dr, dc)`.
    fn run_length(&self, pos: Pos, dr: i32, dc: i32, stone: Stone) -> usize {
        let mut count = 1;
        for sign in [1, -1] {
            let mut r = i32::from(pos.row) + dr * sign;
            let mut c = i32::from(pos.col) + dc * sign;
            while self.get_at(r, c) == Some(stone) {
                count += 1;
                r += dr * sign;
                c += dc * sign;
            }
        }
        count
    }

    /// Fast five-in-a-row check at a specific non-empty cell. No allocation.
    #[inline]
    pub fn is_win_at(&self, pos: Pos) -> bool {
        let stone = self.get(pos);
        if stone == Stone::Empty {
            return false;
        }
        DIRECTIONS
            .iter()
            .any(|&(dr, dc)| self.run_length(pos, dr, dc, stone) >= WIN_LENGTH)
    }

    /// Check if placing `side` at the empty cell `pos` would complete a five.
    pub fn completes_five(&self, pos: Pos, side: Side) -> bool {
        let stone = side.stone();
        DIRECTIONS
            .iter()
            .any(|&(dr, dc)| self.run_length(pos, dr, dc, stone) >= WIN_LENGTH)
    }

    /// Find the winning run through `pos`, if any.
    ///
    /// Directions are examined horizontal, vertical, then both diagonals; the
    /// first qualifying run is returned in full (it may be longer than five),
    /// ordered from its negative end to its positive end.
    pub fn winning_line_at(&self, pos: Pos) -> Option<Vec<Pos>> {
        if !self.contains(pos) {
            return None;
        }
        let stone = self.get(pos);
        if stone == Stone::Empty {
            return None;
        }

        for &(dr, dc) in &DIRECTIONS {
            let mut line = vec![pos];

            // Extend in negative direction first
            let mut r = i32::from(pos.row) - dr;
            let mut c = i32::from(pos.col) - dc;
            while let Some(p) = Pos::checked(r, c, self.size) {
                if self.get(p) != stone {
                    break;
                }
                line.insert(0, p);
                r -= dr;
                c -= dc;
            }

            // Extend in positive direction
            r = i32::from(pos.row) + dr;
            c = i32::from(pos.col) + dc;
            while let Some(p) = Pos::checked(r, c, self.size) {
                if self.get(p) != stone {
                    break;
                }
                line.push(p);
                r += dr;
                c += dc;
            }

            if line.len() >= WIN_LENGTH {
                return Some(line);
            }
        }
        None
    }

    /// Scan the whole grid in row-major order and return the first winner.
    ///
    /// Two simultaneous winners only arise from contrived positions; the
    /// answer is then whichever run's cell comes first in scan order.
    pub fn find_winner(&self) -> Option<(Side, Vec<Pos>)> {
        self.occupied()
            .find_map(|(pos, side)| self.winning_line_at(pos).map(|line| (side, line)))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            cells: vec![Stone::Empty; DEFAULT_BOARD_SIZE * DEFAULT_BOARD_SIZE],
        }
    }
}
