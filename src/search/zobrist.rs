//! Zobrist hashing for position identification
//!
//! Every (cell, state) pair gets its own random 64-bit value, including the
//! empty state, so the hash of a grid is the XOR of one value per cell.
//! Changing a single cell is then an O(1) update: XOR out the old term and
//! XOR in the new one.
//!
//! # Example
//!
//! ```
//! use gomoku::board::{Grid, Pos, Side, Stone};
//! use gomoku::search::ZobristTable;
//!
//! let zt = ZobristTable::new(15);
//! let mut grid = Grid::new(15).unwrap();
//! let before = zt.hash(&grid);
//!
//! let pos = Pos::new(7, 7);
//! grid.set(pos, Stone::Black);
//!
//! let incremental = zt.update_hash(before, pos, Stone::Empty, Stone::Black);
//! assert_eq!(incremental, zt.hash(&grid));
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::{Grid, Pos, Side, Stone};

/// Seed used by [`ZobristTable::new`]; same seed, same table, same hashes.
pub const DEFAULT_SEED: u64 = 0x1234_5678_9ABC_DEF0;

/// Number of cell states (Empty, Black, White)
const STATES: usize = 3;

/// Zobrist hash table for a fixed board size.
///
/// Built once and shared by reference (the engine keeps it in an `Arc`);
/// nothing about it is process-wide.
#[derive(Debug, Clone)]
pub struct ZobristTable {
    size: usize,
    /// Random values indexed by `cell_index * STATES + stone.index()`
    keys: Vec<u64>,
    /// Random value XORed in when black is to move
    black_to_move: u64,
}

impl ZobristTable {
    /// Create a table for a `size`x`size` board with the default seed.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::with_seed(size, DEFAULT_SEED)
    }

    /// Create a table from an explicit seed.
    #[must_use]
    pub fn with_seed(size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let keys = (0..size * size * STATES).map(|_| rng.random::<u64>()).collect();

        Self {
            size,
            keys,
            black_to_move: rng.random::<u64>(),
        }
    }

    /// Board size this table was built for
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Random value for one (cell, state) pair
    #[inline]
    pub fn key(&self, pos: Pos, stone: Stone) -> u64 {
        self.keys[pos.to_index(self.size) * STATES + stone.index()]
    }

    /// Compute the full hash of a grid by folding every cell.
    ///
    /// Used once at the root of a search; descent uses [`Self::update_hash`].
    #[must_use]
    pub fn hash(&self, grid: &Grid) -> u64 {
        grid.cells().fold(0u64, |h, (pos, stone)| h ^ self.key(pos, stone))
    }

    /// Incrementally update `hash` after the cell at `pos` changed from
    /// `old` to `new`.
    #[inline]
    #[must_use]
    pub fn update_hash(&self, hash: u64, pos: Pos, old: Stone, new: Stone) -> u64 {
        hash ^ self.key(pos, old) ^ self.key(pos, new)
    }

    /// Side-to-move component mixed into transposition keys.
    ///
    /// The grid hash itself is side-agnostic; the searcher XORs this in
    /// so one cache stays sound when asked to search for either side.
    #[inline]
    pub fn side_key(&self, side: Side) -> u64 {
        match side {
            Side::Black => self.black_to_move,
            Side::White => 0,
        }
    }
}
