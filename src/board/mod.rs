//! Board representation for Gomoku

#[allow(clippy::module_inception)]
pub mod board;
pub mod grid;


// Re-exports
pub use board::Board;
pub use grid::Grid;

/// Default board size (15x15)
pub const DEFAULT_BOARD_SIZE: usize = 15;

/// Smallest supported board (a five must fit on it)
pub const MIN_BOARD_SIZE: usize = WIN_LENGTH;

/// Largest supported board (coordinates are stored as `u8`)
pub const MAX_BOARD_SIZE: usize = 25;

/// Stones in a row needed to win (overlines also win)
pub const WIN_LENGTH: usize = 5;

/// Direction vectors for line checking (4 directions)
pub const DIRECTIONS: [(i32, i32); 4] = [
    (0, 1),  // Horizontal
    (1, 0),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal SW
];

/// Side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Black,
    White,
}

impl Side {
    /// Get opponent side
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }

    /// Cell state occupied by this side's stones
    #[inline]
    pub fn stone(self) -> Stone {
        match self {
            Side::Black => Stone::Black,
            Side::White => Stone::White,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Black => write!(f, "black"),
            Side::White => write!(f, "white"),
        }
    }
}

/// Cell state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stone {
    #[default]
    Empty,
    Black,
    White,
}

impl Stone {
    /// Side owning this stone, `None` for an empty cell
    #[inline]
    pub fn side(self) -> Option<Side> {
        match self {
            Stone::Black => Some(Side::Black),
            Stone::White => Some(Side::White),
            Stone::Empty => None,
        }
    }

    /// Dense index used by lookup tables (Empty=0, Black=1, White=2)
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Stone::Empty => 0,
            Stone::Black => 1,
            Stone::White => 2,
        }
    }
}

impl From<Side> for Stone {
    fn from(side: Side) -> Self {
        side.stone()
    }
}

/// Position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Build a position from signed coordinates if it lies on a `size`x`size` board
    #[inline]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn checked(row: i32, col: i32, size: usize) -> Option<Self> {
        if Self::is_valid(row, col, size) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }

    #[inline]
    pub fn to_index(self, size: usize) -> usize {
        self.row as usize * size + self.col as usize
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_index(idx: usize, size: usize) -> Self {
        Self {
            row: (idx / size) as u8,
            col: (idx % size) as u8,
        }
    }

    #[inline]
    #[allow(clippy::cast_possible_wrap)]
    pub fn is_valid(row: i32, col: i32, size: usize) -> bool {
        let size = size as i32;
        row >= 0 && row < size && col >= 0 && col < size
    }

    /// Manhattan distance to another position
    #[inline]
    pub fn manhattan(self, other: Pos) -> i32 {
        (i32::from(self.row) - i32::from(other.row)).abs()
            + (i32::from(self.col) - i32::from(other.col)).abs()
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
