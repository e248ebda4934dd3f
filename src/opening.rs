//! Opening book
//!
//! A static table of named opening sequences, embedded at compile time and
//! parsed once per process. During the first plies the engine asks the book
//! for a scripted reply before spending time on search.

use once_cell::sync::OnceCell;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Deserialize;

use crate::board::{Grid, Pos, Side};
use crate::error::Result;

/// Book is consulted only while fewer than this many stones are on the board
pub const BOOK_MOVE_LIMIT: usize = 10;

const OPENINGS_JSON: &str = include_str!("../data/openings.json");

static BUILTIN: OnceCell<OpeningBook> = OnceCell::new();

/// One scripted move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BookMove {
    pub row: u8,
    pub col: u8,
    pub side: Side,
}

impl BookMove {
    #[inline]
    pub fn pos(&self) -> Pos {
        Pos::new(self.row, self.col)
    }
}

/// A named opening sequence
#[derive(Debug, Clone, Deserialize)]
pub struct Opening {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub moves: Vec<BookMove>,
}

/// Name, description and tags of an opening, without its moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningSummary<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub tags: &'a [String],
}

/// Entry of the recommendation list; lower priority values come first
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Recommended {
    pub name: String,
    pub priority: u32,
}

/// Versioned opening table
#[derive(Debug, Clone, Deserialize)]
pub struct OpeningBook {
    version: String,
    board_size: usize,
    openings: Vec<Opening>,
    #[serde(default)]
    recommended: Vec<Recommended>,
}

impl OpeningBook {
    /// The embedded table, parsed on first use.
    pub fn builtin() -> Result<&'static OpeningBook> {
        BUILTIN.get_or_try_init(|| Self::from_json(OPENINGS_JSON))
    }

    /// Parse a table from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut book: OpeningBook = serde_json::from_str(json)?;
        book.recommended.sort_by_key(|r| r.priority);
        Ok(book)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Board size the scripted coordinates refer to
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    pub fn len(&self) -> usize {
        self.openings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }

    /// Scripted reply for the current position, if any.
    ///
    /// The occupied cells are compared, as a sorted set of
    /// `(row, col, side)`, against the first `move_count` moves of each
    /// opening. The first opening in table order that matches and scripts
    /// its next move for `side` supplies the answer.
    pub fn find_move(&self, grid: &Grid, move_count: usize, side: Side) -> Option<Pos> {
        if move_count >= BOOK_MOVE_LIMIT || grid.size() != self.board_size {
            return None;
        }

        let mut signature: Vec<(u8, u8, Side)> = grid
            .occupied()
            .map(|(pos, owner)| (pos.row, pos.col, owner))
            .collect();
        signature.sort_unstable();

        self.openings
            .iter()
            .filter(|opening| opening.moves.len() > move_count)
            .filter(|opening| {
                let mut expected: Vec<(u8, u8, Side)> = opening.moves[..move_count]
                    .iter()
                    .map(|m| (m.row, m.col, m.side))
                    .collect();
                expected.sort_unstable();
                expected == signature
            })
            .map(|opening| opening.moves[move_count])
            .find(|next| next.side == side && grid.contains(next.pos()) && grid.is_empty(next.pos()))
            .map(|next| next.pos())
    }

    /// Look up an opening by name
    pub fn get_opening(&self, name: &str) -> Option<&Opening> {
        self.openings.iter().find(|o| o.name == name)
    }

    /// Summaries of all openings in table order
    pub fn openings(&self) -> Vec<OpeningSummary<'_>> {
        self.openings
            .iter()
            .map(|o| OpeningSummary {
                name: &o.name,
                description: &o.description,
                tags: &o.tags,
            })
            .collect()
    }

    /// Recommendation list sorted by priority
    pub fn recommended(&self) -> &[Recommended] {
        &self.recommended
    }

    /// Pick an opening uniformly at random
    pub fn random_opening<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Opening> {
        self.openings.choose(rng)
    }
}
