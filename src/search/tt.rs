//! Transposition Table for caching search results
//!
//! The transposition table stores search results indexed by position hash,
//! enabling reuse of previous search results for positions we've seen before,
//! whether reached by a different move order or by a later search call.
//!
//! # Example
//!
//! ```
//! use gomoku::board::Pos;
//! use gomoku::search::{EntryType, TranspositionTable};
//!
//! let mut tt = TranspositionTable::new(1024);
//!
//! let hash = 0x1234_5678_9ABC_DEF0;
//! tt.store(hash, 5, 100, EntryType::Exact, Some(Pos::new(7, 7)));
//!
//! // Usable for any depth up to the stored one
//! assert!(tt.lookup(hash, 5).is_some());
//! assert!(tt.lookup(hash, 6).is_none());
//! ```

use rustc_hash::FxHashMap;

use crate::board::Pos;

/// Entry type for score interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Exact score - the search completed normally
    Exact,
    /// Lower bound - score >= stored value (beta cutoff)
    LowerBound,
    /// Upper bound - score <= stored value (alpha fail-low)
    UpperBound,
}

/// Transposition table entry
#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    /// Hash of the position
    pub hash: u64,
    /// Remaining search depth this score was computed with
    pub depth: i8,
    /// Evaluation score
    pub score: i32,
    /// Type of score (exact, lower bound, upper bound)
    pub entry_type: EntryType,
    /// Best move found for this position
    pub best_move: Option<Pos>,
    /// Logical time of the last store or hit
    age: u32,
}

impl TTEntry {
    /// Score usable within the `(alpha, beta)` window, if any.
    ///
    /// Exact scores always apply; a lower bound only once it reaches beta;
    /// an upper bound only once it is at or below alpha.
    #[inline]
    #[must_use]
    pub fn usable_score(&self, alpha: i32, beta: i32) -> Option<i32> {
        match self.entry_type {
            EntryType::Exact => Some(self.score),
            EntryType::LowerBound if self.score >= beta => Some(self.score),
            EntryType::UpperBound if self.score <= alpha => Some(self.score),
            _ => None,
        }
    }
}

/// Bounded transposition table with least-recently-touched eviction.
///
/// Entries are keyed by hash. When the table is full and a new position is
/// stored, the entry with the oldest age is evicted. The age is a logical
/// clock advanced by [`Self::increment_age`] once per iterative deepening
/// round, and refreshed on every hit.
#[derive(Debug)]
pub struct TranspositionTable {
    entries: FxHashMap<u64, TTEntry>,
    capacity: usize,
    age: u32,
    hits: u64,
    misses: u64,
}

impl TranspositionTable {
    /// Create a table holding at most `capacity` entries (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: FxHashMap::default(),
            capacity,
            age: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a position searched at least `depth` plies deep.
    ///
    /// An entry stored at a shallower depth is treated as absent. A hit
    /// refreshes the entry's age.
    pub fn lookup(&mut self, hash: u64, depth: i8) -> Option<TTEntry> {
        let age = self.age;
        match self.entries.get_mut(&hash) {
            Some(entry) if entry.hash == hash && entry.depth >= depth => {
                entry.age = age;
                self.hits += 1;
                Some(*entry)
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    /// Best move recorded for a position regardless of depth.
    ///
    /// Used for move ordering; does not touch the hit counters.
    #[must_use]
    pub fn best_move(&self, hash: u64) -> Option<Pos> {
        self.entries
            .get(&hash)
            .filter(|e| e.hash == hash)
            .and_then(|e| e.best_move)
    }

    /// Store a position in the table.
    ///
    /// An existing entry for the same hash is kept only if it is strictly
    /// deeper; equal depth is overwritten by the newer result.
    pub fn store(
        &mut self,
        hash: u64,
        depth: i8,
        score: i32,
        entry_type: EntryType,
        best_move: Option<Pos>,
    ) {
        match self.entries.get(&hash) {
            Some(existing) if existing.depth > depth => return,
            Some(_) => {}
            None => {
                if self.entries.len() >= self.capacity {
                    self.evict_oldest();
                }
            }
        }

        self.entries.insert(
            hash,
            TTEntry {
                hash,
                depth,
                score,
                entry_type,
                best_move,
                age: self.age,
            },
        );
    }

    /// Advance the logical clock. Called once per deepening round.
    #[inline]
    pub fn increment_age(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    /// Drop every entry and reset the clock and counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.age = 0;
        self.hits = 0;
        self.misses = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get statistics about table usage.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        let probes = self.hits + self.misses;
        TTStats {
            size: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            hit_rate: if probes == 0 {
                0.0
            } else {
                self.hits as f64 / probes as f64
            },
        }
    }

    /// Linear scan for the globally least recently touched entry.
    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.age)
            .map(|(&k, _)| k);
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TT_CAPACITY)
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TTStats {
    /// Number of stored entries
    pub size: usize,
    /// Maximum number of entries
    pub capacity: usize,
    /// Lookups that returned a usable entry
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// `hits / (hits + misses)`, 0 before any lookup
    pub hit_rate: f64,
}
