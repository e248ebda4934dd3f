//! Line patterns and their scores
//!
//! A pattern is a contiguous run of one side's stones along a direction,
//! classified by its length and how many of its two ends are empty.

/// Line pattern, ordered from most to least threatening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Five or more in a row
    Five,
    /// Four with both ends empty: _OOOO_
    OpenFour,
    /// Four with one end empty: XOOOO_
    Four,
    /// Three with both ends empty: _OOO_
    OpenThree,
    /// Three with one end empty
    Three,
    /// Two with both ends empty: _OO_
    OpenTwo,
    /// Two with one end empty
    Two,
    /// Single stones and dead runs
    None,
}

impl Pattern {
    /// Classify a run by length and number of open ends (0-2).
    pub fn classify(run_length: usize, open_ends: u8) -> Pattern {
        match (run_length, open_ends) {
            (5.., _) => Pattern::Five,
            (4, 2) => Pattern::OpenFour,
            (4, 1) => Pattern::Four,
            (3, 2) => Pattern::OpenThree,
            (3, 1) => Pattern::Three,
            (2, 2) => Pattern::OpenTwo,
            (2, 1) => Pattern::Two,
            _ => Pattern::None,
        }
    }

    /// Score contributed by one occurrence of this pattern
    #[inline]
    pub fn score(self) -> i32 {
        match self {
            Pattern::Five => PatternScore::FIVE,
            Pattern::OpenFour => PatternScore::OPEN_FOUR,
            Pattern::Four => PatternScore::FOUR,
            Pattern::OpenThree => PatternScore::OPEN_THREE,
            Pattern::Three => PatternScore::THREE,
            Pattern::OpenTwo => PatternScore::OPEN_TWO,
            Pattern::Two => PatternScore::TWO,
            Pattern::None => 0,
        }
    }
}

/// Pattern scores for evaluation
pub struct PatternScore;

impl PatternScore {
    /// Five in a row - immediate win
    pub const FIVE: i32 = 1_000_000;
    /// Open four: cannot be stopped
    pub const OPEN_FOUR: i32 = 100_000;
    /// Closed four: one completion point left
    pub const FOUR: i32 = 10_000;
    /// Open three: becomes an open four if not answered
    pub const OPEN_THREE: i32 = 5_000;
    /// Closed three
    pub const THREE: i32 = 500;
    /// Open two
    pub const OPEN_TWO: i32 = 200;
    /// Closed two
    pub const TWO: i32 = 50;
}
