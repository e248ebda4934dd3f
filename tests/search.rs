//! End-to-end search behavior through the engine.

use gomoku::board::{Grid, Pos, Side};
use gomoku::eval::candidate_moves;
use gomoku::search::{SearchLimits, Searcher, WIN_SCORE};
use gomoku::{AIEngine, Difficulty, EngineConfig, SearchSource};

fn no_book() -> AIEngine {
    AIEngine::new(EngineConfig {
        use_opening_book: false,
        ..EngineConfig::default()
    })
    .unwrap()
}

#[test]
fn test_empty_board_candidate_is_center() {
    let grid = Grid::new(15).unwrap();
    assert_eq!(candidate_moves(&grid, 40), vec![Pos::new(7, 7)]);
}

#[test]
fn test_open_four_is_completed_without_search() {
    // _XXXX_ on row 7, white stones scattered
    let grid = Grid::from_stones(
        15,
        &[
            (7, 5, Side::Black),
            (7, 6, Side::Black),
            (7, 7, Side::Black),
            (7, 8, Side::Black),
            (3, 3, Side::White),
            (11, 11, Side::White),
            (3, 11, Side::White),
        ],
    )
    .unwrap();

    for difficulty in Difficulty::ALL {
        let mut engine = no_book();
        let result = engine.get_move(&grid, Side::Black, difficulty, 7).unwrap();

        let mv = result.best_move.unwrap();
        assert!(mv == Pos::new(7, 4) || mv == Pos::new(7, 9), "{mv} does not complete five");
        assert!(result.score >= WIN_SCORE);
        assert_eq!(result.depth, 1);
        assert_eq!(result.nodes, 1);
        assert_eq!(result.source, SearchSource::ImmediateWin);
    }
}

#[test]
fn test_opponent_open_four_is_blocked() {
    // White owns an open four on the diagonal; black must take an end
    let grid = Grid::from_stones(
        15,
        &[
            (4, 4, Side::White),
            (5, 5, Side::White),
            (6, 6, Side::White),
            (7, 7, Side::White),
            (7, 8, Side::Black),
            (8, 6, Side::Black),
            (2, 12, Side::Black),
        ],
    )
    .unwrap();

    let mut engine = no_book();
    let result = engine
        .get_move(&grid, Side::Black, Difficulty::Medium, 7)
        .unwrap();

    let mv = result.best_move.unwrap();
    assert!(mv == Pos::new(3, 3) || mv == Pos::new(8, 8), "{mv} does not block");
    assert_eq!(result.source, SearchSource::Defense);
}

#[test]
fn test_fixed_depth_reports_that_depth() {
    let grid = Grid::from_stones(
        15,
        &[(7, 7, Side::Black), (7, 8, Side::White), (8, 8, Side::Black)],
    )
    .unwrap();

    for depth in 1..=3 {
        let mut searcher = Searcher::new(15, 50_000);
        let result = searcher
            .search(&grid, Side::White, &SearchLimits::fixed_depth(depth))
            .unwrap();
        assert_eq!(result.depth, depth);
        assert_eq!(result.source, SearchSource::AlphaBeta);
        assert!(grid.is_empty(result.best_move.unwrap()));
    }
}

#[test]
fn test_repeated_search_reuses_cache() {
    let grid = Grid::from_stones(
        15,
        &[
            (7, 7, Side::Black),
            (7, 8, Side::White),
            (8, 7, Side::Black),
            (6, 7, Side::White),
        ],
    )
    .unwrap();
    let mut engine = no_book();

    engine.get_move(&grid, Side::Black, Difficulty::Easy, 4).unwrap();
    let after_first = engine.tt_stats();
    assert!(after_first.size > 0);

    engine.get_move(&grid, Side::Black, Difficulty::Easy, 4).unwrap();
    let after_second = engine.tt_stats();

    assert!(after_second.size > 0);
    assert!(after_second.hits > after_first.hits);
}

#[test]
fn test_search_move_is_always_legal() {
    let grid = Grid::from_stones(
        15,
        &[
            (7, 7, Side::Black),
            (7, 8, Side::White),
            (8, 8, Side::Black),
            (6, 6, Side::White),
            (9, 9, Side::Black),
            (10, 10, Side::White),
        ],
    )
    .unwrap();
    let mut engine = no_book();
    let result = engine
        .get_move(&grid, Side::Black, Difficulty::Medium, 6)
        .unwrap();
    let mv = result.best_move.unwrap();
    assert!(grid.contains(mv) && grid.is_empty(mv));
    assert!(result.depth >= 1);
}

#[test]
fn test_search_on_small_board() {
    let config = EngineConfig {
        board_size: 7,
        use_opening_book: true,
        ..EngineConfig::default()
    };
    let mut engine = AIEngine::new(config).unwrap();
    let grid = Grid::new(7).unwrap();

    // The book only covers 15x15, so this goes to search
    let result = engine.get_move(&grid, Side::Black, Difficulty::Easy, 0).unwrap();
    assert_eq!(result.best_move, Some(Pos::new(3, 3)));
    assert_eq!(result.source, SearchSource::AlphaBeta);
}
