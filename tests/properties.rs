//! Property tests for the board, hasher, evaluator and cache.

use proptest::prelude::*;

use gomoku::board::{Board, Grid, Pos, Side, Stone};
use gomoku::eval::{candidate_moves, evaluate};
use gomoku::search::{EntryType, TranspositionTable, ZobristTable};

/// Up to 60 placements on a 15x15 board; collisions are skipped by `place`.
fn moves() -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((0i32..15, 0i32..15), 0..60)
}

fn play(moves: &[(i32, i32)]) -> Board {
    let mut board = Board::default();
    let mut side = Side::Black;
    for &(r, c) in moves {
        if board.place(r, c, side) {
            side = side.opponent();
        }
    }
    board
}

proptest! {
    #[test]
    fn test_place_undo_round_trip(
        history in moves(),
        row in -2i32..17,
        col in -2i32..17,
        white in any::<bool>(),
    ) {
        let zt = ZobristTable::new(15);
        let mut board = play(&history);
        let before = board.grid().clone();
        let hash_before = zt.hash(&before);
        let count_before = board.move_count();
        let side = if white { Side::White } else { Side::Black };

        if board.place(row, col, side) {
            let pos = board.last_move().unwrap();
            let hash_after = zt.update_hash(hash_before, pos, Stone::Empty, side.stone());
            prop_assert_eq!(hash_after, zt.hash(board.grid()));

            prop_assert_eq!(board.undo(), Some(pos));
            prop_assert_eq!(
                zt.update_hash(hash_after, pos, side.stone(), Stone::Empty),
                hash_before
            );
        }

        prop_assert_eq!(board.grid(), &before);
        prop_assert_eq!(zt.hash(board.grid()), hash_before);
        prop_assert_eq!(board.move_count(), count_before);
    }

    #[test]
    fn test_evaluate_is_antisymmetric(history in moves()) {
        let board = play(&history);
        let grid = board.grid();
        prop_assert_eq!(evaluate(grid, Side::Black), -evaluate(grid, Side::White));
    }

    #[test]
    fn test_cache_depth_validity(
        hash in any::<u64>(),
        stored in 0i8..12,
        requested in 0i8..12,
        score in -1_000_000i32..1_000_000,
    ) {
        let mut tt = TranspositionTable::new(64);
        tt.store(hash, stored, score, EntryType::Exact, None);

        let hit = tt.lookup(hash, requested);
        if requested > stored {
            prop_assert!(hit.is_none());
        } else {
            prop_assert_eq!(hit.map(|e| e.score), Some(score));
        }
    }

    #[test]
    fn test_candidates_are_empty_and_near_stones(history in moves(), limit in 1usize..50) {
        let board = play(&history);
        let grid = board.grid();
        let candidates = candidate_moves(grid, limit);

        prop_assert!(!candidates.is_empty() || grid.is_full());
        prop_assert!(candidates.len() <= limit.max(1));
        for m in candidates {
            prop_assert!(grid.is_empty(m));
            if !grid.is_board_empty() {
                let near = grid.occupied().any(|(p, _)| {
                    (i32::from(p.row) - i32::from(m.row)).abs() <= 2
                        && (i32::from(p.col) - i32::from(m.col)).abs() <= 2
                });
                prop_assert!(near);
            }
        }
    }

    #[test]
    fn test_board_win_matches_cell_check(history in moves()) {
        let board = play(&history);
        if let Some((side, line)) = board.check_board_win() {
            prop_assert!(line.len() >= 5);
            for p in &line {
                prop_assert_eq!(board.grid().get(*p), side.stone());
            }
        } else {
            for (pos, _) in board.grid().occupied() {
                prop_assert!(board.check_win_at(pos.row.into(), pos.col.into()).is_none());
            }
        }
    }
}

#[test]
fn test_grid_snapshot_is_independent() {
    let mut board = Board::default();
    board.place(7, 7, Side::Black);
    let snapshot: Grid = board.grid().clone();
    board.place(7, 8, Side::White);
    assert_eq!(snapshot.stone_count(), 1);
    assert!(snapshot.is_empty(Pos::new(7, 8)));
}
