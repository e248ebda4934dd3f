//! Asynchronous search protocol: ordering, rejection, cancel, failures.

use std::thread;
use std::time::{Duration, Instant};

use gomoku::{Coordinator, Difficulty, EngineConfig, EngineError, Grid, SearchEvent, Side};

fn no_book() -> EngineConfig {
    EngineConfig {
        use_opening_book: false,
        ..EngineConfig::default()
    }
}

/// Quiet middle-game position with no immediate threats
fn middle_game() -> Grid {
    Grid::from_stones(
        15,
        &[
            (7, 7, Side::Black),
            (7, 8, Side::White),
            (8, 7, Side::Black),
            (6, 6, Side::White),
            (9, 9, Side::Black),
            (8, 6, Side::White),
        ],
    )
    .unwrap()
}

/// Poll until `Finished` arrives, collecting every event.
fn drain(coordinator: &mut Coordinator) -> Vec<SearchEvent> {
    let deadline = Instant::now() + Duration::from_secs(30);
    let mut events = Vec::new();
    while Instant::now() < deadline {
        match coordinator.poll() {
            Some(event) => {
                let done = matches!(event, SearchEvent::Finished { .. });
                events.push(event);
                if done {
                    return events;
                }
            }
            None => thread::sleep(Duration::from_millis(1)),
        }
    }
    panic!("search did not finish in time");
}

#[test]
fn test_event_order() {
    let mut coordinator = Coordinator::spawn(no_book()).unwrap();
    let id = coordinator
        .search(&middle_game(), Side::Black, Difficulty::Medium, 6)
        .unwrap();
    assert!(coordinator.is_searching());
    assert_eq!(coordinator.active_request(), Some(id));

    let events = drain(&mut coordinator);
    assert!(matches!(events.first(), Some(SearchEvent::Started { .. })));
    assert!(matches!(events.last(), Some(SearchEvent::Finished { outcome: Ok(_), .. })));
    assert!(events[1..events.len() - 1]
        .iter()
        .all(|e| matches!(e, SearchEvent::Progress { .. })));
    assert!(events.iter().all(|e| e.request_id() == id));

    assert!(!coordinator.is_searching());
    assert!(coordinator.poll().is_none());
}

#[test]
fn test_wait_forwards_progress() {
    let mut coordinator = Coordinator::spawn(no_book()).unwrap();
    coordinator
        .search(&middle_game(), Side::Black, Difficulty::Medium, 6)
        .unwrap();

    let mut depths = Vec::new();
    let result = coordinator.wait(|p| depths.push(p.depth)).unwrap();

    assert!(result.best_move.is_some());
    // At least the first completed depth is reported
    assert!(depths.contains(&1));
    assert!(!coordinator.is_searching());
}

#[test]
fn test_second_search_rejected() {
    let mut coordinator = Coordinator::spawn(no_book()).unwrap();
    let grid = middle_game();
    coordinator
        .search(&grid, Side::Black, Difficulty::Master, 6)
        .unwrap();

    assert!(matches!(
        coordinator.search(&grid, Side::Black, Difficulty::Easy, 6),
        Err(EngineError::SearchInProgress)
    ));

    // The original request is unaffected
    assert!(coordinator.cancel());
}

#[test]
fn test_cancel_drops_result() {
    let mut coordinator = Coordinator::spawn(no_book()).unwrap();
    let grid = middle_game();
    let first = coordinator
        .search(&grid, Side::Black, Difficulty::Master, 6)
        .unwrap();

    assert!(coordinator.cancel());
    assert!(!coordinator.is_searching());
    assert!(coordinator.poll().is_none());
    assert!(matches!(coordinator.wait(|_| {}), Err(EngineError::NoSearchPending)));

    // Cancelling with nothing pending is a no-op
    assert!(!coordinator.cancel());

    // A fresh request gets its own id and only its own events
    let second = coordinator
        .search(&grid, Side::Black, Difficulty::Easy, 6)
        .unwrap();
    assert_ne!(first, second);
    let events = drain(&mut coordinator);
    assert!(events.iter().all(|e| e.request_id() == second));
}

#[test]
fn test_wait_without_search() {
    let mut coordinator = Coordinator::spawn(EngineConfig::default()).unwrap();
    assert!(matches!(coordinator.wait(|_| {}), Err(EngineError::NoSearchPending)));
    assert!(matches!(
        coordinator.wait_timeout(Duration::from_millis(1), |_| {}),
        Err(EngineError::NoSearchPending)
    ));
}

#[test]
fn test_wait_timeout_keeps_search_pending() {
    let mut coordinator = Coordinator::spawn(no_book()).unwrap();
    coordinator
        .search(&middle_game(), Side::White, Difficulty::Master, 6)
        .unwrap();

    match coordinator.wait_timeout(Duration::from_millis(1), |_| {}) {
        Ok(None) => assert!(coordinator.is_searching()),
        Ok(Some(result)) => assert!(result.best_move.is_some()),
        Err(e) => panic!("unexpected error: {e}"),
    }
    coordinator.cancel();
}

#[test]
fn test_initialization_failure_reaches_caller() {
    let config = EngineConfig {
        board_size: 3,
        ..EngineConfig::default()
    };
    let mut coordinator = Coordinator::spawn(config).unwrap();
    let grid = Grid::new(15).unwrap();
    coordinator
        .search(&grid, Side::Black, Difficulty::Easy, 0)
        .unwrap();

    assert!(matches!(
        coordinator.wait(|_| {}),
        Err(EngineError::Initialization { .. })
    ));

    // Not retried: the next request fails the same way
    coordinator
        .search(&grid, Side::Black, Difficulty::Easy, 0)
        .unwrap();
    assert!(matches!(
        coordinator.wait(|_| {}),
        Err(EngineError::Initialization { .. })
    ));
}

#[test]
fn test_board_size_mismatch_is_reported() {
    let mut coordinator = Coordinator::spawn(EngineConfig::default()).unwrap();
    let grid = Grid::new(9).unwrap();
    coordinator
        .search(&grid, Side::Black, Difficulty::Easy, 0)
        .unwrap();
    assert!(matches!(
        coordinator.wait(|_| {}),
        Err(EngineError::BoardSizeMismatch { expected: 15, actual: 9 })
    ));
}

#[test]
fn test_book_reply_through_coordinator() {
    let mut coordinator = Coordinator::spawn(EngineConfig::default()).unwrap();
    coordinator
        .search(&Grid::default(), Side::Black, Difficulty::Hard, 0)
        .unwrap();
    let result = coordinator.wait(|_| {}).unwrap();
    assert_eq!(result.best_move.map(|p| (p.row, p.col)), Some((7, 7)));
    assert_eq!(result.source, gomoku::SearchSource::OpeningBook);
}

#[test]
fn test_drop_with_pending_search() {
    let mut coordinator = Coordinator::spawn(no_book()).unwrap();
    coordinator
        .search(&middle_game(), Side::Black, Difficulty::Master, 6)
        .unwrap();
    // Drop cancels and joins the worker without hanging
    let start = Instant::now();
    drop(coordinator);
    assert!(start.elapsed() < Duration::from_secs(3));
}
