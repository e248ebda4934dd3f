//! Gomoku self-play demo
//!
//! Plays the engine against itself through the asynchronous coordinator and
//! prints each move and the final board. Set `RUST_LOG=debug` to see the
//! per-depth search log.

use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use gomoku::opening::{BookMove, OpeningBook};
use gomoku::{
    Board, Coordinator, Difficulty, EngineConfig, EngineError, Grid, Side, Stone,
    DEFAULT_BOARD_SIZE,
};

/// AI-vs-AI Gomoku
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Difficulty used by Black (easy, medium, hard, master)
    #[arg(short, long, default_value_t = Difficulty::Medium)]
    black: Difficulty,

    /// Difficulty used by White (easy, medium, hard, master)
    #[arg(short, long, default_value_t = Difficulty::Medium)]
    white: Difficulty,

    /// Board edge length (5-25)
    #[arg(short, long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,

    /// Stop after this many plies
    #[arg(short, long, default_value_t = 225)]
    max_moves: usize,

    /// Disable the opening book
    #[arg(long)]
    no_book: bool,

    /// Start from the first plies of a named book opening
    #[arg(long, conflicts_with = "random_opening")]
    opening: Option<String>,

    /// Start from a book opening picked with this seed
    #[arg(long)]
    random_opening: Option<u64>,

    /// Plies of the opening to replay before the engines take over
    #[arg(long, default_value_t = 3)]
    opening_plies: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "self-play aborted");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), EngineError> {
    let config = EngineConfig {
        board_size: args.size,
        use_opening_book: !args.no_book,
        ..EngineConfig::default()
    };
    let mut board = Board::new(args.size)?;
    let mut coordinator = Coordinator::spawn(config)?;

    info!(black = %args.black, white = %args.white, size = args.size, "starting self-play");
    replay_opening(args, &mut board)?;

    let mut side = if board.move_count() % 2 == 0 {
        Side::Black
    } else {
        Side::White
    };

    while board.move_count() < args.max_moves {
        let difficulty = match side {
            Side::Black => args.black,
            Side::White => args.white,
        };

        coordinator.search(board.grid(), side, difficulty, board.move_count())?;
        let result = coordinator.wait(|p| {
            debug!(depth = p.depth, nodes = p.nodes, elapsed_ms = p.elapsed_ms, "thinking");
        })?;

        let Some(pos) = result.best_move else {
            break;
        };
        if !board.place(pos.row.into(), pos.col.into(), side) {
            error!(%side, %pos, "engine proposed an illegal move");
            break;
        }
        println!(
            "{:>3}. {:<5} {:<8} {:<13} score {:>10}  depth {:>2}  {:>5} ms",
            board.move_count(),
            side.to_string(),
            pos.to_string(),
            result.source.to_string(),
            result.score,
            result.depth,
            result.time_ms
        );

        if let Some(line) = board.check_win_at(pos.row.into(), pos.col.into()) {
            println!("\n{}", render(board.grid()));
            let cells: Vec<String> = line.iter().map(ToString::to_string).collect();
            println!("{side} wins with {}", cells.join(" "));
            return Ok(());
        }
        if board.is_full() {
            break;
        }
        side = side.opponent();
    }

    println!("\n{}", render(board.grid()));
    println!("No winner after {} moves", board.move_count());
    Ok(())
}

/// Place the first plies of the requested book opening.
fn replay_opening(args: &Args, board: &mut Board) -> Result<(), EngineError> {
    if args.opening.is_none() && args.random_opening.is_none() {
        return Ok(());
    }
    let book = OpeningBook::builtin()?;
    if book.board_size() != args.size {
        info!(book_size = book.board_size(), "opening book does not cover this board size");
        return Ok(());
    }

    let opening = match (&args.opening, args.random_opening) {
        (Some(name), _) => book.get_opening(name),
        (None, Some(seed)) => book.random_opening(&mut StdRng::seed_from_u64(seed)),
        (None, None) => None,
    };
    let Some(opening) = opening else {
        let names: Vec<&str> = book.openings().iter().map(|o| o.name).collect();
        info!(available = ?names, "unknown opening, starting from an empty board");
        return Ok(());
    };

    info!(name = %opening.name, description = %opening.description, "replaying opening");
    replay_moves(board, &opening.moves, args.opening_plies);
    Ok(())
}

/// Place up to `plies` scripted moves, stopping at the first one the board
/// rejects. Returns how many were placed.
fn replay_moves(board: &mut Board, moves: &[BookMove], plies: usize) -> usize {
    let mut placed = 0;
    for m in moves.iter().take(plies) {
        if !board.place(m.row.into(), m.col.into(), m.side) {
            warn!(side = %m.side, pos = %m.pos(), "opening move rejected, stopping replay");
            break;
        }
        placed += 1;
    }
    placed
}

/// Plain-text board with row and column indices.
fn render(grid: &Grid) -> String {
    let size = grid.size();
    let mut out = String::from("   ");
    for col in 0..size {
        out.push_str(&format!("{col:>3}"));
    }
    out.push('\n');

    for row in 0..size {
        out.push_str(&format!("{row:>3}"));
        for col in 0..size {
            let stone = grid.get_at(row as i32, col as i32).unwrap_or_default();
            let glyph = match stone {
                Stone::Empty => '.',
                Stone::Black => 'X',
                Stone::White => 'O',
            };
            out.push_str(&format!("{glyph:>3}"));
        }
        out.push('\n');
    }
    out
}
