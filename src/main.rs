//! Command-line front-end.
//!
//! Default mode loads a position (or the starting position), runs one MCTS
//! search inside the wall-clock budget, and prints the chosen move.
//! `--interactive` instead reads SAN moves from stdin and replays them on
//! the board, alternating sides.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use quince_chess::board::board::Board;
use quince_chess::board::piece::Color;
use quince_chess::search::{Mcts, SearchConfig};
use quince_chess::utils::board_text::{load_board_from_file, render_board};
use quince_chess::utils::san::san_to_move;

struct CliOptions {
    board_file: Option<PathBuf>,
    exploration: f32,
    time_ms: u64,
    start_dark: bool,
    debug: bool,
    verbose: bool,
    dot_file: Option<PathBuf>,
    interactive: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            board_file: None,
            exploration: std::f32::consts::SQRT_2,
            time_ms: 1000,
            start_dark: false,
            debug: false,
            verbose: false,
            dot_file: None,
            interactive: false,
        }
    }
}

fn parse_args() -> Result<CliOptions> {
    let mut options = CliOptions::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--board-file" | "-b" => {
                let value = args.next().context("--board-file needs a path")?;
                options.board_file = Some(PathBuf::from(value));
            }
            "--exploration" | "-c" => {
                let value = args.next().context("--exploration needs a value")?;
                options.exploration = value
                    .parse()
                    .with_context(|| format!("bad exploration constant \"{value}\""))?;
            }
            "--time" | "-t" => {
                let value = args.next().context("--time needs milliseconds")?;
                options.time_ms = value
                    .parse()
                    .with_context(|| format!("bad time limit \"{value}\""))?;
            }
            "--dot-file" => {
                let value = args.next().context("--dot-file needs a path")?;
                options.dot_file = Some(PathBuf::from(value));
            }
            "--start-black" => options.start_dark = true,
            "--debug" | "-d" => options.debug = true,
            "--verbose" | "-v" => options.verbose = true,
            "--interactive" | "-i" => options.interactive = true,
            other => bail!("unknown argument \"{other}\""),
        }
    }

    Ok(options)
}

fn run_search(board: Board, player: Color, options: &CliOptions) -> Result<()> {
    let config = SearchConfig {
        time_limit_ms: options.time_ms,
        exploration_constant: options.exploration,
        debug: options.debug,
        dot_file: options.dot_file.clone(),
        verbose_dot: options.verbose,
    };
    let mut mcts = Mcts::new(config);
    let result = mcts
        .uct_search(&board, player)
        .context("search failed")?;

    match result.best_move {
        Some(best) => println!("{best}"),
        None => println!("no legal moves"),
    }
    eprintln!(
        "iterations: {}, tree size: {}, tree depth: {}",
        result.iterations, result.tree_size, result.tree_depth
    );
    Ok(())
}

fn run_interactive(mut board: Board, mut player: Color) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{}", render_board(&board));
    loop {
        write!(stdout, "{player:?} move (SAN, or quit): ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" {
            return Ok(());
        }

        let mv = match san_to_move(&board, input, player) {
            Ok(mv) => mv,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };
        match board.apply_move(&mv, player) {
            Some(next) => {
                board = next;
                player = player.opposite();
                println!("{}", render_board(&board));
            }
            None => eprintln!("illegal: that leaves your king in check"),
        }
    }
}

fn main() -> Result<()> {
    let options = parse_args()?;

    let board = match &options.board_file {
        Some(path) => load_board_from_file(path)
            .with_context(|| format!("failed to load board from {}", path.display()))?,
        None => Board::starting_position(),
    };
    let player = if options.start_dark {
        Color::Dark
    } else {
        Color::Light
    };

    if options.interactive {
        run_interactive(board, player)
    } else {
        run_search(board, player, &options)
    }
}
