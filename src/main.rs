//! CLI entry point for the sliding-tile solver.
//!
//! Usage:
//!   npuzzle-solver solve <board.json> [options]
//!   npuzzle-solver solve --stdin [options]
//!   npuzzle-solver scramble [--side 3] [--steps 1000] [options]
//!
//! A board is a JSON 2-D array of integers, 0 for the blank, e.g.
//! `[[1,2,3],[4,0,6],[7,5,8]]`. The solve report is printed as JSON on
//! stdout. Exit code 0 when a path was found, 1 when not, 2 on bad input.

mod board;
mod heuristic;
mod solver;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rand::thread_rng;
use serde::Serialize;

use board::Board;
use heuristic::HeuristicSummary;
use solver::{solve, SolveReport, SolveStatus, SolverConfig};

#[derive(Parser)]
#[command(name = "npuzzle-solver")]
#[command(about = "Best-first search solver for sliding-tile puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a board given as a JSON grid
    Solve {
        /// Path to board JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read the board from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// Maximum search time in seconds (unlimited if omitted)
        #[arg(long)]
        timeout: Option<u64>,

        /// Maximum node expansions (unlimited if omitted)
        #[arg(long)]
        max_expansions: Option<usize>,
    },
    /// Scramble a solved board with random moves, then solve it back
    Scramble {
        /// Grid dimension
        #[arg(long, default_value = "3")]
        side: usize,

        /// Number of random moves (an even count keeps the board solvable)
        #[arg(long, default_value = "1000")]
        steps: usize,

        /// Maximum search time in seconds (unlimited if omitted)
        #[arg(long)]
        timeout: Option<u64>,

        /// Maximum node expansions (unlimited if omitted)
        #[arg(long)]
        max_expansions: Option<usize>,
    },
}

/// Output format for the solve report
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    solved: bool,
    status: SolveStatus,
    solvable: bool,
    start: Vec<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path_length: Option<usize>,
    nodes_expanded: usize,
    nodes_generated: usize,
    visited_states: usize,
    time_elapsed_ms: u64,
    heuristic: HeuristicSummary,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            stdin,
            timeout,
            max_expansions,
        } => {
            let json_content = if stdin {
                let mut buffer = String::new();
                if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(2);
                }
                buffer
            } else if let Some(path) = file {
                match fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        eprintln!("Error reading file {:?}: {}", path, e);
                        std::process::exit(2);
                    }
                }
            } else {
                eprintln!("Error: must provide either a file path or --stdin");
                std::process::exit(2);
            };

            let grid: Vec<Vec<u8>> = match serde_json::from_str(&json_content) {
                Ok(grid) => grid,
                Err(e) => {
                    eprintln!("Error parsing board JSON: {}", e);
                    std::process::exit(2);
                }
            };

            let start = match Board::from_grid(&grid) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("Invalid board: {}", e);
                    std::process::exit(2);
                }
            };

            run(&start, timeout, max_expansions);
        }
        Commands::Scramble {
            side,
            steps,
            timeout,
            max_expansions,
        } => {
            // Cell values are u8, which caps the grid dimension.
            if !(2..=16).contains(&side) {
                eprintln!("Error: side must be between 2 and 16");
                std::process::exit(2);
            }
            let start = Board::solved(side).scramble(steps, &mut thread_rng());
            run(&start, timeout, max_expansions);
        }
    }
}

fn run(start: &Board, timeout: Option<u64>, max_expansions: Option<usize>) {
    let config = SolverConfig {
        timeout: timeout.map(Duration::from_secs),
        max_expansions,
    };

    let report = solve(start, &config);
    let output = format_report(start, &report);

    println!("{}", serde_json::to_string_pretty(&output).unwrap());

    if report.solved() {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}

fn format_report(start: &Board, report: &SolveReport) -> SolveOutput {
    SolveOutput {
        solved: report.solved(),
        status: report.status,
        solvable: start.is_solvable(),
        start: start.to_grid(),
        moves: report.path.as_ref().map(|_| {
            report
                .moves()
                .iter()
                .map(|mv| mv.direction.to_string())
                .collect()
        }),
        path_length: report.path.as_ref().map(|path| path.len()),
        nodes_expanded: report.nodes_expanded,
        nodes_generated: report.nodes_generated,
        visited_states: report.visited_states,
        time_elapsed_ms: report.time_elapsed_ms,
        heuristic: report.heuristic.summary(),
    }
}
