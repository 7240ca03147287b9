//! Best-first search solver for sliding-tile puzzles.
//!
//! This crate solves the 8-puzzle (and its N×N relatives): given a
//! scrambled board it finds a sequence of tile slides reaching the
//! canonical solved arrangement, and reports the path together with
//! search and heuristic statistics.

pub mod board;
pub mod heuristic;
pub mod solver;

// Re-export main types
pub use board::{Board, BoardError, Direction, Move};
pub use heuristic::{HeuristicStats, HeuristicSummary, Score};
pub use solver::{solve, PathStep, SearchNode, SolveReport, SolveStatus, SolverConfig};
