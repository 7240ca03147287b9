//! Best-first graph search over sliding-tile boards.
//!
//! Nodes live in an arena and reference their parent by index, so path
//! reconstruction is a plain id walk and the structure stays copyable for
//! testing. The frontier is a binary heap keyed by `(f, creation order)`:
//! lowest `f = g + h` first, ties to the earlier-created node, which
//! preserves relative insertion order among equal scores.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::board::{Board, Move};
use crate::heuristic::{HeuristicStats, Score};

/// Configuration for one search.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Maximum wall-clock search time; unlimited if `None`.
    pub timeout: Option<Duration>,
    /// Maximum node expansions; unlimited if `None`.
    pub max_expansions: Option<usize>,
}

/// Terminal state of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    /// A goal node was reached; the report carries the path.
    Solved,
    /// The frontier emptied without reaching a goal. For a sliding-tile
    /// board this means the start was unsolvable: the reachable state
    /// space is finite and was explored in full.
    Exhausted,
    /// A configured cutoff (timeout or expansion cap) was hit first.
    Cutoff,
}

/// A node in the search arena.
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub board: Board,
    /// Arena index of the parent; `None` for the root.
    pub parent: Option<usize>,
    /// The move that produced this node; `None` for the root.
    pub action: Option<Move>,
    /// Path length from the root.
    pub g: u32,
    /// Heuristic estimate, computed once at creation.
    pub h: Score,
}

impl SearchNode {
    /// Selection priority `f = g + h`, in exact quarter units.
    pub fn f_quarters(&self) -> u32 {
        self.g * 4 + self.h.quarters()
    }

    /// `f = g + h` as a plain number.
    pub fn score(&self) -> f64 {
        f64::from(self.g) + self.h.as_f64()
    }

    pub fn is_goal(&self) -> bool {
        self.board.is_goal()
    }
}

/// One step of a reconstructed solution path, root first.
#[derive(Debug, Clone)]
pub struct PathStep {
    pub board: Board,
    /// Move that produced this step; `None` for the root.
    pub action: Option<Move>,
    pub g: u32,
}

/// Result of one search.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub status: SolveStatus,
    /// Root-first solution path when `status` is `Solved`.
    pub path: Option<Vec<PathStep>>,
    /// Nodes popped and expanded (goal and cutoff pops excluded).
    pub nodes_expanded: usize,
    /// Nodes created, including the root.
    pub nodes_generated: usize,
    /// Distinct state keys seen.
    pub visited_states: usize,
    pub time_elapsed_ms: u64,
    pub heuristic: HeuristicStats,
}

impl SolveReport {
    pub fn solved(&self) -> bool {
        self.status == SolveStatus::Solved
    }

    /// The moves of the solution path, root move first.
    pub fn moves(&self) -> Vec<Move> {
        self.path
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter_map(|step| step.action)
            .collect()
    }
}

/// Run a best-first graph search from `start` toward the solved board.
///
/// Never fails: an unsolvable start exhausts the reachable state space and
/// comes back as `Exhausted` with no path. Termination is guaranteed by the
/// finite state space and the monotonically growing visited set.
pub fn solve(start: &Board, config: &SolverConfig) -> SolveReport {
    let start_time = Instant::now();
    let deadline = config.timeout.map(|t| start_time + t);

    let mut stats = HeuristicStats::new();
    let mut arena: Vec<SearchNode> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    // Min-heap on (f, creation order); arena indices double as creation
    // order stamps.
    let mut frontier: BinaryHeap<Reverse<(u32, usize)>> = BinaryHeap::new();

    let h = start.heuristic(&mut stats);
    arena.push(SearchNode {
        board: start.clone(),
        parent: None,
        action: None,
        g: 0,
        h,
    });
    visited.insert(start.state_key());
    frontier.push(Reverse((arena[0].f_quarters(), 0)));

    let mut nodes_expanded = 0usize;
    let mut status = SolveStatus::Exhausted;
    let mut goal = None;

    while let Some(Reverse((_, id))) = frontier.pop() {
        if deadline.map_or(false, |d| Instant::now() > d) {
            status = SolveStatus::Cutoff;
            break;
        }
        if config.max_expansions.map_or(false, |cap| nodes_expanded >= cap) {
            status = SolveStatus::Cutoff;
            break;
        }

        if arena[id].is_goal() {
            status = SolveStatus::Solved;
            goal = Some(id);
            break;
        }

        nodes_expanded += 1;
        let g = arena[id].g + 1;
        for mv in arena[id].board.legal_moves() {
            let child = arena[id].board.apply(mv);
            let key = child.state_key();
            if visited.contains(&key) {
                continue;
            }
            visited.insert(key);

            let h = child.heuristic(&mut stats);
            let child_id = arena.len();
            arena.push(SearchNode {
                board: child,
                parent: Some(id),
                action: Some(mv),
                g,
                h,
            });
            frontier.push(Reverse((arena[child_id].f_quarters(), child_id)));
        }
    }

    SolveReport {
        status,
        path: goal.map(|id| reconstruct_path(&arena, id)),
        nodes_expanded,
        nodes_generated: arena.len(),
        visited_states: visited.len(),
        time_elapsed_ms: start_time.elapsed().as_millis() as u64,
        heuristic: stats,
    }
}

/// Walk parent ids from `goal` to the root and reverse.
fn reconstruct_path(arena: &[SearchNode], goal: usize) -> Vec<PathStep> {
    let mut steps = Vec::new();
    let mut current = Some(goal);
    while let Some(id) = current {
        let node = &arena[id];
        steps.push(PathStep {
            board: node.board.clone(),
            action: node.action,
            g: node.g,
        });
        current = node.parent;
    }
    steps.reverse();
    steps
}
