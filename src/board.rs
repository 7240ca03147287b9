//! Sliding-tile board representation.
//!
//! A board is a value object: applying a move or scrambling never mutates
//! the source board, it produces a new one. The single blank cell is
//! represented by the value 0.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::heuristic::{self, HeuristicStats, Score};

/// Direction a tile slides into the blank cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        write!(f, "{}", s)
    }
}

/// A single tile slide: the tile at `from` moves into the blank at `to`.
///
/// Moves are plain data with no captured board state and can be replayed
/// against any board through [`Board::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub direction: Direction,
    /// Row/column of the sliding tile.
    pub from: (usize, usize),
    /// Row/column of the blank the tile slides into.
    pub to: (usize, usize),
}

impl Move {
    /// The move that undoes this one on the resulting board.
    pub fn inverse(self) -> Move {
        Move {
            direction: self.direction.opposite(),
            from: self.to,
            to: self.from,
        }
    }
}

/// Validation failure when constructing a board from a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    EmptyGrid,
    /// A row's length does not match the number of rows.
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },
    ValueOutOfRange {
        value: u8,
        max: u8,
    },
    DuplicateValue {
        value: u8,
    },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::EmptyGrid => write!(f, "grid has no rows"),
            BoardError::RaggedGrid {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} cells, expected {} for a square grid",
                row, found, expected
            ),
            BoardError::ValueOutOfRange { value, max } => {
                write!(f, "value {} is out of range 0..={}", value, max)
            }
            BoardError::DuplicateValue { value } => {
                write!(f, "value {} appears more than once", value)
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// A square sliding-tile board.
///
/// Cells are stored row-major; exactly one cell holds 0 (the blank) and
/// every value in `0..side²` appears exactly once. The invariant is checked
/// once in [`Board::from_grid`] and preserved by construction everywhere
/// else. Cells are `u8`, which caps the dimension at 16.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    side: usize,
    cells: Vec<u8>,
    /// Cached index of the blank cell.
    blank: usize,
}

impl Board {
    /// Build a board from a 2-D grid, validating the invariant.
    pub fn from_grid(grid: &[Vec<u8>]) -> Result<Board, BoardError> {
        let side = grid.len();
        if side == 0 {
            return Err(BoardError::EmptyGrid);
        }
        let count = side * side;
        let max = (count - 1) as u8;

        let mut cells = Vec::with_capacity(count);
        let mut seen = vec![false; count];
        for (row, values) in grid.iter().enumerate() {
            if values.len() != side {
                return Err(BoardError::RaggedGrid {
                    row,
                    expected: side,
                    found: values.len(),
                });
            }
            for &value in values {
                if value as usize >= count {
                    return Err(BoardError::ValueOutOfRange { value, max });
                }
                if seen[value as usize] {
                    return Err(BoardError::DuplicateValue { value });
                }
                seen[value as usize] = true;
                cells.push(value);
            }
        }

        // Every value 0..count appeared exactly once, so the blank exists.
        let blank = cells.iter().position(|&v| v == 0).unwrap();
        Ok(Board { side, cells, blank })
    }

    /// The canonical solved board: `1, 2, …, side²-1` row-major, blank last.
    pub fn solved(side: usize) -> Board {
        assert!(side > 0, "side must be at least 1");
        let count = side * side;
        let cells: Vec<u8> = (0..count).map(|i| ((i + 1) % count) as u8).collect();
        Board {
            side,
            cells,
            blank: count - 1,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn value_at(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.side + col]
    }

    fn blank_pos(&self) -> (usize, usize) {
        (self.blank / self.side, self.blank % self.side)
    }

    /// The board as a 2-D grid, for serialization back to the caller.
    pub fn to_grid(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.side)
            .map(|row| row.to_vec())
            .collect()
    }

    /// True iff the cells, read row-major, equal `1, 2, …, side²-1, 0`.
    pub fn is_goal(&self) -> bool {
        let count = self.cells.len();
        self.cells
            .iter()
            .enumerate()
            .all(|(i, &v)| v as usize == (i + 1) % count)
    }

    /// All legal moves for this board, in deterministic order.
    ///
    /// Sources are the tiles grid-adjacent to the blank, enumerated in
    /// row-major order of the source cell: above the blank (slides down),
    /// left (slides right), right (slides left), below (slides up).
    /// Repeated calls on the same board return the same sequence.
    pub fn legal_moves(&self) -> SmallVec<[Move; 4]> {
        let (br, bc) = self.blank_pos();
        let mut moves = SmallVec::new();
        if br > 0 {
            moves.push(Move {
                direction: Direction::Down,
                from: (br - 1, bc),
                to: (br, bc),
            });
        }
        if bc > 0 {
            moves.push(Move {
                direction: Direction::Right,
                from: (br, bc - 1),
                to: (br, bc),
            });
        }
        if bc + 1 < self.side {
            moves.push(Move {
                direction: Direction::Left,
                from: (br, bc + 1),
                to: (br, bc),
            });
        }
        if br + 1 < self.side {
            moves.push(Move {
                direction: Direction::Up,
                from: (br + 1, bc),
                to: (br, bc),
            });
        }
        moves
    }

    /// Apply a move, producing a new board with the tile and blank swapped.
    pub fn apply(&self, mv: Move) -> Board {
        let from = mv.from.0 * self.side + mv.from.1;
        let to = mv.to.0 * self.side + mv.to.1;
        debug_assert_eq!(self.cells[to], 0, "move target must be the blank");

        let mut cells = self.cells.clone();
        cells.swap(from, to);
        Board {
            side: self.side,
            cells,
            blank: from,
        }
    }

    /// Sum over all non-blank tiles of the L1 distance to the tile's goal
    /// cell (value `v` belongs at row `(v-1)/side`, column `(v-1)%side`).
    pub fn manhattan_distance(&self) -> u32 {
        let mut distance = 0u32;
        for row in 0..self.side {
            for col in 0..self.side {
                let value = self.value_at(row, col);
                if value != 0 {
                    let goal_row = (value as usize - 1) / self.side;
                    let goal_col = (value as usize - 1) % self.side;
                    distance += row.abs_diff(goal_row) as u32;
                    distance += col.abs_diff(goal_col) as u32;
                }
            }
        }
        distance
    }

    /// The heuristic estimate driving the search. See [`crate::heuristic`].
    pub fn heuristic(&self, stats: &mut HeuristicStats) -> Score {
        heuristic::evaluate(self, stats)
    }

    /// Apply `steps` random legal moves, each chosen uniformly.
    ///
    /// An even `steps` from the solved board keeps the result solvable.
    pub fn scramble(&self, steps: usize, rng: &mut impl Rng) -> Board {
        let mut board = self.clone();
        for _ in 0..steps {
            let moves = board.legal_moves();
            match moves.choose(rng) {
                Some(&mv) => board = board.apply(mv),
                None => break,
            }
        }
        board
    }

    /// Parity test: whether the goal is reachable from this board.
    ///
    /// Odd side: solvable iff the inversion count is even. Even side:
    /// solvable iff inversions plus the blank's row index is odd.
    pub fn is_solvable(&self) -> bool {
        let inversions = self.count_inversions();
        if self.side % 2 == 1 {
            inversions % 2 == 0
        } else {
            (inversions + self.blank / self.side) % 2 == 1
        }
    }

    fn count_inversions(&self) -> usize {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0)
            .map(|(i, &v)| {
                self.cells[i + 1..]
                    .iter()
                    .filter(|&&next| next != 0 && next < v)
                    .count()
            })
            .sum()
    }

    /// Canonical linearization of the cells, used for visited-set
    /// membership. Values are comma-delimited so the key stays unambiguous
    /// for boards with multi-digit tiles.
    pub fn state_key(&self) -> String {
        let mut key = String::with_capacity(self.cells.len() * 3);
        for (i, value) in self.cells.iter().enumerate() {
            if i > 0 {
                key.push(',');
            }
            key.push_str(&value.to_string());
        }
        key
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.side) {
            for &value in row {
                write!(f, "{:3}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board(grid: &[Vec<u8>]) -> Board {
        Board::from_grid(grid).unwrap()
    }

    #[test]
    fn test_solved_board_is_goal() {
        assert!(Board::solved(3).is_goal());
        assert!(Board::solved(4).is_goal());
    }

    #[test]
    fn test_goal_rejects_swapped_pairs() {
        // Any single transposition of the goal must fail the goal test.
        let grids = [
            vec![vec![2, 1, 3], vec![4, 5, 6], vec![7, 8, 0]],
            vec![vec![1, 2, 3], vec![4, 6, 5], vec![7, 8, 0]],
            vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 0, 8]],
        ];
        for grid in &grids {
            assert!(!board(grid).is_goal());
        }
    }

    #[test]
    fn test_from_grid_rejects_empty() {
        assert_eq!(Board::from_grid(&[]), Err(BoardError::EmptyGrid));
    }

    #[test]
    fn test_from_grid_rejects_ragged_rows() {
        let grid = vec![vec![1, 2, 3], vec![4, 5], vec![6, 7, 0]];
        assert_eq!(
            Board::from_grid(&grid),
            Err(BoardError::RaggedGrid {
                row: 1,
                expected: 3,
                found: 2,
            })
        );
    }

    #[test]
    fn test_from_grid_rejects_out_of_range() {
        let grid = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]];
        assert_eq!(
            Board::from_grid(&grid),
            Err(BoardError::ValueOutOfRange { value: 9, max: 8 })
        );
    }

    #[test]
    fn test_from_grid_rejects_duplicates() {
        let grid = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 8]];
        assert_eq!(
            Board::from_grid(&grid),
            Err(BoardError::DuplicateValue { value: 8 })
        );
    }

    #[test]
    fn test_from_grid_round_trip() {
        let grid = vec![vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]];
        assert_eq!(board(&grid).to_grid(), grid);
    }

    #[test]
    fn test_legal_moves_center_blank() {
        let b = board(&[vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]]);
        let moves = b.legal_moves();
        let directions: Vec<Direction> = moves.iter().map(|m| m.direction).collect();
        assert_eq!(
            directions,
            vec![
                Direction::Down,
                Direction::Right,
                Direction::Left,
                Direction::Up,
            ]
        );
        // Sources appear in row-major order around the blank at (1, 1).
        let sources: Vec<(usize, usize)> = moves.iter().map(|m| m.from).collect();
        assert_eq!(sources, vec![(0, 1), (1, 0), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_legal_moves_corner_blank() {
        let b = Board::solved(3);
        let directions: Vec<Direction> =
            b.legal_moves().iter().map(|m| m.direction).collect();
        assert_eq!(directions, vec![Direction::Down, Direction::Right]);
    }

    #[test]
    fn test_legal_moves_deterministic_across_calls() {
        let b = board(&[vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]]);
        assert_eq!(b.legal_moves().to_vec(), b.legal_moves().to_vec());
    }

    #[test]
    fn test_apply_does_not_mutate_source() {
        let b = board(&[vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]]);
        let key = b.state_key();
        let mv = b.legal_moves()[0];
        let _child = b.apply(mv);
        assert_eq!(b.state_key(), key);
    }

    #[test]
    fn test_move_reversibility() {
        let b = board(&[vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]]);
        for &mv in &b.legal_moves() {
            let forward = b.apply(mv);
            let back = forward.apply(mv.inverse());
            assert_eq!(back.state_key(), b.state_key());
        }
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(Board::solved(3).manhattan_distance(), 0);
        let one_off = board(&[vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]]);
        assert_eq!(one_off.manhattan_distance(), 1);
        let scattered = board(&[vec![8, 7, 6], vec![5, 4, 3], vec![2, 1, 0]]);
        assert_eq!(scattered.manhattan_distance(), 16);
    }

    #[test]
    fn test_state_key_is_delimited() {
        assert_eq!(Board::solved(3).state_key(), "1,2,3,4,5,6,7,8,0");
        // Multi-digit tiles stay unambiguous.
        let key = Board::solved(4).state_key();
        assert!(key.starts_with("1,2,3,4,5,6,7,8,9,10,"));
        assert!(key.ends_with(",15,0"));
    }

    #[test]
    fn test_solvability_parity() {
        assert!(Board::solved(3).is_solvable());
        assert!(board(&[vec![1, 2, 3], vec![4, 0, 6], vec![7, 5, 8]]).is_solvable());
        // One transposition flips parity.
        assert!(!board(&[vec![2, 1, 3], vec![4, 5, 6], vec![7, 8, 0]]).is_solvable());
    }

    #[test]
    fn test_even_scramble_stays_solvable() {
        let mut rng = StdRng::seed_from_u64(7);
        for steps in [0, 2, 10, 40] {
            let scrambled = Board::solved(3).scramble(steps, &mut rng);
            assert!(scrambled.is_solvable(), "{} steps", steps);
        }
    }

    #[test]
    fn test_scramble_applies_legal_moves_only() {
        let mut rng = StdRng::seed_from_u64(11);
        let scrambled = Board::solved(3).scramble(25, &mut rng);
        // Still a permutation of 0..9 with one blank.
        let mut values: Vec<u8> = scrambled.to_grid().concat();
        values.sort_unstable();
        assert_eq!(values, (0..9).collect::<Vec<u8>>());
    }
}
