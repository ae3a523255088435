//! Sliding puzzle board
//!
//! Row-major N×N grid of tiles; tile `0` is the blank. Every board is a
//! permutation of `0..N²` and only changes through swaps with the blank.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest and largest supported board sizes
pub const MIN_SIZE: usize = 2;
pub const MAX_SIZE: usize = 8;

/// The blank cell
pub const BLANK: u16 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board size {0} outside {MIN_SIZE}..={MAX_SIZE}")]
    InvalidSize(usize),
    #[error("expected {expected} tiles, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("tiles are not a permutation of 0..{0}")]
    NotPermutation(usize),
    #[error("board cannot be solved")]
    Unsolvable,
    #[error("board is already solved")]
    AlreadySolved,
}

/// A tile slid into the blank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub tile: u16,
    /// Where the tile was
    pub from: usize,
    /// Where the blank was
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    tiles: Vec<u16>,
}

impl Board {
    /// The solved board `[1, 2, …, N²-1, 0]`
    pub fn solved(size: usize) -> Result<Self, BoardError> {
        check_size(size)?;
        let cells = size * size;
        let mut tiles: Vec<u16> = (1..cells as u16).collect();
        tiles.push(BLANK);
        Ok(Self { size, tiles })
    }

    /// Build a board from explicit tiles (validated)
    pub fn from_tiles(size: usize, tiles: Vec<u16>) -> Result<Self, BoardError> {
        check_size(size)?;
        let cells = size * size;
        if tiles.len() != cells {
            return Err(BoardError::WrongLength {
                expected: cells,
                actual: tiles.len(),
            });
        }
        let mut seen = vec![false; cells];
        for &tile in &tiles {
            let slot = seen.get_mut(tile as usize).ok_or(BoardError::NotPermutation(cells))?;
            if *slot {
                return Err(BoardError::NotPermutation(cells));
            }
            *slot = true;
        }
        Ok(Self { size, tiles })
    }

    /// A random board that is solvable and not already solved
    pub fn shuffled<R: Rng>(size: usize, rng: &mut R) -> Result<Self, BoardError> {
        let mut board = Self::solved(size)?;
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            board.tiles.shuffle(rng);
            if board.is_solvable() && !board.is_solved() {
                log::debug!("Shuffled {size}x{size} board in {attempts} attempt(s)");
                return Ok(board);
            }
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tiles(&self) -> &[u16] {
        &self.tiles
    }

    /// Tile at a row-major index
    pub fn tile(&self, index: usize) -> Option<u16> {
        self.tiles.get(index).copied()
    }

    pub fn blank_index(&self) -> usize {
        self.tiles.iter().position(|&t| t == BLANK).unwrap_or(0)
    }

    /// Pairs of non-blank tiles out of order
    pub fn inversions(&self) -> usize {
        let values: Vec<u16> = self.tiles.iter().copied().filter(|&t| t != BLANK).collect();
        values
            .iter()
            .enumerate()
            .map(|(i, a)| values[i + 1..].iter().filter(|b| a > *b).count())
            .sum()
    }

    /// Reachable from the solved board through legal slides
    ///
    /// Odd sizes need an even inversion count; even sizes need
    /// `inversions + blank row (from the top)` to be odd.
    pub fn is_solvable(&self) -> bool {
        let inversions = self.inversions();
        if self.size % 2 == 1 {
            inversions % 2 == 0
        } else {
            let blank_row = self.blank_index() / self.size;
            (inversions + blank_row) % 2 == 1
        }
    }

    pub fn is_solved(&self) -> bool {
        let last = self.tiles.len() - 1;
        self.tiles[last] == BLANK
            && self.tiles[..last]
                .iter()
                .enumerate()
                .all(|(i, &t)| t as usize == i + 1)
    }

    /// Orthogonal neighbours (no wrap-around between rows)
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        let n = self.size;
        let (ra, ca) = (a / n, a % n);
        let (rb, cb) = (b / n, b % n);
        ra.abs_diff(rb) + ca.abs_diff(cb) == 1
    }

    /// Slide the tile at `index` into the blank if it is next to it
    pub fn try_move(&mut self, index: usize) -> Option<Slide> {
        if index >= self.tiles.len() {
            return None;
        }
        let blank = self.blank_index();
        if !self.is_adjacent(index, blank) {
            return None;
        }
        let tile = self.tiles[index];
        self.tiles.swap(index, blank);
        Some(Slide {
            tile,
            from: index,
            to: blank,
        })
    }

    /// Reset to the solved permutation
    pub fn solve(&mut self) {
        let cells = self.tiles.len() as u16;
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            *tile = (i as u16 + 1) % cells;
        }
    }
}

fn check_size(size: usize) -> Result<(), BoardError> {
    if (MIN_SIZE..=MAX_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(BoardError::InvalidSize(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_solved_layout() {
        let board = Board::solved(3).unwrap();
        assert_eq!(board.tiles(), &[1, 2, 3, 4, 5, 6, 7, 8, 0]);
        assert!(board.is_solved());
        assert!(board.is_solvable());
        assert_eq!(board.blank_index(), 8);
        assert!(Board::solved(4).unwrap().is_solvable());
    }

    #[test]
    fn test_invalid_boards() {
        assert_eq!(Board::solved(1), Err(BoardError::InvalidSize(1)));
        assert_eq!(
            Board::from_tiles(2, vec![1, 2, 0]),
            Err(BoardError::WrongLength { expected: 4, actual: 3 })
        );
        assert_eq!(Board::from_tiles(2, vec![1, 1, 2, 0]), Err(BoardError::NotPermutation(4)));
        assert_eq!(Board::from_tiles(2, vec![1, 2, 4, 0]), Err(BoardError::NotPermutation(4)));
    }

    #[test]
    fn test_single_move_wins() {
        let mut board = Board::from_tiles(3, vec![1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
        assert!(!board.is_solved());
        let slide = board.try_move(8).unwrap();
        assert_eq!(slide, Slide { tile: 8, from: 8, to: 7 });
        assert_eq!(board.tiles(), &[1, 2, 3, 4, 5, 6, 7, 8, 0]);
        assert!(board.is_solved());
        // Idempotent
        assert!(board.is_solved());
    }

    #[test]
    fn test_non_adjacent_is_noop() {
        let mut board = Board::from_tiles(3, vec![1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
        let before = board.clone();
        assert!(board.try_move(0).is_none());
        assert!(board.try_move(7).is_none());
        assert!(board.try_move(42).is_none());
        assert_eq!(board, before);
    }

    #[test]
    fn test_no_row_wrap() {
        let board = Board::solved(3).unwrap();
        // Index 2 ends row 0, index 3 starts row 1
        assert!(!board.is_adjacent(2, 3));
        assert!(board.is_adjacent(2, 5));
        assert!(board.is_adjacent(4, 3));
    }

    #[test]
    fn test_solvability_rules() {
        // One swap away from solved: odd inversions
        let swapped = Board::from_tiles(3, vec![2, 1, 3, 4, 5, 6, 7, 8, 0]).unwrap();
        assert_eq!(swapped.inversions(), 1);
        assert!(!swapped.is_solvable());

        // 4x4 classic unsolvable (15 and 14 swapped)
        let mut tiles: Vec<u16> = (1..16).collect();
        tiles.swap(13, 14);
        tiles.push(0);
        assert!(!Board::from_tiles(4, tiles).unwrap().is_solvable());

        // Blank moved up one row from solved stays solvable
        let mut board = Board::solved(4).unwrap();
        board.try_move(11).unwrap();
        assert!(board.is_solvable());
    }

    #[test]
    fn test_shuffled_is_playable() {
        let mut rng = Pcg32::seed_from_u64(5);
        for size in MIN_SIZE..=5 {
            for _ in 0..20 {
                let board = Board::shuffled(size, &mut rng).unwrap();
                assert!(board.is_solvable());
                assert!(!board.is_solved());
            }
        }
    }

    #[test]
    fn test_solve_resets() {
        let mut board = Board::shuffled(4, &mut Pcg32::seed_from_u64(1)).unwrap();
        board.solve();
        assert_eq!(board, Board::solved(4).unwrap());
    }
}
