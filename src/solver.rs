//! This module contains the uniqueness oracle used during hint removal.
//!
//! The [SolutionCounter] performs the same constrained backtracking search as
//! the generator, but over a partially filled grid and without any
//! randomization, so that results are deterministic and therefore easy to
//! test. It counts complete valid assignments and terminates early once a
//! caller-provided limit is reached, which makes the common uniqueness query
//! (`limit = 2`) cheap.
//!
//! The counter has no deadline of its own; callers bound the total search by
//! capping the number of removal attempts via the outer deadline.

use crate::{SudokuGrid, GRID_SIZE};

/// Counts the completions of a partially filled grid by exhaustive
/// backtracking, short-circuiting once a limit is reached. A puzzle is
/// uniquely solvable exactly if the count with `limit = 2` is 1.
pub struct SolutionCounter;

impl SolutionCounter {

    /// Counts the number of distinct solved grids that complete the given
    /// grid, truncated at `limit`. The returned value is in `[0, limit]`.
    ///
    /// Candidates are tried in ascending digit order, so repeated calls on
    /// the same grid yield the same result.
    pub fn count(&self, grid: &SudokuGrid, limit: usize) -> usize {
        if limit == 0 {
            return 0;
        }

        let mut work = grid.clone();
        let mut found = 0;
        SolutionCounter::count_rec(&mut work, 0, 0, limit, &mut found);
        found
    }

    fn count_rec(grid: &mut SudokuGrid, column: usize, row: usize,
            limit: usize, found: &mut usize) {
        if row == GRID_SIZE {
            *found += 1;
            return;
        }

        let next_column = (column + 1) % GRID_SIZE;
        let next_row = if next_column == 0 { row + 1 } else { row };

        if grid.get_cell(column, row).unwrap() != 0 {
            SolutionCounter::count_rec(grid, next_column, next_row, limit,
                found);
            return;
        }

        for number in grid.candidates(column, row).unwrap().iter() {
            grid.set_cell(column, row, number).unwrap();
            SolutionCounter::count_rec(grid, next_column, next_row, limit,
                found);
            grid.clear_cell(column, row).unwrap();

            if *found >= limit {
                return;
            }
        }
    }
}
