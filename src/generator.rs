//! This module contains the logic for generating the boards of a merged
//! puzzle.
//!
//! Each board goes through two steps: a [Generator] fills it with random
//! digits that honor both the Sudoku rules and the cells fixed by previously
//! solved overlapping boards, and a [Reducer] then removes hints from the
//! solved grid while a [SolutionCounter] guarantees that the puzzle keeps a
//! unique solution. Both steps poll the request [Deadline] cooperatively
//! before each unit of work.

use crate::SudokuGrid;
use crate::deadline::Deadline;
use crate::error::{GenerationError, GenerationResult};
use crate::overlap::{FixedCells, SharedCells};
use crate::solver::SolutionCounter;
use crate::{Difficulty, GRID_SIZE};

use rand::Rng;
use rand::rngs::ThreadRng;

use rand_distr::Normal;

use std::f64::consts;

pub(crate) fn shuffle<T>(rng: &mut impl Rng, values: impl Iterator<Item = T>)
        -> Vec<T> {
    let mut vec: Vec<T> = values.collect();
    let len = vec.len();

    for i in 0..len.saturating_sub(1) {
        let j = rng.gen_range(i..len);
        vec.swap(i, j);
    }

    vec
}

/// A generator fills one board of a merged puzzle with random digits via
/// randomized backtracking. Cells fixed by previously solved overlapping
/// boards are seeded before the search and must be reproduced exactly in the
/// output, which is verified, not merely assumed.
///
/// Candidate digits are tried in a randomized order so that repeated calls do
/// not produce the same solved grid, which would make the resulting puzzles
/// predictable.
pub struct Generator<R: Rng> {
    rng: R
}

impl Generator<ThreadRng> {

    /// Creates a new generator that uses a [ThreadRng] to randomize the
    /// digits.
    pub fn new_default() -> Generator<ThreadRng> {
        Generator::new(rand::thread_rng())
    }
}

impl<R: Rng> Generator<R> {

    /// Creates a new generator that uses the given random number generator
    /// to randomize the digits.
    pub fn new(rng: R) -> Generator<R> {
        Generator {
            rng
        }
    }

    fn fill_rec(&mut self, grid: &mut SudokuGrid, deadline: &Deadline<'_>,
            column: usize, row: usize) -> GenerationResult<bool> {
        if row == GRID_SIZE {
            return Ok(true);
        }

        deadline.check()?;

        let next_column = (column + 1) % GRID_SIZE;
        let next_row = if next_column == 0 { row + 1 } else { row };

        if grid.get_cell(column, row).unwrap() != 0 {
            return self.fill_rec(grid, deadline, next_column, next_row);
        }

        let candidates = grid.candidates(column, row).unwrap();

        for number in shuffle(&mut self.rng, candidates.iter()) {
            grid.set_cell(column, row, number).unwrap();

            if self.fill_rec(grid, deadline, next_column, next_row)? {
                return Ok(true);
            }

            grid.clear_cell(column, row).unwrap();
        }

        Ok(false)
    }

    /// Generates a complete, valid solved grid whose cells at the positions
    /// given in `fixed` hold exactly the required digits.
    ///
    /// # Arguments
    ///
    /// * `fixed`: The cells of this board whose digits are already decided
    /// by previously solved overlapping boards.
    /// * `deadline`: The request deadline, consulted before each cell's
    /// work.
    ///
    /// # Errors
    ///
    /// * `GenerationError::Timeout` If the deadline is breached during the
    /// search.
    /// * `GenerationError::Unsatisfiable` If no complete grid honors both
    /// the Sudoku rules and the fixed cells, which can happen for
    /// pathological placements with self-contradictory overlap constraints.
    /// * `GenerationError::FixedCellsViolated` If the generated grid does
    /// not reproduce all fixed digits. This is an internal invariant
    /// violation and should never be observed.
    pub fn generate(&mut self, fixed: &FixedCells, deadline: &Deadline<'_>)
            -> GenerationResult<SudokuGrid> {
        let mut grid = SudokuGrid::new_empty();

        for (&(column, row), &number) in fixed {
            if !grid.number_fits(column, row, number)
                    .map_err(|_| GenerationError::Unsatisfiable)? {
                return Err(GenerationError::Unsatisfiable);
            }

            grid.set_cell(column, row, number)
                .map_err(|_| GenerationError::Unsatisfiable)?;
        }

        if !self.fill_rec(&mut grid, deadline, 0, 0)? {
            return Err(GenerationError::Unsatisfiable);
        }

        for (&(column, row), &number) in fixed {
            if grid.get_cell(column, row).unwrap() != number {
                return Err(GenerationError::FixedCellsViolated);
            }
        }

        Ok(grid)
    }
}

/// A reducer removes hints from a solved grid to produce a playable puzzle.
///
/// Non-shared cells are visited in an order decided by normally distributed
/// jitter. Each candidate digit is tentatively cleared; the removal is kept
/// exactly if the [SolutionCounter] still reports a single completion and
/// reverted otherwise, so every intermediate grid is itself a valid, unique
/// puzzle. Cells shared with another board are frozen entirely, since a
/// uniqueness check across independently processed boards is not attempted.
pub struct Reducer<R: Rng> {
    rng: R
}

impl Reducer<ThreadRng> {

    /// Creates a new reducer that uses a [ThreadRng] to decide which hints
    /// are removed.
    pub fn new_default() -> Reducer<ThreadRng> {
        Reducer::new(rand::thread_rng())
    }
}

impl<R: Rng> Reducer<R> {

    /// Creates a new reducer that uses the given random number generator to
    /// decide which hints are removed.
    pub fn new(rng: R) -> Reducer<R> {
        Reducer {
            rng
        }
    }

    fn removal_order(&mut self, shared: &SharedCells)
            -> Vec<(usize, usize)> {
        let distr = Normal::new(0.0, consts::FRAC_1_SQRT_2).unwrap();
        let mut cells: Vec<(f64, (usize, usize))> = (0..GRID_SIZE)
            .flat_map(|row| (0..GRID_SIZE).map(move |column| (column, row)))
            .filter(|cell| !shared.contains(cell))
            .map(|cell| (self.rng.sample(distr), cell))
            .collect();
        cells.sort_by(|(j1, _), (j2, _)| j1.partial_cmp(j2).unwrap());
        cells.into_iter().map(|(_, cell)| cell).collect()
    }

    /// Removes hints from the given solved grid until the remaining clue
    /// count reaches the difficulty's target, all non-shared candidates have
    /// been tried, or the deadline is breached.
    ///
    /// Every accepted removal preserves uniqueness, so removal is an anytime
    /// algorithm; nevertheless, a deadline breach aborts the whole request
    /// with a timeout rather than returning the partially punched grid, to
    /// keep request behavior predictable.
    ///
    /// # Arguments
    ///
    /// * `solved`: The complete grid to derive the puzzle from.
    /// * `shared`: The cells frozen because another board occupies the same
    /// world coordinate.
    /// * `difficulty`: Decides the clue count at which removal stops.
    /// * `deadline`: The request deadline, consulted before each removal
    /// attempt.
    ///
    /// # Errors
    ///
    /// `GenerationError::Timeout` If the deadline is breached before the
    /// target clue count is reached.
    pub fn reduce(&mut self, solved: &SudokuGrid, shared: &SharedCells,
            difficulty: Difficulty, deadline: &Deadline<'_>)
            -> GenerationResult<SudokuGrid> {
        let mut puzzle = solved.clone();
        let mut clues = puzzle.count_clues();
        let target = difficulty.target_clues();

        for (column, row) in self.removal_order(shared) {
            if clues <= target {
                break;
            }

            deadline.check()?;

            let number = puzzle.get_cell(column, row).unwrap();

            if number == 0 {
                continue;
            }

            puzzle.clear_cell(column, row).unwrap();

            if SolutionCounter.count(&puzzle, 2) == 1 {
                clues -= 1;
            }
            else {
                puzzle.set_cell(column, row, number).unwrap();
            }
        }

        Ok(puzzle)
    }
}
