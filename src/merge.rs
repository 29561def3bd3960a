//! This module contains the orchestration of a full merged-puzzle request.
//!
//! A [MergeGenerator] runs two passes over the layout, both bounded by the
//! same [Deadline]. The *solve pass* iterates the boards in layout order,
//! computes each board's [fixed cells](crate::overlap::fixed_cells) against
//! the boards solved so far and fills it with a [Generator], so that later
//! boards always agree with earlier ones on overlapping cells. The *puzzle
//! pass* then computes each board's
//! [shared cells](crate::overlap::shared_cells) against the full layout and
//! removes hints with a [Reducer].
//!
//! Failures are all-or-nothing: any timeout or solver failure aborts the
//! whole request and no partial board list is ever surfaced, even if some
//! boards were already fully solved or punched.

use crate::{BoardPlacement, Difficulty, PuzzleBoard, SolvedBoard};
use crate::deadline::Deadline;
use crate::error::{GenerationError, GenerationResult};
use crate::generator::{Generator, Reducer};
use crate::overlap;

use rand::Rng;
use rand::rngs::ThreadRng;

/// Orchestrates the generation of a complete merged puzzle from a layout of
/// board placements. All state is request-scoped; a generator may be reused
/// across requests but carries nothing over between them except its random
/// number generator state.
pub struct MergeGenerator<R: Rng> {
    generator: Generator<R>,
    reducer: Reducer<R>,
    max_boards: usize
}

impl MergeGenerator<ThreadRng> {

    /// Creates a new merge generator with the given maximum board count that
    /// uses [ThreadRng]s for all random decisions.
    pub fn new_default(max_boards: usize) -> MergeGenerator<ThreadRng> {
        MergeGenerator::new(Generator::new_default(), Reducer::new_default(),
            max_boards)
    }
}

impl<R: Rng> MergeGenerator<R> {

    /// Creates a new merge generator from its two phase components and the
    /// maximum number of boards accepted in one layout.
    pub fn new(generator: Generator<R>, reducer: Reducer<R>,
            max_boards: usize) -> MergeGenerator<R> {
        MergeGenerator {
            generator,
            reducer,
            max_boards
        }
    }

    /// Generates one puzzle board per entry of `layout`, in layout order.
    /// Boards whose placements make world coordinates coincide agree on
    /// those cells in their solved grids, and the coinciding cells keep
    /// their hints in the puzzles.
    ///
    /// # Arguments
    ///
    /// * `layout`: The ordered board placements of the merged puzzle. Must
    /// contain at least one and at most the configured maximum number of
    /// boards.
    /// * `difficulty`: Decides the clue count targeted by hint removal.
    /// * `deadline`: The request deadline, enforced across both passes.
    ///
    /// # Errors
    ///
    /// * `GenerationError::EmptyLayout` If `layout` contains no boards.
    /// * `GenerationError::TooManyBoards` If `layout` contains more boards
    /// than the configured maximum.
    /// * `GenerationError::Timeout` If the deadline is breached in either
    /// pass.
    /// * `GenerationError::Unsatisfiable` or
    /// `GenerationError::FixedCellsViolated` If a board cannot be solved
    /// (see [Generator::generate]).
    pub fn generate(&mut self, layout: &[BoardPlacement],
            difficulty: Difficulty, deadline: &Deadline<'_>)
            -> GenerationResult<Vec<PuzzleBoard>> {
        if layout.is_empty() {
            return Err(GenerationError::EmptyLayout);
        }

        if layout.len() > self.max_boards {
            return Err(GenerationError::TooManyBoards);
        }

        let mut solved_boards: Vec<SolvedBoard> =
            Vec::with_capacity(layout.len());

        for placement in layout {
            deadline.check()?;

            let fixed = overlap::fixed_cells(placement, &solved_boards);
            let grid = self.generator.generate(&fixed, deadline)?;
            solved_boards.push(SolvedBoard {
                placement: placement.clone(),
                grid
            });
        }

        let mut puzzles = Vec::with_capacity(solved_boards.len());

        for (board_index, solved) in solved_boards.iter().enumerate() {
            deadline.check()?;

            let shared = overlap::shared_cells(board_index, layout);
            let grid = self.reducer
                .reduce(&solved.grid, &shared, difficulty, deadline)?;
            puzzles.push(PuzzleBoard {
                id: solved.placement.id.clone(),
                x: solved.placement.x,
                y: solved.placement.y,
                grid
            });
        }

        Ok(puzzles)
    }
}
