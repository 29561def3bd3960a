// Code lints

#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]

// Doc lints

#![warn(missing_docs)]

//! This crate implements an engine for *merged* Sudoku puzzles: several 9x9
//! boards placed on a shared coordinate plane, some of which overlap at
//! individual cells. It supports the following key features:
//!
//! * Parsing and printing 9x9 Sudoku grids
//! * Resolving overlaps between placed boards into fixed and shared cells
//! * Filling boards with random digits that honor both the Sudoku rules and
//! the digits fixed by previously solved overlapping boards
//! * Removing hints while a backtracking counter guarantees that every board
//! keeps a unique solution
//! * Orchestrating both passes over a whole layout under a single time
//! budget, with a per-client daily quota layer on top
//!
//! # Parsing and printing grids
//!
//! See [SudokuGrid::parse] for the exact format of a grid code.
//!
//! ```
//! use sudoku_merge::SudokuGrid;
//!
//! let grid = SudokuGrid::parse("\
//!     53..7....\
//!     6..195...\
//!     .98....6.\
//!     8...6...3\
//!     4..8.3..1\
//!     7...2...6\
//!     .6....28.\
//!     ...419..5\
//!     ....8..79").unwrap();
//!
//! assert_eq!(30, grid.count_clues());
//! println!("{}", grid);
//! ```
//!
//! # Generating a merged puzzle
//!
//! A [MergeGenerator](merge::MergeGenerator) runs the full pipeline: it
//! solves each board of a layout in order, propagating digits across
//! overlaps, and then removes hints from each solved board. The whole run is
//! bounded by a [Deadline](deadline::Deadline).
//!
//! ```
//! use sudoku_merge::{BoardPlacement, Difficulty};
//! use sudoku_merge::deadline::{Deadline, MonotonicClock};
//! use sudoku_merge::merge::MergeGenerator;
//! use sudoku_merge::solver::SolutionCounter;
//!
//! let layout = vec![
//!     BoardPlacement::new("1", 0, 0)
//! ];
//! let clock = MonotonicClock::start();
//! let deadline = Deadline::from_millis(&clock, 10_000);
//! let mut generator = MergeGenerator::new_default(4);
//! let puzzles =
//!     generator.generate(&layout, Difficulty::Easy, &deadline).unwrap();
//!
//! assert_eq!(1, puzzles.len());
//! assert_eq!(1, SolutionCounter.count(&puzzles[0].grid, 2));
//! ```
//!
//! # Note regarding performance
//!
//! Counting solutions during hint removal is a backtracking search. It is
//! strongly recommended to use at least `opt-level = 2`, even in tests that
//! generate puzzles.

pub mod deadline;
pub mod error;
pub mod generator;
pub mod merge;
pub mod overlap;
pub mod quota;
pub mod solver;
pub mod util;

use error::{
    SudokuError,
    SudokuParseError,
    SudokuParseResult,
    SudokuResult
};
use util::DigitSet;

use serde::{Deserialize, Serialize};

use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};

/// The width and height of every Sudoku board handled by this crate.
pub const GRID_SIZE: usize = 9;

/// The width and height of one sub-block of a board.
pub const BLOCK_SIZE: usize = 3;

const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// A 9x9 Sudoku grid. Each cell holds a digit from 1 to 9 or is empty, which
/// is represented as 0 in the serialized form.
///
/// A grid is a passive container; the Sudoku rules are available as query
/// methods such as [SudokuGrid::number_fits] and [SudokuGrid::is_solved], but
/// nothing prevents the construction of a grid that violates them.
///
/// Grids serialize as a flat array of 81 numbers in left-to-right,
/// top-to-bottom order, where 0 denotes an empty cell.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct SudokuGrid {
    cells: Vec<u8>
}

fn index(column: usize, row: usize) -> usize {
    row * GRID_SIZE + column
}

fn to_char(cell: u8) -> char {
    if cell == 0 {
        ' '
    }
    else {
        (b'0' + cell) as char
    }
}

fn line(start: char, thick_sep: char, thin_sep: char,
        segment: impl Fn(usize) -> char, pad: char, end: char, newline: bool)
        -> String {
    let mut result = String::new();

    for x in 0..GRID_SIZE {
        if x == 0 {
            result.push(start);
        }
        else if x % BLOCK_SIZE == 0 {
            result.push(thick_sep);
        }
        else {
            result.push(thin_sep);
        }

        result.push(pad);
        result.push(segment(x));
        result.push(pad);
    }

    result.push(end);

    if newline {
        result.push('\n');
    }

    result
}

fn top_row() -> String {
    line('╔', '╦', '╤', |_| '═', '═', '╗', true)
}

fn thin_separator_line() -> String {
    line('╟', '╫', '┼', |_| '─', '─', '╢', true)
}

fn thick_separator_line() -> String {
    line('╠', '╬', '╪', |_| '═', '═', '╣', true)
}

fn bottom_row() -> String {
    line('╚', '╩', '╧', |_| '═', '═', '╝', false)
}

fn content_row(grid: &SudokuGrid, y: usize) -> String {
    line('║', '║', '│', |x| to_char(grid.cells[index(x, y)]), ' ', '║', true)
}

impl Display for SudokuGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for y in 0..GRID_SIZE {
            if y == 0 {
                f.write_str(top_row().as_str())?;
            }
            else if y % BLOCK_SIZE == 0 {
                f.write_str(thick_separator_line().as_str())?;
            }
            else {
                f.write_str(thin_separator_line().as_str())?;
            }

            f.write_str(content_row(self, y).as_str())?;
        }

        f.write_str(bottom_row().as_str())
    }
}

impl TryFrom<Vec<u8>> for SudokuGrid {
    type Error = SudokuParseError;

    fn try_from(cells: Vec<u8>) -> SudokuParseResult<SudokuGrid> {
        if cells.len() != CELL_COUNT {
            return Err(SudokuParseError::WrongNumberOfCells);
        }

        if cells.iter().any(|&c| c > 9) {
            return Err(SudokuParseError::InvalidCharacter);
        }

        Ok(SudokuGrid {
            cells
        })
    }
}

impl From<SudokuGrid> for Vec<u8> {
    fn from(grid: SudokuGrid) -> Vec<u8> {
        grid.cells
    }
}

impl SudokuGrid {

    /// Creates a new, empty 9x9 grid.
    pub fn new_empty() -> SudokuGrid {
        SudokuGrid {
            cells: vec![0; CELL_COUNT]
        }
    }

    /// Parses a code encoding a grid. The code must contain exactly 81
    /// significant characters, one per cell in left-to-right, top-to-bottom
    /// order, where each row is completed before the next one is started. A
    /// digit from 1 to 9 denotes a filled cell and a period an empty one.
    /// Whitespace is ignored to allow for more intuitive formatting.
    ///
    /// # Errors
    ///
    /// Any specialization of `SudokuParseError` (see that documentation).
    pub fn parse(code: &str) -> SudokuParseResult<SudokuGrid> {
        let mut cells = Vec::with_capacity(CELL_COUNT);

        for c in code.chars() {
            if c.is_whitespace() {
                continue;
            }

            match c {
                '.' => cells.push(0),
                '1'..='9' => cells.push(c as u8 - b'0'),
                _ => return Err(SudokuParseError::InvalidCharacter)
            }
        }

        SudokuGrid::try_from(cells)
    }

    /// Converts the grid into a `String` in a way that is consistent with
    /// [SudokuGrid::parse]. That is, a grid that is converted to a code and
    /// parsed again will not change.
    pub fn to_code(&self) -> String {
        self.cells.iter()
            .map(|&c| if c == 0 { '.' } else { (b'0' + c) as char })
            .collect()
    }

    fn check_bounds(column: usize, row: usize) -> SudokuResult<()> {
        if column >= GRID_SIZE || row >= GRID_SIZE {
            Err(SudokuError::OutOfBounds)
        }
        else {
            Ok(())
        }
    }

    /// Gets the content of the cell at the specified position, where 0
    /// denotes an empty cell.
    ///
    /// # Arguments
    ///
    /// * `column`: The column (x-coordinate) of the desired cell. Must be in
    /// the range `[0, 9[`.
    /// * `row`: The row (y-coordinate) of the desired cell. Must be in the
    /// range `[0, 9[`.
    ///
    /// # Errors
    ///
    /// If either `column` or `row` are not in the specified range. In that
    /// case, `SudokuError::OutOfBounds` is returned.
    pub fn get_cell(&self, column: usize, row: usize) -> SudokuResult<u8> {
        SudokuGrid::check_bounds(column, row)?;
        Ok(self.cells[index(column, row)])
    }

    /// Sets the content of the cell at the specified position to the given
    /// digit. If the cell was not empty, the old digit will be overwritten.
    ///
    /// # Arguments
    ///
    /// * `column`: The column (x-coordinate) of the assigned cell. Must be in
    /// the range `[0, 9[`.
    /// * `row`: The row (y-coordinate) of the assigned cell. Must be in the
    /// range `[0, 9[`.
    /// * `number`: The digit to assign to the specified cell. Must be in the
    /// range `[1, 9]`.
    ///
    /// # Errors
    ///
    /// * `SudokuError::OutOfBounds` If either `column` or `row` are not in
    /// the specified range.
    /// * `SudokuError::InvalidNumber` If `number` is not in the specified
    /// range.
    pub fn set_cell(&mut self, column: usize, row: usize, number: u8)
            -> SudokuResult<()> {
        SudokuGrid::check_bounds(column, row)?;

        if number == 0 || number > 9 {
            return Err(SudokuError::InvalidNumber);
        }

        self.cells[index(column, row)] = number;
        Ok(())
    }

    /// Clears the content of the cell at the specified position, that is, if
    /// it contains a digit, that digit is removed. If the cell is already
    /// empty, it will be left that way.
    ///
    /// # Errors
    ///
    /// If either `column` or `row` are greater than or equal to 9. In that
    /// case, `SudokuError::OutOfBounds` is returned.
    pub fn clear_cell(&mut self, column: usize, row: usize)
            -> SudokuResult<()> {
        SudokuGrid::check_bounds(column, row)?;
        self.cells[index(column, row)] = 0;
        Ok(())
    }

    /// Indicates whether the given digit could be placed in the cell at the
    /// specified position without violating the Sudoku rules, that is,
    /// whether no other cell in the same row, column, or 3x3 block already
    /// contains it. The content of the checked cell itself is ignored.
    ///
    /// # Arguments
    ///
    /// * `column`: The column (x-coordinate) of the checked cell. Must be in
    /// the range `[0, 9[`.
    /// * `row`: The row (y-coordinate) of the checked cell. Must be in the
    /// range `[0, 9[`.
    /// * `number`: The digit to check. Must be in the range `[1, 9]`.
    ///
    /// # Errors
    ///
    /// * `SudokuError::OutOfBounds` If either `column` or `row` are not in
    /// the specified range.
    /// * `SudokuError::InvalidNumber` If `number` is not in the specified
    /// range.
    pub fn number_fits(&self, column: usize, row: usize, number: u8)
            -> SudokuResult<bool> {
        SudokuGrid::check_bounds(column, row)?;

        if number == 0 || number > 9 {
            return Err(SudokuError::InvalidNumber);
        }

        for i in 0..GRID_SIZE {
            if i != column && self.cells[index(i, row)] == number {
                return Ok(false);
            }

            if i != row && self.cells[index(column, i)] == number {
                return Ok(false);
            }
        }

        let block_column = column - column % BLOCK_SIZE;
        let block_row = row - row % BLOCK_SIZE;

        for y in block_row..(block_row + BLOCK_SIZE) {
            for x in block_column..(block_column + BLOCK_SIZE) {
                if (x, y) != (column, row) &&
                        self.cells[index(x, y)] == number {
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }

    /// Computes the set of digits that could be placed in the cell at the
    /// specified position without violating the Sudoku rules, as defined by
    /// [SudokuGrid::number_fits].
    ///
    /// # Errors
    ///
    /// If either `column` or `row` are greater than or equal to 9. In that
    /// case, `SudokuError::OutOfBounds` is returned.
    pub fn candidates(&self, column: usize, row: usize)
            -> SudokuResult<DigitSet> {
        SudokuGrid::check_bounds(column, row)?;

        let mut set = DigitSet::all();

        for i in 0..GRID_SIZE {
            if i != column {
                let cell = self.cells[index(i, row)];

                if cell != 0 {
                    set.remove(cell);
                }
            }

            if i != row {
                let cell = self.cells[index(column, i)];

                if cell != 0 {
                    set.remove(cell);
                }
            }
        }

        let block_column = column / BLOCK_SIZE * BLOCK_SIZE;
        let block_row = row / BLOCK_SIZE * BLOCK_SIZE;

        for y in block_row..(block_row + BLOCK_SIZE) {
            for x in block_column..(block_column + BLOCK_SIZE) {
                let cell = self.cells[index(x, y)];

                if (x, y) != (column, row) && cell != 0 {
                    set.remove(cell);
                }
            }
        }

        Ok(set)
    }

    /// Counts the number of clues given by this grid. This is the number of
    /// non-empty cells.
    pub fn count_clues(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    /// Indicates whether this grid is full, i.e. every cell is filled with a
    /// digit.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c != 0)
    }

    /// Indicates whether this grid is a solved Sudoku, i.e. it is full and
    /// every row, column, and 3x3 block contains each digit from 1 to 9
    /// exactly once.
    pub fn is_solved(&self) -> bool {
        if !self.is_full() {
            return false;
        }

        for i in 0..GRID_SIZE {
            let mut row_digits = DigitSet::empty();
            let mut column_digits = DigitSet::empty();
            let mut block_digits = DigitSet::empty();

            for j in 0..GRID_SIZE {
                row_digits.insert(self.cells[index(j, i)]);
                column_digits.insert(self.cells[index(i, j)]);

                let block_column = i % BLOCK_SIZE * BLOCK_SIZE + j % BLOCK_SIZE;
                let block_row = i / BLOCK_SIZE * BLOCK_SIZE + j / BLOCK_SIZE;
                block_digits.insert(self.cells[index(block_column, block_row)]);
            }

            if row_digits != DigitSet::all() ||
                    column_digits != DigitSet::all() ||
                    block_digits != DigitSet::all() {
                return false;
            }
        }

        true
    }

    /// Indicates whether this grid is a puzzle derived from the given solved
    /// grid, that is, every non-empty cell of this grid holds the same digit
    /// as the corresponding cell of `solution`.
    pub fn is_derived_from(&self, solution: &SudokuGrid) -> bool {
        self.cells.iter()
            .zip(solution.cells.iter())
            .all(|(&cell, &solution_cell)|
                cell == 0 || cell == solution_cell)
    }
}

/// The position of one 9x9 board on the shared coordinate plane of a merged
/// puzzle. Coordinates are in cell-grid units, i.e. one unit is the width of
/// one Sudoku cell, and the board covers the world coordinates
/// `[x, x + 9[ × [y, y + 9[`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoardPlacement {

    /// The identifier of this board, echoed back in the response.
    pub id: String,

    /// The x-coordinate (in cell units) of the board's left edge.
    pub x: i32,

    /// The y-coordinate (in cell units) of the board's top edge.
    pub y: i32
}

impl BoardPlacement {

    /// Creates a new board placement with the given identifier anchored at
    /// the world coordinate `(x, y)`.
    pub fn new(id: impl Into<String>, x: i32, y: i32) -> BoardPlacement {
        BoardPlacement {
            id: id.into(),
            x,
            y
        }
    }

    /// The world coordinate of the local cell in the given column and row of
    /// this board.
    pub fn world(&self, column: usize, row: usize) -> (i32, i32) {
        (self.x + column as i32, self.y + row as i32)
    }

    /// Indicates whether the given world coordinate lies on this board.
    pub fn contains(&self, world_x: i32, world_y: i32) -> bool {
        world_x >= self.x && world_x < self.x + GRID_SIZE as i32 &&
            world_y >= self.y && world_y < self.y + GRID_SIZE as i32
    }

    /// The local `(column, row)` of the given world coordinate on this board,
    /// or `None` if the coordinate does not lie on it.
    pub fn local(&self, world_x: i32, world_y: i32)
            -> Option<(usize, usize)> {
        if self.contains(world_x, world_y) {
            Some(((world_x - self.x) as usize, (world_y - self.y) as usize))
        }
        else {
            None
        }
    }
}

/// A board placement paired with a completed grid. Solved boards are produced
/// one by one during the solve pass and are immutable afterwards; later
/// boards derive their fixed cells from them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SolvedBoard {

    /// The placement of this board in the layout.
    pub placement: BoardPlacement,

    /// The completed grid of this board.
    pub grid: SudokuGrid
}

/// A single puzzle board of the response: the placement of the board together
/// with its punched grid.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PuzzleBoard {

    /// The identifier of the board, as given in the request layout.
    pub id: String,

    /// The x-coordinate (in cell units) of the board's left edge.
    pub x: i32,

    /// The y-coordinate (in cell units) of the board's top edge.
    pub y: i32,

    /// The puzzle grid of this board.
    pub grid: SudokuGrid
}

/// The difficulty selector of a generation request. Each difficulty maps to a
/// target number of remaining clues after hint removal; the mapping is a
/// policy constant, not a hard contract.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {

    /// At least 36 clues remain.
    Easy,

    /// Between 30 and 35 clues remain.
    Normal,

    /// Between 24 and 29 clues remain, where reachable without losing
    /// uniqueness.
    Hard
}

impl Difficulty {

    /// The number of clues at which hint removal stops for this difficulty.
    /// Removal may also stop earlier if no further hint can be removed
    /// without losing uniqueness.
    pub fn target_clues(self) -> usize {
        match self {
            Difficulty::Easy => 36,
            Difficulty::Normal => 32,
            Difficulty::Hard => 26
        }
    }
}
