//! This module resolves the geometry of a merged layout into per-board cell
//! sets.
//!
//! During the solve pass, [fixed_cells] determines which cells of a board are
//! already decided because an earlier-solved board occupies the same world
//! coordinate. During the puzzle pass, [shared_cells] determines which cells
//! a board shares with *any* other board in the layout, solved or not, since
//! sharing is a geometric property independent of processing order.
//!
//! Both functions are pure; a board that overlaps nothing simply yields an
//! empty set.

use crate::{BoardPlacement, SolvedBoard, GRID_SIZE};

use std::collections::{HashMap, HashSet};

/// A mapping from a board's local `(column, row)` cells to the digits
/// required there because an already-solved board occupies the same world
/// coordinate.
pub type FixedCells = HashMap<(usize, usize), u8>;

/// The set of a board's local `(column, row)` cells that coincide with a cell
/// of at least one other board in the layout.
pub type SharedCells = HashSet<(usize, usize)>;

/// Computes the cells of `board` whose digits are already fixed by boards
/// solved earlier in layout order. For each local cell, the world coordinate
/// is matched against every solved board; the digit assigned there is
/// recorded as required.
///
/// `solved_boards` holds only boards solved before `board`, never `board`
/// itself, so every match is a genuine overlap. Board identifiers play no
/// role here; layouts with duplicate ids resolve like any others.
///
/// Solved grids are complete, so every coinciding cell yields a digit.
pub fn fixed_cells(board: &BoardPlacement, solved_boards: &[SolvedBoard])
        -> FixedCells {
    let mut fixed = FixedCells::new();

    for row in 0..GRID_SIZE {
        for column in 0..GRID_SIZE {
            let (world_x, world_y) = board.world(column, row);

            for solved in solved_boards {
                if let Some((solved_column, solved_row)) =
                        solved.placement.local(world_x, world_y) {
                    let digit = solved.grid
                        .get_cell(solved_column, solved_row)
                        .unwrap();
                    fixed.insert((column, row), digit);
                    break;
                }
            }
        }
    }

    fixed
}

/// Computes the cells of the board at `board_index` in `layout` that coincide
/// with a cell of any other board, regardless of whether that board has been
/// solved yet. These cells are frozen during hint removal.
///
/// The board is identified by its position in `layout`, not by its id, so
/// layouts with duplicate ids still freeze their overlaps.
///
/// # Arguments
///
/// * `board_index`: The position of the board in `layout`. Must be less than
/// `layout.len()`.
/// * `layout`: The placements of all boards in the merged puzzle.
pub fn shared_cells(board_index: usize, layout: &[BoardPlacement])
        -> SharedCells {
    let board = &layout[board_index];
    let mut shared = SharedCells::new();

    for row in 0..GRID_SIZE {
        for column in 0..GRID_SIZE {
            let (world_x, world_y) = board.world(column, row);
            let coincides = layout.iter()
                .enumerate()
                .filter(|&(other_index, _)| other_index != board_index)
                .any(|(_, other)| other.contains(world_x, world_y));

            if coincides {
                shared.insert((column, row));
            }
        }
    }

    shared
}
