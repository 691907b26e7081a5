//! Read-only neighborhood queries over a `Grid`.

use crate::cell::{Cell, CellState, Position};
use crate::grid::Grid;

pub const NEIGHBOR_SLOTS: usize = 8;

pub fn is_in_range(grid: &Grid, position: Position) -> bool {
    grid.contains(position.x, position.y)
}

/// The in-range Chebyshev neighbors of `center`, scanned row by row from the
/// top-left and packed to the front. Trailing slots are `None` at edges and
/// corners. The order is fixed so seeded runs reproduce.
pub fn neighbor_positions(grid: &Grid, center: Position) -> [Option<Position>; NEIGHBOR_SLOTS] {
    let mut slots = [None; NEIGHBOR_SLOTS];
    let mut filled = 0;
    for y in center.y - 1..=center.y + 1 {
        for x in center.x - 1..=center.x + 1 {
            let candidate = Position::new(x, y);
            if candidate != center && is_in_range(grid, candidate) {
                slots[filled] = Some(candidate);
                filled += 1;
            }
        }
    }
    slots
}

pub fn neighbor_cells(grid: &Grid, cell: &Cell) -> [Option<Cell>; NEIGHBOR_SLOTS] {
    neighbor_positions(grid, cell.position).map(|slot| slot.and_then(|pos| grid.get_cell(pos).ok()))
}

/// Lenient lookup: off-grid coordinates read as `Unoccupied`.
pub fn cell_state_at(grid: &Grid, x: i32, y: i32) -> CellState {
    grid.get_cell_by_coord(x, y)
        .map(|cell| cell.state)
        .unwrap_or(CellState::Unoccupied)
}

pub fn is_organism_at(grid: &Grid, x: i32, y: i32) -> bool {
    cell_state_at(grid, x, y) == CellState::Organism
}

/// Rough articulation test: a non-vacant cell with exactly two orthogonal
/// organism neighbors is assumed to hold the organism together.
///
/// Not consulted by the Metropolis engine.
pub fn will_break_if_lost(grid: &Grid, cell: &Cell) -> bool {
    if cell.state == CellState::Unoccupied {
        return false;
    }
    let Position { x, y } = cell.position;
    let linked = [(x, y - 1), (x - 1, y), (x + 1, y), (x, y + 1)]
        .into_iter()
        .filter(|&(nx, ny)| is_organism_at(grid, nx, ny))
        .count();
    linked == 2
}

/// Current cells at every active position, in active-record order.
pub fn active_cells(grid: &Grid) -> Vec<Cell> {
    grid.active_positions()
        .iter()
        .filter_map(|&pos| grid.get_cell(pos).ok())
        .collect()
}
