use crate::cell::CellState;
use crate::grid::Grid;

pub fn glyph(state: CellState) -> char {
    match state {
        CellState::Unoccupied => '.',
        CellState::Organism => 'o',
        CellState::Food => '*',
        CellState::ConnectedFood => '@',
        CellState::Obstacle => '#',
    }
}

/// One text line per grid row, top row first.
pub fn render_ascii(grid: &Grid) -> String {
    let mut out = String::with_capacity((grid.x_size() + 1) * grid.y_size());
    for row in grid.cells().chunks(grid.x_size().max(1)) {
        out.extend(row.iter().map(|cell| glyph(cell.state)));
        out.push('\n');
    }
    out
}
