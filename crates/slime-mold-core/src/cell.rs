use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer grid coordinate. May lie outside a grid; see `topology::is_in_range`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// What occupies a grid cell.
///
/// `ConnectedFood` is terminal: it is only reached from `Food` when an
/// organism cell appears next to it, and nothing converts it back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Unoccupied,
    Organism,
    Food,
    ConnectedFood,
    Obstacle,
}

impl CellState {
    /// Food, connected food and obstacles never change through Metropolis moves.
    pub fn is_fixed(self) -> bool {
        matches!(
            self,
            CellState::Food | CellState::ConnectedFood | CellState::Obstacle
        )
    }
}

/// Immutable cell value. State changes are made by building a new `Cell`
/// and handing it to `Grid::replace_cell`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub position: Position,
    pub state: CellState,
    pub energy: f64,
}

impl Cell {
    pub const fn new(position: Position, state: CellState, energy: f64) -> Self {
        Self {
            position,
            state,
            energy,
        }
    }

    pub fn unoccupied(position: Position) -> Self {
        Self::new(position, CellState::Unoccupied, 0.0)
    }

    /// Same position, different state and energy.
    pub fn with_state(&self, state: CellState, energy: f64) -> Self {
        Self::new(self.position, state, energy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_equality_is_structural() {
        assert_eq!(Position::new(3, 4), Position::new(3, 4));
        assert_ne!(Position::new(3, 4), Position::new(4, 3));
    }

    #[test]
    fn cell_equality_covers_all_fields() {
        let pos = Position::new(1, 1);
        let a = Cell::new(pos, CellState::Organism, 1.0);
        assert_eq!(a, Cell::new(pos, CellState::Organism, 1.0));
        assert_ne!(a, Cell::new(pos, CellState::Organism, 2.0));
        assert_ne!(a, Cell::new(pos, CellState::Unoccupied, 1.0));
        assert_ne!(a, Cell::new(Position::new(1, 2), CellState::Organism, 1.0));
    }

    #[test]
    fn only_organism_and_vacancy_are_mutable() {
        assert!(!CellState::Unoccupied.is_fixed());
        assert!(!CellState::Organism.is_fixed());
        assert!(CellState::Food.is_fixed());
        assert!(CellState::ConnectedFood.is_fixed());
        assert!(CellState::Obstacle.is_fixed());
    }
}
