pub mod active;
pub mod field;
mod mutation;

pub use active::ActiveRecord;
pub use field::{ChemicalField, Emission};

use crate::cell::{Cell, CellState, Position};
use crate::config::SimConfig;
use crate::metrics::GridStats;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("replacement cell at {new} does not match the replaced cell at {old}")]
    PositionMismatch { old: Position, new: Position },
    #[error("coordinate ({x}, {y}) is outside the {x_size}x{y_size} grid")]
    OutOfRange {
        x: i32,
        y: i32,
        x_size: usize,
        y_size: usize,
    },
}

/// Chemical sources placed by `replace_cell` for each occupying state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emissions {
    pub cohesion: Emission,
    pub food: Emission,
    pub obstacle: Emission,
}

impl Emissions {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            cohesion: Emission::new(config.cohesion_attr, config.cohesion_attr_decay),
            food: Emission::new(config.food_attr, config.food_attr_decay),
            obstacle: Emission::new(config.obstacle_rep, config.obstacle_attr_decay),
        }
    }
}

/// Owns every piece of simulation state: the cell matrix, the chemical field,
/// the active record and the volume / connected food counters.
///
/// After `make_empty`, all mutation goes through `replace_cell` and `set_cell`,
/// which keep `volume` equal to the number of organism cells. `set_cell_no_chem`
/// writes raw cells and bypasses that bookkeeping.
#[derive(Clone, Debug)]
pub struct Grid {
    x_size: usize,
    y_size: usize,
    contents: Vec<Cell>,
    field: ChemicalField,
    active: ActiveRecord,
    volume: usize,
    connected_food_sources: usize,
    emissions: Emissions,
}

impl Grid {
    pub fn new(x_size: usize, y_size: usize, emissions: Emissions) -> Self {
        let len = x_size * y_size;
        let mut grid = Self {
            x_size,
            y_size,
            contents: Vec::with_capacity(len),
            field: ChemicalField::new(x_size, y_size),
            active: ActiveRecord::new(len),
            volume: 0,
            connected_food_sources: 0,
            emissions,
        };
        grid.make_empty();
        grid
    }

    /// Empty grid sized and tuned by `config`. Does not validate it.
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.x_size,
            config.y_size,
            Emissions::from_config(config),
        )
    }

    pub fn x_size(&self) -> usize {
        self.x_size
    }

    pub fn y_size(&self) -> usize {
        self.y_size
    }

    pub fn emissions(&self) -> &Emissions {
        &self.emissions
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.x_size && (y as usize) < self.y_size
    }

    pub(crate) fn index_of(&self, x: i32, y: i32) -> Result<usize, GridError> {
        if !self.contains(x, y) {
            return Err(GridError::OutOfRange {
                x,
                y,
                x_size: self.x_size,
                y_size: self.y_size,
            });
        }
        Ok(y as usize * self.x_size + x as usize)
    }

    pub fn get_cell(&self, position: Position) -> Result<Cell, GridError> {
        self.get_cell_by_coord(position.x, position.y)
    }

    pub fn get_cell_by_coord(&self, x: i32, y: i32) -> Result<Cell, GridError> {
        let index = self.index_of(x, y)?;
        Ok(self.contents[index])
    }

    /// Row-major view of every cell.
    pub fn cells(&self) -> &[Cell] {
        &self.contents
    }

    pub fn volume(&self) -> usize {
        self.volume
    }

    pub fn connected_food_sources(&self) -> usize {
        self.connected_food_sources
    }

    /// Volume the organism would have if the cell at `position` took `candidate`.
    /// Saturates at 0 when raw `set_cell_no_chem` writes left the counter behind.
    pub fn volume_if(&self, position: Position, candidate: CellState) -> Result<usize, GridError> {
        let current = self.get_cell(position)?.state;
        Ok(if candidate == current {
            self.volume
        } else if candidate == CellState::Organism {
            self.volume + 1
        } else if current == CellState::Organism {
            self.volume.saturating_sub(1)
        } else {
            self.volume
        })
    }

    pub fn chemical_field(&self) -> &ChemicalField {
        &self.field
    }

    pub fn chemical_field_val(&self, position: Position) -> Result<f64, GridError> {
        self.chemical_field_val_coord(position.x, position.y)
    }

    pub fn chemical_field_val_coord(&self, x: i32, y: i32) -> Result<f64, GridError> {
        self.index_of(x, y)?;
        Ok(self.field.get(x as usize, y as usize))
    }

    /// Adds a raw pyramid contribution to the chemical field. The center may
    /// lie off the grid; only in-bounds cells are touched.
    pub fn update_chemical_field(&mut self, center: Position, value: f64, decay: f64) {
        self.field.add_emission(center, Emission::new(value, decay));
    }

    /// Positions flagged active since the last reset, in first-marked order.
    pub fn active_positions(&self) -> &[Position] {
        self.active.positions()
    }

    pub fn is_active(&self, position: Position) -> bool {
        self.index_of(position.x, position.y)
            .map(|index| self.active.contains(index))
            .unwrap_or(false)
    }

    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats {
            volume: self.volume,
            connected_food_sources: self.connected_food_sources,
            active_cells: self.active.len(),
            ..GridStats::default()
        };
        for cell in &self.contents {
            match cell.state {
                CellState::Unoccupied => {}
                CellState::Organism => stats.organism_cells += 1,
                CellState::Food => stats.food_cells += 1,
                CellState::ConnectedFood => stats.connected_food_cells += 1,
                CellState::Obstacle => stats.obstacle_cells += 1,
            }
        }
        let values = self.field.values();
        if !values.is_empty() {
            stats.field_min = values.iter().copied().fold(f64::INFINITY, f64::min);
            stats.field_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            stats.field_mean = values.iter().sum::<f64>() / values.len() as f64;
        }
        stats
    }
}
