use super::{Grid, GridError};
use crate::cell::{Cell, CellState, Position};
use crate::topology;
use rand::Rng;
use tracing::debug;

impl Grid {
    /// Resets to an all-unoccupied grid with a zero field, no active cells and
    /// zeroed counters.
    pub fn make_empty(&mut self) {
        self.volume = 0;
        self.connected_food_sources = 0;
        self.field.clear();
        self.active.clear();
        self.contents.clear();
        for y in 0..self.y_size {
            for x in 0..self.x_size {
                self.contents
                    .push(Cell::unoccupied(Position::new(x as i32, y as i32)));
            }
        }
    }

    /// Empties the grid, then places food and obstacles independently per cell.
    ///
    /// One uniform draw per cell: below `food_prob` is food, the next
    /// `obstacle_prob` of mass is an obstacle, anything else stays unoccupied.
    /// Placement goes through `replace_cell`, so the field reflects it.
    pub fn make_random<R: Rng + ?Sized>(
        &mut self,
        food_prob: f64,
        obstacle_prob: f64,
        rng: &mut R,
    ) -> Result<(), GridError> {
        self.make_empty();
        for y in 0..self.y_size as i32 {
            for x in 0..self.x_size as i32 {
                let draw = rng.random::<f64>();
                // strict bounds: a zero probability never places that state
                let state = if draw < food_prob {
                    CellState::Food
                } else if draw - food_prob < obstacle_prob {
                    CellState::Obstacle
                } else {
                    CellState::Unoccupied
                };
                let current = self.get_cell_by_coord(x, y)?;
                self.replace_cell(current, current.with_state(state, 0.0))?;
            }
        }
        Ok(())
    }

    /// Raw write with no field, counter or active-record effects.
    pub fn set_cell_no_chem(&mut self, cell: Cell) -> Result<(), GridError> {
        let index = self.index_of(cell.position.x, cell.position.y)?;
        self.contents[index] = cell;
        Ok(())
    }

    /// Replaces whatever currently sits at `cell.position` with `cell`.
    pub fn set_cell(&mut self, cell: Cell) -> Result<(), GridError> {
        let current = self.get_cell(cell.position)?;
        self.replace_cell(current, cell)
    }

    /// Swaps `old` for `new` and updates the chemical field, volume, connected
    /// food count and active record.
    ///
    /// A new organism cell converts every adjacent food cell to connected food
    /// and flags itself and all of its neighbors active. Conversions run as a
    /// second phase over the neighbors gathered after the primary write;
    /// connected food never triggers further conversions.
    pub fn replace_cell(&mut self, old: Cell, new: Cell) -> Result<(), GridError> {
        if old.position != new.position {
            return Err(GridError::PositionMismatch {
                old: old.position,
                new: new.position,
            });
        }
        let position = new.position;
        let index = self.index_of(position.x, position.y)?;
        self.commit(index, old, new);

        if new.state != CellState::Organism {
            return Ok(());
        }

        for neighbor in topology::neighbor_cells(self, &new).into_iter().flatten() {
            let neighbor_index = self.index_of(neighbor.position.x, neighbor.position.y)?;
            if neighbor.state == CellState::Food {
                self.connected_food_sources += 1;
                self.commit(
                    neighbor_index,
                    neighbor,
                    neighbor.with_state(CellState::ConnectedFood, 0.0),
                );
                debug!(
                    position = %neighbor.position,
                    connected_food_sources = self.connected_food_sources,
                    "food source connected"
                );
            }
            self.active.mark(neighbor_index, neighbor.position);
        }
        self.active.mark(index, position);
        Ok(())
    }

    /// Writes `new` at `index` and applies its field and volume effects.
    fn commit(&mut self, index: usize, old: Cell, new: Cell) {
        self.contents[index] = new;

        let position = new.position;
        let emissions = self.emissions;
        if old.state == CellState::Organism {
            self.field.add_emission(position, emissions.cohesion.negated());
        }
        match new.state {
            CellState::Organism => self.field.add_emission(position, emissions.cohesion),
            CellState::Food => self.field.add_emission(position, emissions.food),
            CellState::Obstacle => self.field.add_emission(position, emissions.obstacle),
            CellState::Unoccupied | CellState::ConnectedFood => {}
        }

        let was_organism = old.state == CellState::Organism;
        let is_organism = new.state == CellState::Organism;
        if is_organism && !was_organism {
            self.volume += 1;
        } else if was_organism && !is_organism {
            self.volume = self.volume.saturating_sub(1);
        }
    }
}
