use crate::cell::{Cell, CellState, Position};
use crate::config::SimConfig;
use crate::grid::{Grid, GridError};
use thiserror::Error;

/// Flat offset subtracted whenever the candidate state is vacancy.
const VACANCY_BIAS: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnergyError {
    #[error("energy is only defined between organism and vacancy (current {current:?}, candidate {candidate:?})")]
    InvalidStateTransition {
        current: CellState,
        candidate: CellState,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Hamiltonian for organism/vacancy flips.
///
/// The chemical field already folds in cohesion, food and obstacle influence,
/// so the interaction terms are plain field reads; the only global term pulls
/// the organism volume toward `ideal_volume` per connected food source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergyModel {
    pub ideal_volume: f64,
    pub volume_weight: f64,
}

impl EnergyModel {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            ideal_volume: config.ideal_volume,
            volume_weight: config.volume_weight,
        }
    }

    pub fn inter_cell_energy(&self, grid: &Grid, cell: &Cell) -> Result<f64, GridError> {
        grid.chemical_field_val(cell.position)
    }

    pub fn intra_cell_energy(&self, grid: &Grid, cell: &Cell) -> Result<f64, GridError> {
        Ok(self.inter_cell_energy(grid, cell)? / 2.0)
    }

    pub fn adjust_for_volume(
        &self,
        position: Position,
        candidate: CellState,
        raw_energy: f64,
        grid: &Grid,
    ) -> Result<f64, GridError> {
        let volume = grid.volume_if(position, candidate)? as f64;
        let ideal_delta = volume - self.ideal_volume * grid.connected_food_sources() as f64;
        let mut adjusted = raw_energy + self.volume_weight * ideal_delta;
        if candidate == CellState::Unoccupied {
            adjusted -= VACANCY_BIAS;
        }
        Ok(adjusted)
    }

    /// Energy of putting `candidate`'s state at `position`.
    ///
    /// Growth (vacancy to organism) returns the adjusted energy, retreat
    /// (organism to vacancy) returns its negation, and no change scores 0.
    pub fn energy_if_change(
        &self,
        grid: &Grid,
        position: Position,
        candidate: &Cell,
    ) -> Result<f64, EnergyError> {
        let current = grid.get_cell(position)?.state;
        if current.is_fixed() || candidate.state.is_fixed() {
            return Err(EnergyError::InvalidStateTransition {
                current,
                candidate: candidate.state,
            });
        }

        let raw = self.inter_cell_energy(grid, candidate)? + self.intra_cell_energy(grid, candidate)?;
        let adjusted = self.adjust_for_volume(position, candidate.state, raw, grid)?;

        Ok(match (current, candidate.state) {
            (CellState::Organism, CellState::Unoccupied) => -adjusted,
            (CellState::Unoccupied, CellState::Organism) => adjusted,
            _ => 0.0,
        })
    }

    pub fn energy(&self, grid: &Grid, candidate: &Cell) -> Result<f64, EnergyError> {
        self.energy_if_change(grid, candidate.position, candidate)
    }
}
