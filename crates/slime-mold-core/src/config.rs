use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for grid generation and Metropolis stepping.
    pub seed: u64,
    /// Grid width in cells.
    pub x_size: usize,
    /// Grid height in cells.
    pub y_size: usize,
    /// Probability that `make_random` places food in a cell.
    pub food_prob: f64,
    /// Probability that `make_random` places an obstacle, drawn from the mass left after food.
    pub obstacle_prob: f64,
    /// Chemical contribution of an organism cell. Negative values attract growth.
    pub cohesion_attr: f64,
    pub cohesion_attr_decay: f64,
    /// Chemical contribution of a food cell.
    pub food_attr: f64,
    pub food_attr_decay: f64,
    /// Chemical contribution of an obstacle cell.
    pub obstacle_rep: f64,
    pub obstacle_attr_decay: f64,
    /// Target organism volume per connected food source.
    pub ideal_volume: f64,
    /// Weight of the volume deviation term in the Hamiltonian.
    pub volume_weight: f64,
    /// Energy slack: deltas below `-yield_offset` are always accepted.
    pub yield_offset: f64,
    /// Temperature of the Metropolis acceptance rule.
    pub fluctuation_amplitude: f64,
    /// Unchanged steps tolerated over a run before it counts as stalled.
    pub stale_steps_before_stopping: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            x_size: 80,
            y_size: 60,
            food_prob: 0.012,
            obstacle_prob: 0.006,
            cohesion_attr: -1.0,
            cohesion_attr_decay: 0.5,
            food_attr: -2.0,
            food_attr_decay: 1.0,
            obstacle_rep: -1.0,
            obstacle_attr_decay: 1.0,
            ideal_volume: 15.0,
            volume_weight: 0.1,
            yield_offset: 0.2,
            fluctuation_amplitude: 0.5,
            stale_steps_before_stopping: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimConfigError {
    #[error("grid dimensions must be positive (got {x_size}x{y_size})")]
    EmptyGrid { x_size: usize, y_size: usize },
    #[error("grid side ({actual}) exceeds supported maximum ({max})")]
    GridTooLarge { max: usize, actual: usize },
    #[error("{name} must be within [0, 1] (got {value})")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("food_prob + obstacle_prob must not exceed 1 (got {sum})")]
    ProbabilityMassExceeded { sum: f64 },
    #[error("{name} must be finite (got {value})")]
    NonFinite { name: &'static str, value: f64 },
    #[error("{name} must be positive and finite (got {value})")]
    InvalidDecay { name: &'static str, value: f64 },
    #[error("{name} spans {rings} rings, above the supported maximum of {max}")]
    EmissionTooWide {
        name: &'static str,
        rings: f64,
        max: f64,
    },
    #[error("fluctuation_amplitude must be positive and finite (got {0})")]
    InvalidFluctuationAmplitude(f64),
    #[error("stale_steps_before_stopping must be positive")]
    InvalidStaleBudget,
}

impl SimConfig {
    pub const MAX_GRID_SIDE: usize = 4096;
    /// Upper bound on `|value| / decay` for any chemical source.
    pub const MAX_EMISSION_RINGS: f64 = 1e6;

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), SimConfigError> {
        if self.x_size == 0 || self.y_size == 0 {
            return Err(SimConfigError::EmptyGrid {
                x_size: self.x_size,
                y_size: self.y_size,
            });
        }
        let longest = self.x_size.max(self.y_size);
        if longest > Self::MAX_GRID_SIDE {
            return Err(SimConfigError::GridTooLarge {
                max: Self::MAX_GRID_SIDE,
                actual: longest,
            });
        }

        for (name, value) in [
            ("food_prob", self.food_prob),
            ("obstacle_prob", self.obstacle_prob),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimConfigError::InvalidProbability { name, value });
            }
        }
        let sum = self.food_prob + self.obstacle_prob;
        if sum > 1.0 {
            return Err(SimConfigError::ProbabilityMassExceeded { sum });
        }

        for (name, value) in [
            ("cohesion_attr", self.cohesion_attr),
            ("food_attr", self.food_attr),
            ("obstacle_rep", self.obstacle_rep),
            ("ideal_volume", self.ideal_volume),
            ("volume_weight", self.volume_weight),
            ("yield_offset", self.yield_offset),
        ] {
            if !value.is_finite() {
                return Err(SimConfigError::NonFinite { name, value });
            }
        }

        for (name, value) in [
            ("cohesion_attr_decay", self.cohesion_attr_decay),
            ("food_attr_decay", self.food_attr_decay),
            ("obstacle_attr_decay", self.obstacle_attr_decay),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimConfigError::InvalidDecay { name, value });
            }
        }

        for (name, value, decay) in [
            ("cohesion_attr", self.cohesion_attr, self.cohesion_attr_decay),
            ("food_attr", self.food_attr, self.food_attr_decay),
            ("obstacle_rep", self.obstacle_rep, self.obstacle_attr_decay),
        ] {
            let rings = value.abs() / decay;
            if rings > Self::MAX_EMISSION_RINGS {
                return Err(SimConfigError::EmissionTooWide {
                    name,
                    rings,
                    max: Self::MAX_EMISSION_RINGS,
                });
            }
        }

        if !(self.fluctuation_amplitude.is_finite() && self.fluctuation_amplitude > 0.0) {
            return Err(SimConfigError::InvalidFluctuationAmplitude(
                self.fluctuation_amplitude,
            ));
        }
        if self.stale_steps_before_stopping == 0 {
            return Err(SimConfigError::InvalidStaleBudget);
        }
        Ok(())
    }
}
