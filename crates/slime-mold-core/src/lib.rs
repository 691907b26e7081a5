//! Slime-mold colony growth on a 2D grid, driven by Metropolis-Hastings
//! stepping over a diffusing chemical field.

pub mod cell;
pub mod config;
pub mod energy;
pub mod grid;
pub mod metrics;
pub mod metropolis;
pub mod render;
pub mod sampling;
pub mod simulation;
pub mod topology;

pub use cell::{Cell, CellState, Position};
pub use config::{SimConfig, SimConfigError};
pub use energy::{EnergyError, EnergyModel};
pub use grid::{Grid, GridError};
pub use metrics::{GridStats, RunSummary, StepMetrics};
pub use metropolis::{MetropolisEngine, StepError};
pub use simulation::{Simulation, SimulationError, StepOutcome};
