use crate::cell::{Cell, CellState, Position};
use crate::config::{SimConfig, SimConfigError};
use crate::grid::{Grid, GridError};
use crate::metrics::{RunSummary, StepMetrics};
use crate::metropolis::{MetropolisEngine, StepError};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] SimConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Step(#[from] StepError),
    #[error("sample_every must be positive")]
    InvalidSampleEvery,
    #[error("steps ({actual}) exceed supported maximum ({max})")]
    TooManySteps { max: usize, actual: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: usize,
    pub changed: bool,
}

/// Headless driver: a seeded random grid with one organism cell touching a
/// food source at the center, stepped until it stops changing.
///
/// Staleness is cumulative: every unchanged step spends one unit of
/// `stale_steps_before_stopping`, and changes never refund it.
pub struct Simulation {
    config: SimConfig,
    grid: Grid,
    engine: MetropolisEngine<ChaCha12Rng>,
    step_index: usize,
    stale_budget: u32,
}

impl Simulation {
    pub const MAX_RUN_STEPS: usize = 1_000_000;

    /// Fails with `GridError::OutOfRange` if the grid is too narrow to seed
    /// the organism left of the central food.
    pub fn new(config: SimConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let (grid, engine) = Self::seed(&config)?;
        let stale_budget = config.stale_steps_before_stopping;
        Ok(Self {
            config,
            grid,
            engine,
            step_index: 0,
            stale_budget,
        })
    }

    fn seed(config: &SimConfig) -> Result<(Grid, MetropolisEngine<ChaCha12Rng>), GridError> {
        let mut grid = Grid::from_config(config);
        let mut layout_rng = ChaCha12Rng::seed_from_u64(config.seed);
        grid.make_random(config.food_prob, config.obstacle_prob, &mut layout_rng)?;

        let center_x = (config.x_size / 2) as i32;
        let center_y = (config.y_size / 2) as i32;
        grid.set_cell(Cell::new(
            Position::new(center_x, center_y),
            CellState::Food,
            0.0,
        ))?;
        grid.set_cell(Cell::new(
            Position::new(center_x - 1, center_y),
            CellState::Organism,
            0.0,
        ))?;

        let engine = MetropolisEngine::new(
            config,
            ChaCha12Rng::seed_from_u64(config.seed.wrapping_add(1)),
        );
        Ok((grid, engine))
    }

    /// Rebuilds the grid and both random streams from the config.
    pub fn reset(&mut self) -> Result<(), SimulationError> {
        let (grid, engine) = Self::seed(&self.config)?;
        self.grid = grid;
        self.engine = engine;
        self.step_index = 0;
        self.stale_budget = self.config.stale_steps_before_stopping;
        Ok(())
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct access for placing extra food or organism cells between steps.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn stale_budget(&self) -> u32 {
        self.stale_budget
    }

    pub fn is_stalled(&self) -> bool {
        self.stale_budget == 0
    }

    pub fn step(&mut self) -> Result<StepOutcome, SimulationError> {
        let changed = self.engine.step(&mut self.grid)?;
        self.step_index += 1;
        if !changed && self.stale_budget > 0 {
            self.stale_budget -= 1;
            if self.stale_budget == 0 {
                info!(
                    step = self.step_index,
                    volume = self.grid.volume(),
                    "simulation stalled"
                );
            }
        }
        debug!(
            step = self.step_index,
            changed,
            volume = self.grid.volume(),
            active = self.grid.active_positions().len(),
            "step complete"
        );
        Ok(StepOutcome {
            step: self.step_index,
            changed,
        })
    }

    fn sample(&self, outcome: StepOutcome) -> StepMetrics {
        StepMetrics {
            step: outcome.step,
            changed: outcome.changed,
            stats: self.grid.stats(),
        }
    }

    /// Steps until the run stalls or `max_steps` is reached, sampling metrics
    /// every `sample_every` steps and on the last step taken.
    pub fn run(&mut self, max_steps: usize, sample_every: usize) -> Result<RunSummary, SimulationError> {
        if sample_every == 0 {
            return Err(SimulationError::InvalidSampleEvery);
        }
        if max_steps > Self::MAX_RUN_STEPS {
            return Err(SimulationError::TooManySteps {
                max: Self::MAX_RUN_STEPS,
                actual: max_steps,
            });
        }

        let mut samples = Vec::with_capacity(max_steps / sample_every + 1);
        let mut steps_run = 0;
        let mut last = None;
        while steps_run < max_steps && !self.is_stalled() {
            let outcome = self.step()?;
            steps_run += 1;
            if steps_run % sample_every == 0 {
                samples.push(self.sample(outcome));
            }
            last = Some(outcome);
        }
        if let Some(outcome) = last {
            if steps_run % sample_every != 0 {
                samples.push(self.sample(outcome));
            }
        }

        let stalled = self.is_stalled();
        info!(steps_run, stalled, volume = self.grid.volume(), "run finished");
        Ok(RunSummary {
            schema_version: 1,
            steps_run,
            sample_every,
            stalled,
            final_stats: self.grid.stats(),
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> SimConfig {
        SimConfig {
            seed,
            x_size: 24,
            y_size: 18,
            ..SimConfig::default()
        }
    }

    #[test]
    fn new_seeds_organism_beside_connected_food() {
        let sim = Simulation::new(small_config(1)).unwrap();
        let grid = sim.grid();
        assert_eq!(
            grid.get_cell(Position::new(12, 9)).unwrap().state,
            CellState::ConnectedFood
        );
        assert_eq!(
            grid.get_cell(Position::new(11, 9)).unwrap().state,
            CellState::Organism
        );
        assert_eq!(grid.volume(), 1);
        assert!(grid.connected_food_sources() >= 1);
        assert!(grid.is_active(Position::new(11, 9)));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = SimConfig {
            fluctuation_amplitude: -1.0,
            ..small_config(1)
        };
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::Config(
                SimConfigError::InvalidFluctuationAmplitude(_)
            ))
        ));
    }

    #[test]
    fn single_column_grid_cannot_be_seeded() {
        let config = SimConfig {
            x_size: 1,
            ..small_config(1)
        };
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::Grid(GridError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn run_rejects_bad_requests() {
        let mut sim = Simulation::new(small_config(2)).unwrap();
        assert_eq!(sim.run(10, 0), Err(SimulationError::InvalidSampleEvery));
        assert!(matches!(
            sim.run(Simulation::MAX_RUN_STEPS + 1, 1),
            Err(SimulationError::TooManySteps { .. })
        ));
        assert_eq!(sim.step_index(), 0);
    }

    #[test]
    fn run_samples_on_schedule_and_final_step() {
        let mut sim = Simulation::new(small_config(3)).unwrap();
        let summary = sim.run(7, 3).unwrap();
        let steps: Vec<usize> = summary.samples.iter().map(|s| s.step).collect();
        if summary.stalled {
            assert_eq!(steps.last(), Some(&summary.steps_run));
        } else {
            assert_eq!(summary.steps_run, 7);
            assert_eq!(steps, vec![3, 6, 7]);
        }
        assert_eq!(summary.final_stats, sim.grid().stats());
    }

    #[test]
    fn growth_happens_over_a_run() {
        let mut sim = Simulation::new(small_config(4)).unwrap();
        let summary = sim.run(30, 10).unwrap();
        assert!(summary.final_stats.volume > 1);
        assert_eq!(summary.final_stats.volume, summary.final_stats.organism_cells);
    }

    #[test]
    fn enclosed_start_stalls_after_budget() {
        let config = SimConfig {
            stale_steps_before_stopping: 5,
            ..small_config(5)
        };
        let mut sim = Simulation::new(config).unwrap();
        // wall in the seeded organism so no proposal can succeed
        let grid = sim.grid_mut();
        grid.make_empty();
        for y in 0..3 {
            for x in 0..3 {
                if (x, y) != (1, 1) {
                    grid.set_cell(Cell::new(Position::new(x, y), CellState::Obstacle, 0.0))
                        .unwrap();
                }
            }
        }
        grid.set_cell(Cell::new(Position::new(1, 1), CellState::Organism, 0.0))
            .unwrap();

        let summary = sim.run(100, 1).unwrap();
        assert!(summary.stalled);
        assert_eq!(summary.steps_run, 5);
        assert_eq!(summary.samples.len(), 5);
        assert!(summary.samples.iter().all(|s| !s.changed));
        assert!(sim.is_stalled());
    }

    #[test]
    fn same_seed_same_summary() {
        let mut a = Simulation::new(small_config(6)).unwrap();
        let mut b = Simulation::new(small_config(6)).unwrap();
        assert_eq!(a.run(25, 5).unwrap(), b.run(25, 5).unwrap());
        assert_eq!(a.grid().cells(), b.grid().cells());
    }

    #[test]
    fn reset_replays_the_run() {
        let mut sim = Simulation::new(small_config(8)).unwrap();
        let first = sim.run(15, 5).unwrap();
        sim.reset().unwrap();
        assert_eq!(sim.step_index(), 0);
        assert_eq!(sim.stale_budget(), sim.config().stale_steps_before_stopping);
        let second = sim.run(15, 5).unwrap();
        assert_eq!(first, second);
    }
}
