use serde::{Deserialize, Serialize};

/// Point-in-time summary of a grid.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GridStats {
    pub volume: usize,
    pub connected_food_sources: usize,
    pub active_cells: usize,
    pub organism_cells: usize,
    pub food_cells: usize,
    pub connected_food_cells: usize,
    pub obstacle_cells: usize,
    pub field_min: f64,
    pub field_max: f64,
    pub field_mean: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StepMetrics {
    pub step: usize,
    pub changed: bool,
    pub stats: GridStats,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub steps_run: usize,
    pub sample_every: usize,
    /// Whether the run ended because the staleness budget ran out.
    pub stalled: bool,
    pub final_stats: GridStats,
    #[serde(default)]
    pub samples: Vec<StepMetrics>,
}

impl RunSummary {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
