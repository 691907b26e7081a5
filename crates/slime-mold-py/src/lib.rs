use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use slime_mold_core::{SimConfig, Simulation};

/// Minimal PyO3 module exposing slime-mold-core to Python.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Run a simulation from a JSON config (missing keys take defaults) and
/// return the run summary as JSON.
#[pyfunction]
#[pyo3(signature = (config_json, max_steps, sample_every=1))]
fn run_summary_json(config_json: &str, max_steps: usize, sample_every: usize) -> PyResult<String> {
    let config = SimConfig::from_json_str(config_json)
        .map_err(|e| PyValueError::new_err(format!("invalid config json: {e}")))?;
    let mut sim = Simulation::new(config).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let summary = sim
        .run(max_steps, sample_every)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    serde_json::to_string(&summary).map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(run_summary_json, m)?)?;
    Ok(())
}
