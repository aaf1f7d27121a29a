//! Runs one scenario per app usage level. Scenarios share the base seed and nothing else, so
//! they can run on separate threads and still produce the same results as a sequential sweep.
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::SimulationError;
use crate::parameters::{ModelParameters, ParametersValues};
use crate::simulation::{InfectionSummary, Simulation};

/// The outcome of one scenario of a sweep.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub parameters: ModelParameters,
    pub days: u32,
    pub summary: InfectionSummary,
    /// Wall time of construction plus run
    pub elapsed: Duration,
}

impl ScenarioResult {
    #[must_use]
    pub fn app_percent_usage(&self) -> f64 {
        self.parameters.app_percent_usage
    }
}

/// Builds and runs the scenario with the given app usage level.
///
/// # Errors
///
/// Returns `SimulationError::InvalidParameter` if the scenario parameters are out of range.
pub fn run_scenario(
    values: &ParametersValues,
    app_percent_usage: f64,
) -> Result<ScenarioResult, SimulationError> {
    let start = Instant::now();
    let parameters = values.model_parameters(app_percent_usage);
    let mut simulation = Simulation::new(&parameters, values.seed)?;
    let summary = simulation.run(values.days);
    let elapsed = start.elapsed();
    debug!(
        "app usage {:.2}% finished in {}",
        app_percent_usage * 100.0,
        humantime::format_duration(elapsed)
    );
    Ok(ScenarioResult {
        parameters,
        days: values.days,
        summary,
        elapsed,
    })
}

/// Runs every level of `values.app_usage_levels` and returns the results in level order. With
/// `parallel` each scenario runs on its own thread.
///
/// # Errors
///
/// Returns the first scenario error in level order, or `SimulationError::ScenarioPanicked` if a
/// worker thread panicked.
pub fn run_sweep(
    values: &ParametersValues,
    parallel: bool,
) -> Result<Vec<ScenarioResult>, SimulationError> {
    values.validate()?;
    debug!(
        "running {} scenarios {}",
        values.app_usage_levels.len(),
        if parallel { "in parallel" } else { "sequentially" }
    );

    if !parallel {
        return values
            .app_usage_levels
            .iter()
            .map(|&level| run_scenario(values, level))
            .collect();
    }

    let handles: Vec<_> = values
        .app_usage_levels
        .iter()
        .map(|&level| {
            let values = values.clone();
            thread::spawn(move || run_scenario(&values, level))
        })
        .collect();

    // Join every handle before reporting so no worker outlives the sweep.
    let joined: Vec<_> = handles.into_iter().map(thread::JoinHandle::join).collect();
    joined
        .into_iter()
        .zip(&values.app_usage_levels)
        .map(|(result, level)| {
            result.map_err(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_default();
                SimulationError::ScenarioPanicked(format!("app usage {level}: {message}"))
            })?
        })
        .collect()
}

/// The app usage ladder `0, step, 2 * step, ...` up to and including 1.
///
/// # Errors
///
/// Returns `SimulationError::InvalidParameter` unless `step` is in `(0, 1]`.
pub fn app_usage_range(step: f64) -> Result<Vec<f64>, SimulationError> {
    if !(step > 0.0 && step <= 1.0) {
        return Err(SimulationError::InvalidParameter(format!(
            "app usage step must be in (0, 1], got {step}"
        )));
    }
    // Counted in whole steps; the last level is always 1.
    let steps = (1.0 / step + 1e-9).floor() as usize;
    let mut levels: Vec<f64> = (0..=steps).map(|i| (i as f64 * step).min(1.0)).collect();
    if levels.last().is_some_and(|&last| last < 1.0 - 1e-9) {
        levels.push(1.0);
    }
    Ok(levels)
}
