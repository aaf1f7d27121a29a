use std::path::PathBuf;

use clap::Parser;
use log::info;

use crate::error::SimulationError;
use crate::log::apply_log_level_spec;
use crate::parameters::{load_parameters_from_json, ParametersValues};
use crate::report::{log_results, write_results_report, ReportOptions};
use crate::sweep::{app_usage_range, run_sweep, ScenarioResult};

/// Default cli arguments for the contact tracing runner
#[derive(Parser, Debug, Default)]
#[command(
    name = "contact-tracing-sim",
    about = "Simulates the effect of app-based contact tracing on an epidemic"
)]
pub struct BaseArgs {
    /// Random seed, overrides the seed of the config file
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Optional path for a JSON parameters file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the results file; no file is written without it
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Prefix for the results file name
    #[arg(long, default_value = "")]
    pub file_prefix: String,

    /// Replace an existing results file
    #[arg(short = 'f', long)]
    pub overwrite: bool,

    /// Log level spec, e.g. `info` or `warn,contact_tracing_sim::contact_tracing=trace`
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Number of days to simulate, overrides the config file
    #[arg(short, long)]
    pub days: Option<u32>,

    /// App usage level of a scenario; repeat for a sweep
    #[arg(short, long = "app-usage", conflicts_with = "app_usage_step")]
    pub app_usage: Vec<f64>,

    /// Sweep app usage from 0 to 1 in steps of this size
    #[arg(long)]
    pub app_usage_step: Option<f64>,

    /// Run each scenario on its own thread
    #[arg(short, long)]
    pub threads: bool,
}

/// Parses the command line and runs the sweep it describes.
///
/// # Errors
/// Returns an error if the configuration is invalid or the results cannot be written
pub fn run_with_args() -> Result<Vec<ScenarioResult>, SimulationError> {
    run_with_args_internal(BaseArgs::parse())
}

/// Merges the command line over the config file (or the defaults).
fn resolve_parameters(args: &BaseArgs) -> Result<ParametersValues, SimulationError> {
    let mut values = match &args.config {
        Some(config_path) => {
            info!("Loading parameters from: {}", config_path.display());
            load_parameters_from_json(config_path)?
        }
        None => ParametersValues::default(),
    };

    if let Some(seed) = args.random_seed {
        values.seed = seed;
    }
    if let Some(days) = args.days {
        values.days = days;
    }
    if let Some(step) = args.app_usage_step {
        values.app_usage_levels = app_usage_range(step)?;
    } else if !args.app_usage.is_empty() {
        values.app_usage_levels.clone_from(&args.app_usage);
    }
    values.validate()?;
    Ok(values)
}

fn run_with_args_internal(args: BaseArgs) -> Result<Vec<ScenarioResult>, SimulationError> {
    if let Some(spec) = &args.log_level {
        apply_log_level_spec(spec)?;
    }

    let values = resolve_parameters(&args)?;
    let results = run_sweep(&values, args.threads)?;
    log_results(&results);

    // Optionally write the results table
    if let Some(output_dir) = &args.output_dir {
        let mut report_options = ReportOptions::new();
        report_options
            .directory(output_dir.clone())
            .file_prefix(args.file_prefix.clone())
            .overwrite(args.overwrite);
        let path = write_results_report(&report_options, &results)?;
        println!("Results written to {}", path.display());
    }

    for result in &results {
        println!(
            "app usage {:.2}%: start {:.2}%, end {:.2}%, total {:.2}%",
            result.parameters.app_percent_usage * 100.0,
            result.summary.start_infection_fraction * 100.0,
            result.summary.end_infection_fraction * 100.0,
            result.summary.total_infected_fraction * 100.0
        );
    }
    Ok(results)
}
