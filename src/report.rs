//! The results table of a sweep: one tab-delimited row per scenario.
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use log::info;
use serde::{Serialize, Serializer};

use crate::error::SimulationError;
use crate::sweep::ScenarioResult;

/// Name of the results file, after the prefix.
pub const RESULTS_FILE_NAME: &str = "results.tsv";

/// Where and how the results file is written.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub file_prefix: String,
    pub output_dir: PathBuf,
    pub overwrite: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            file_prefix: String::new(),
            output_dir: PathBuf::from("."),
            overwrite: false,
        }
    }
}

impl ReportOptions {
    #[must_use]
    pub fn new() -> ReportOptions {
        ReportOptions::default()
    }

    /// Sets the file prefix option (e.g., "sweep_")
    pub fn file_prefix(&mut self, file_prefix: String) -> &mut ReportOptions {
        self.file_prefix = file_prefix;
        self
    }

    /// Sets the directory where the results file is written
    pub fn directory(&mut self, directory: PathBuf) -> &mut ReportOptions {
        self.output_dir = directory;
        self
    }

    /// Sets whether an existing results file may be replaced
    pub fn overwrite(&mut self, overwrite: bool) -> &mut ReportOptions {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn results_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}{RESULTS_FILE_NAME}", self.file_prefix))
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn as_percent<S: Serializer>(fraction: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", fraction * 100.0))
}

#[derive(Serialize, Debug)]
struct ResultsReportRow {
    #[serde(rename = "Population Size")]
    population_size: usize,
    #[serde(rename = "Interaction Amount")]
    interaction_amount: usize,
    #[serde(rename = "Spread Rate (%)", serialize_with = "as_percent")]
    spread_rate: f64,
    #[serde(rename = "Starting Infection (%)", serialize_with = "as_percent")]
    start_infection: f64,
    #[serde(rename = "Ending Infection (%)", serialize_with = "as_percent")]
    end_infection: f64,
    #[serde(rename = "Total Infected (%)", serialize_with = "as_percent")]
    total_infected: f64,
    #[serde(rename = "App Usage (%)", serialize_with = "as_percent")]
    app_usage: f64,
}

impl From<&ScenarioResult> for ResultsReportRow {
    fn from(result: &ScenarioResult) -> Self {
        ResultsReportRow {
            population_size: result.parameters.population_size,
            interaction_amount: result.parameters.interaction_amount,
            spread_rate: result.parameters.spread_rate,
            start_infection: result.summary.start_infection_fraction,
            end_infection: result.summary.end_infection_fraction,
            total_infected: result.summary.total_infected_fraction,
            app_usage: result.parameters.app_percent_usage,
        }
    }
}

// Creates all parent directories and the file itself. Refuses to replace an existing file
// unless `overwrite` is set.
fn generate_validate_filepath(path: &Path, overwrite: bool) -> Result<File, SimulationError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    if path.exists() && !overwrite {
        return Err(SimulationError::ReportError(format!(
            "results file {} already exists, pass --overwrite to replace it",
            path.display()
        )));
    }
    Ok(File::create(path)?)
}

/// Writes one row per scenario to the results file and returns its path.
///
/// # Errors
///
/// Returns `SimulationError::ReportError` if the file exists and overwriting is off, and an I/O
/// or CSV error if writing fails.
pub fn write_results_report(
    options: &ReportOptions,
    results: &[ScenarioResult],
) -> Result<PathBuf, SimulationError> {
    let path = options.results_path();
    let file = generate_validate_filepath(&path, options.overwrite)?;
    let mut writer: Writer<File> = WriterBuilder::new().delimiter(b'\t').from_writer(file);
    for result in results {
        writer.serialize(ResultsReportRow::from(result))?;
    }
    writer.flush()?;
    info!("wrote {} results to {}", results.len(), path.display());
    Ok(path)
}

/// Logs a console summary of each scenario.
pub fn log_results(results: &[ScenarioResult]) {
    for result in results {
        info!(
            "app usage {:.2}%: start {:.2}%, end {:.2}%, total {:.2}% after {} days ({})",
            result.parameters.app_percent_usage * 100.0,
            result.summary.start_infection_fraction * 100.0,
            result.summary.end_infection_fraction * 100.0,
            result.summary.total_infected_fraction * 100.0,
            result.days,
            humantime::format_duration(result.elapsed)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ModelParameters;
    use crate::simulation::InfectionSummary;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn result(app_percent_usage: f64) -> ScenarioResult {
        ScenarioResult {
            parameters: ModelParameters {
                population_size: 10_000,
                interaction_amount: 5,
                spread_rate: 0.01,
                app_percent_usage,
                covid_percent_start: 0.05,
            },
            days: 100,
            summary: InfectionSummary {
                start_infection_fraction: 0.0497,
                end_infection_fraction: 0.0,
                total_infected_fraction: 0.123_456,
            },
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let temp_dir = tempdir().unwrap();
        let mut options = ReportOptions::new();
        options
            .directory(temp_dir.path().join("nested"))
            .file_prefix("sweep_".to_string());

        let path = write_results_report(&options, &[result(0.0), result(0.25)]).unwrap();
        assert_eq!(path, temp_dir.path().join("nested").join("sweep_results.tsv"));

        let contents = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Population Size\tInteraction Amount\tSpread Rate (%)\tStarting Infection (%)\t\
             Ending Infection (%)\tTotal Infected (%)\tApp Usage (%)"
        );
        assert_eq!(lines[1], "10000\t5\t1.00\t4.97\t0.00\t12.35\t0.00");
        assert_eq!(lines[2], "10000\t5\t1.00\t4.97\t0.00\t12.35\t25.00");
    }

    #[test]
    fn refuses_to_overwrite_by_default() {
        let temp_dir = tempdir().unwrap();
        let mut options = ReportOptions::new();
        options.directory(temp_dir.path().to_path_buf());
        let path = options.results_path();
        fs::write(&path, "keep me").unwrap();

        assert!(matches!(
            write_results_report(&options, &[result(0.0)]),
            Err(SimulationError::ReportError(_))
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");

        options.overwrite(true);
        write_results_report(&options, &[result(0.0)]).unwrap();
        assert_ne!(fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn log_results_without_logger() {
        log_results(&[result(0.5)]);
    }
}
