use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SimulationError` and maps other errors to
/// convert to a `SimulationError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SimulationError {
    /// A model parameter is out of range. Raised at construction time and
    /// never clamped.
    InvalidParameter(String),
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    ReportError(String),
    /// A scenario worker thread panicked before producing a result.
    ScenarioPanicked(String),
}

impl From<io::Error> for SimulationError {
    fn from(error: io::Error) -> Self {
        SimulationError::IoError(error)
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(error: serde_json::Error) -> Self {
        SimulationError::JsonError(error)
    }
}

impl From<csv::Error> for SimulationError {
    fn from(error: csv::Error) -> Self {
        SimulationError::CsvError(error)
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::IoError(error) => Some(error),
            SimulationError::JsonError(error) => Some(error),
            SimulationError::CsvError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimulationError::InvalidParameter(message) => {
                write!(f, "Error: invalid parameter: {message}")
            }
            SimulationError::ReportError(message) => write!(f, "Error: report: {message}"),
            SimulationError::ScenarioPanicked(message) => {
                write!(f, "Error: scenario panicked: {message}")
            }
            other => write!(f, "Error: {other:?}"),
        }
    }
}
